use chrono::{DateTime, Datelike, Utc};

use crate::{group::Digest, types::Entry};

/// Separator between repository sections.
pub const GROUP_SEPARATOR: &str = "\n\n\n";

/// `M/D` without zero padding, in UTC.
pub fn format_day(at: DateTime<Utc>) -> String {
    format!("{}/{}", at.month(), at.day())
}

pub fn format_entry(entry: &Entry) -> String {
    match entry {
        Entry::Activity(record) => format!(
            "* {}: [{}]({})",
            format_day(record.updated_at),
            record.title,
            record.url
        ),
        Entry::Created(record) => {
            format!("* {}: Repository was created", format_day(record.created_at))
        }
    }
}

pub fn format_group(key: &str, entries: &[Entry]) -> String {
    let bullets: Vec<String> = entries.iter().map(format_entry).collect();
    format!("### {}\n\n{}", key, bullets.join("\n"))
}

/// Renders the whole digest as Markdown.
pub fn render_markdown(digest: &Digest) -> String {
    digest
        .groups()
        .map(|(key, entries)| format_group(key, entries))
        .collect::<Vec<_>>()
        .join(GROUP_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        group::group,
        types::{ActivityKind, ActivityRecord, Actor, RepositoryRecord, RepositoryRef},
    };

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn pr(title: &str, updated_at: &str, url: &str, repo: &str) -> ActivityRecord {
        ActivityRecord {
            kind: ActivityKind::PullRequest,
            title: title.to_string(),
            updated_at: ts(updated_at),
            url: url.to_string(),
            author: None,
            repository: RepositoryRef {
                name: repo.to_string(),
                owner: Actor {
                    login: "alice".to_string(),
                },
            },
        }
    }

    #[test]
    fn test_format_pull_request() {
        let entry = Entry::Activity(pr("Fix bug", "2024-03-05T10:00:00Z", "http://x/1", "r"));
        assert_eq!(format_entry(&entry), "* 3/5: [Fix bug](http://x/1)");
    }

    #[test]
    fn test_format_repository_creation() {
        let entry = Entry::Created(RepositoryRecord {
            name: "r".to_string(),
            created_at: ts("2024-03-05T00:00:00Z"),
            owner: Actor {
                login: "o".to_string(),
            },
            url: "http://x/2".to_string(),
        });
        assert_eq!(format_entry(&entry), "* 3/5: Repository was created");
    }

    #[test]
    fn test_format_day_is_not_padded() {
        assert_eq!(format_day(ts("2024-11-09T23:59:59Z")), "11/9");
    }

    #[test]
    fn test_render_groups_with_headings() {
        let digest = group(
            &[
                pr("one", "2024-01-01T00:00:00Z", "http://x/1", "repo1"),
                pr("two", "2024-01-02T00:00:00Z", "http://x/2", "repo2"),
                pr("three", "2024-01-03T00:00:00Z", "http://x/3", "repo1"),
            ],
            &[],
        );

        assert_eq!(
            render_markdown(&digest),
            "### alice/repo1\n\n* 1/1: [one](http://x/1)\n* 1/3: [three](http://x/3)\n\n\n### alice/repo2\n\n* 1/2: [two](http://x/2)"
        );
    }

    #[test]
    fn test_render_empty_digest() {
        assert_eq!(render_markdown(&Digest::new()), "");
    }
}
