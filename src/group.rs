use crate::types::{ActivityRecord, Entry, RepositoryRecord};

/// Entries keyed by `owner/name`, keys in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Digest {
    groups: Vec<(String, Vec<Entry>)>,
}

impl Digest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry` to its repository's group, opening a new group at
    /// the end when the key has not been seen yet.
    pub fn push(&mut self, entry: Entry) {
        let key = entry.key();
        match self.groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, entries)) => entries.push(entry),
            None => self.groups.push((key, vec![entry])),
        }
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &[Entry])> {
        self.groups
            .iter()
            .map(|(key, entries)| (key.as_str(), entries.as_slice()))
    }

    pub fn get(&self, key: &str) -> Option<&[Entry]> {
        self.groups
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }
}

/// Groups sorted activity first, then folds repository creations into the
/// same keys so a repository's heading collects both.
pub fn group(activity: &[ActivityRecord], repositories: &[RepositoryRecord]) -> Digest {
    let mut digest = Digest::new();
    activity
        .iter()
        .cloned()
        .map(Entry::Activity)
        .chain(repositories.iter().cloned().map(Entry::Created))
        .for_each(|entry| digest.push(entry));
    digest
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::types::{ActivityKind, Actor, RepositoryRef};

    fn activity(owner: &str, repo: &str, title: &str, day: u32) -> ActivityRecord {
        ActivityRecord {
            kind: ActivityKind::PullRequest,
            title: title.to_string(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap(),
            url: format!("https://github.com/{owner}/{repo}/pull/{day}"),
            author: Some(Actor {
                login: owner.to_string(),
            }),
            repository: RepositoryRef {
                name: repo.to_string(),
                owner: Actor {
                    login: owner.to_string(),
                },
            },
        }
    }

    fn created(owner: &str, name: &str, day: u32) -> RepositoryRecord {
        RepositoryRecord {
            name: name.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            owner: Actor {
                login: owner.to_string(),
            },
            url: format!("https://github.com/{owner}/{name}"),
        }
    }

    #[test]
    fn test_activity_and_creation_share_a_group() {
        let digest = group(
            &[
                activity("alice", "repo1", "first", 1),
                activity("alice", "repo1", "second", 2),
            ],
            &[created("alice", "repo1", 1)],
        );

        assert_eq!(digest.len(), 1);
        let entries = digest.get("alice/repo1").unwrap();
        assert_eq!(entries.len(), 3);
        assert!(matches!(entries[2], Entry::Created(_)));
    }

    #[test]
    fn test_keys_keep_first_seen_order() {
        let digest = group(
            &[
                activity("bob", "b", "x", 1),
                activity("alice", "a", "y", 2),
                activity("bob", "b", "z", 3),
            ],
            &[created("carol", "c", 1), created("alice", "a", 1)],
        );

        let keys: Vec<&str> = digest.groups().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["bob/b", "alice/a", "carol/c"]);
    }

    #[test]
    fn test_empty_inputs_give_empty_digest() {
        assert!(group(&[], &[]).is_empty());
    }
}
