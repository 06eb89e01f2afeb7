use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Everything one run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct ReportSpec {
    pub login: String,
    pub window: DateWindow,
    pub page_size: u32,
    pub max_pages: Option<usize>,
    pub endpoint: Url,
    pub queries_dir: Option<PathBuf>,
    pub copy_to_clipboard: bool,
}

/// Inclusive reporting window, bounded by midnight UTC of both days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(from_day: NaiveDate, to_day: NaiveDate) -> Result<Self> {
        if from_day > to_day {
            anyhow::bail!(
                "fromDay must not be after toDay, got {} > {}",
                from_day,
                to_day
            );
        }
        Ok(Self {
            from: from_day.and_time(NaiveTime::MIN).and_utc(),
            to: to_day.and_time(NaiveTime::MIN).and_utc(),
        })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at <= self.to
    }

    /// True when `at` is no later than the start of the window, so
    /// anything older can no longer qualify.
    pub fn is_settled(&self, at: DateTime<Utc>) -> bool {
        at <= self.from
    }
}

/// Which connection an activity record was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    PullRequest,
    Issue,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Actor {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryRef {
    pub name: String,
    pub owner: Actor,
}

impl RepositoryRef {
    /// Returns `owner/name`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.login, self.name)
    }
}

/// A pull request or issue updated inside the window.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub kind: ActivityKind,
    pub title: String,
    pub updated_at: DateTime<Utc>,
    pub url: String,
    pub author: Option<Actor>,
    pub repository: RepositoryRef,
}

/// A public, non-fork repository created inside the window.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryRecord {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub owner: Actor,
    pub url: String,
}

impl RepositoryRecord {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.login, self.name)
    }
}

/// One line of the digest.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Activity(ActivityRecord),
    Created(RepositoryRecord),
}

impl Entry {
    pub fn key(&self) -> String {
        match self {
            Entry::Activity(record) => record.repository.full_name(),
            Entry::Created(record) => record.full_name(),
        }
    }
}

/// Variables shared by all three query documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageVariables {
    pub login: String,
    pub last: u32,
    pub before: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct UserData<N> {
    pub user: Option<UserConnections<N>>,
}

/// Each query document selects exactly one of these connections.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConnections<N> {
    pub pull_requests: Option<Connection<N>>,
    pub issues: Option<Connection<N>>,
    pub repositories: Option<Connection<N>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<N> {
    pub page_info: PageInfo,
    pub edges: Vec<Edge<N>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub end_cursor: Option<String>,
    pub start_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Edge<N> {
    pub node: N,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLActivity {
    pub title: String,
    pub updated_at: DateTime<Utc>,
    pub url: String,
    pub author: Option<Actor>,
    pub repository: RepositoryRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRepository {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: Actor,
    pub url: String,
    pub is_fork: bool,
    pub is_private: bool,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_bounds_are_inclusive_midnights() {
        let window = DateWindow::new(day(2024, 3, 1), day(2024, 3, 7)).unwrap();

        assert!(window.contains(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
        assert!(window.contains(Utc.with_ymd_and_hms(2024, 3, 7, 0, 0, 0).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2024, 3, 7, 0, 0, 1).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()));
    }

    #[test]
    fn test_window_rejects_reversed_days() {
        let err = DateWindow::new(day(2024, 3, 7), day(2024, 3, 1)).unwrap_err();
        assert!(err.to_string().contains("fromDay must not be after toDay"));
    }

    #[test]
    fn test_single_day_window() {
        let window = DateWindow::new(day(2024, 3, 1), day(2024, 3, 1)).unwrap();
        assert!(window.contains(window.from));
        assert!(window.is_settled(window.from));
    }

    #[test]
    fn test_page_variables_serialize_null_cursor() {
        let vars = PageVariables {
            login: "alice".to_string(),
            last: 25,
            before: None,
        };
        let json = serde_json::to_value(&vars).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"login": "alice", "last": 25, "before": null})
        );
    }

    #[test]
    fn test_deserialize_repository_page() {
        let body = serde_json::json!({
            "data": {
                "user": {
                    "repositories": {
                        "pageInfo": {"endCursor": "b", "startCursor": "a"},
                        "edges": [{
                            "node": {
                                "name": "r",
                                "createdAt": "2024-03-05T00:00:00Z",
                                "updatedAt": "2024-03-06T00:00:00Z",
                                "owner": {"login": "o"},
                                "url": "http://x/2",
                                "isFork": false,
                                "isPrivate": false
                            }
                        }]
                    }
                }
            }
        });

        let response: GraphQLResponse<UserData<GraphQLRepository>> =
            serde_json::from_value(body).unwrap();
        let user = response.data.unwrap().user.unwrap();
        assert!(user.pull_requests.is_none());
        let connection = user.repositories.unwrap();
        assert_eq!(connection.page_info.start_cursor.as_deref(), Some("a"));
        assert_eq!(connection.edges[0].node.owner.login, "o");
        assert!(response.errors.is_empty());
    }
}
