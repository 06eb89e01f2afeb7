use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

const PULL_REQUEST_QUERY: &str = include_str!("../queries/PullRequest.gql");
const ISSUE_QUERY: &str = include_str!("../queries/Issue.gql");
const REPOSITORY_QUERY: &str = include_str!("../queries/Repository.gql");

/// File names looked up when queries are loaded from a directory.
pub const PULL_REQUEST_FILE: &str = "PullRequest.gql";
pub const ISSUE_FILE: &str = "Issue.gql";
pub const REPOSITORY_FILE: &str = "Repository.gql";

/// The three GraphQL documents sent verbatim as request bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySet {
    pub pull_requests: String,
    pub issues: String,
    pub repositories: String,
}

impl QuerySet {
    /// Queries compiled into the binary.
    pub fn embedded() -> Self {
        Self {
            pull_requests: PULL_REQUEST_QUERY.to_string(),
            issues: ISSUE_QUERY.to_string(),
            repositories: REPOSITORY_QUERY.to_string(),
        }
    }

    /// Reads all three documents from `dir`; every file must exist.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let read = |file: &str| -> Result<String> {
            let path = dir.join(file);
            debug!("loading query document {}", path.display());
            std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read query document '{}'", path.display()))
        };

        Ok(Self {
            pull_requests: read(PULL_REQUEST_FILE)?,
            issues: read(ISSUE_FILE)?,
            repositories: read(REPOSITORY_FILE)?,
        })
    }

    pub fn load(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Ok(Self::embedded()),
        }
    }
}
