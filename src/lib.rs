//! ghdigest: a Markdown digest of a GitHub user's recent activity.
//!
//! Walks the user's pull requests, issues and repositories backwards
//! through the GitHub GraphQL API, keeps what falls inside a date window,
//! groups it by repository and renders one Markdown section per
//! repository.

pub mod cli;
pub mod display;
pub mod fetch;
pub mod github;
pub mod group;
pub mod query;
pub mod types;

use anyhow::Result;

pub use cli::parse_args;
pub use display::render_markdown;
pub use fetch::{FetchError, Harvest, fetch_activity};
pub use github::{Forge, GitHub};
pub use group::{Digest, group};
pub use query::QuerySet;
pub use types::{
    ActivityKind, ActivityRecord, Actor, DateWindow, Entry, PageVariables, RepositoryRecord,
    RepositoryRef, ReportSpec,
};

/// Fetches everything for `spec` and renders the digest.
pub async fn build_digest<F>(forge: &F, queries: &QuerySet, spec: &ReportSpec) -> Result<String>
where
    F: Forge + Sync + ?Sized,
{
    let harvest = fetch_activity(forge, queries, spec).await?;
    tracing::info!(
        activity = harvest.activity.len(),
        repositories = harvest.repositories.len(),
        "fetched"
    );
    let digest = group(&harvest.activity, &harvest.repositories);
    Ok(render_markdown(&digest))
}
