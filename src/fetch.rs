use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

use crate::{
    github::Forge,
    query::QuerySet,
    types::{
        ActivityKind, ActivityRecord, Connection, DateWindow, GraphQLActivity, GraphQLRepository,
        GraphQLResponse, PageVariables, RepositoryRecord, ReportSpec, UserConnections, UserData,
    },
};

/// Why a page could not be turned into records.
#[derive(Debug)]
pub enum FetchError {
    Transport(octocrab::Error),
    GraphQL(Vec<String>),
    MissingData { connection: &'static str },
    Decode(serde_json::Error),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Transport(err) => write!(f, "GraphQL request failed: {err}"),
            FetchError::GraphQL(messages) => {
                write!(f, "GraphQL errors: {}", messages.join("; "))
            }
            FetchError::MissingData { connection } => {
                write!(f, "response has no user.{connection} connection")
            }
            FetchError::Decode(err) => write!(f, "unexpected response shape: {err}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Transport(err) => Some(err),
            FetchError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

/// One paginated user connection and how its nodes become records.
trait Feed {
    type Node: DeserializeOwned;
    type Record;

    /// Field name under `user` in the response.
    const CONNECTION: &'static str;
    /// Tail of the progress message.
    const PROGRESS: &'static str;

    fn connection(user: UserConnections<Self::Node>) -> Option<Connection<Self::Node>>;
    fn keep(node: &Self::Node, window: &DateWindow) -> bool;
    fn updated_at(node: &Self::Node) -> DateTime<Utc>;
    fn into_record(node: Self::Node) -> Self::Record;
}

fn activity_record(kind: ActivityKind, node: GraphQLActivity) -> ActivityRecord {
    ActivityRecord {
        kind,
        title: node.title,
        updated_at: node.updated_at,
        url: node.url,
        author: node.author,
        repository: node.repository,
    }
}

struct PullRequests;

impl Feed for PullRequests {
    type Node = GraphQLActivity;
    type Record = ActivityRecord;

    const CONNECTION: &'static str = "pullRequests";
    const PROGRESS: &'static str = "of pull requests";

    fn connection(user: UserConnections<GraphQLActivity>) -> Option<Connection<GraphQLActivity>> {
        user.pull_requests
    }

    fn keep(node: &GraphQLActivity, window: &DateWindow) -> bool {
        window.contains(node.updated_at)
    }

    fn updated_at(node: &GraphQLActivity) -> DateTime<Utc> {
        node.updated_at
    }

    fn into_record(node: GraphQLActivity) -> ActivityRecord {
        activity_record(ActivityKind::PullRequest, node)
    }
}

struct Issues;

impl Feed for Issues {
    type Node = GraphQLActivity;
    type Record = ActivityRecord;

    const CONNECTION: &'static str = "issues";
    const PROGRESS: &'static str = "of issues";

    fn connection(user: UserConnections<GraphQLActivity>) -> Option<Connection<GraphQLActivity>> {
        user.issues
    }

    fn keep(node: &GraphQLActivity, window: &DateWindow) -> bool {
        window.contains(node.updated_at)
    }

    fn updated_at(node: &GraphQLActivity) -> DateTime<Utc> {
        node.updated_at
    }

    fn into_record(node: GraphQLActivity) -> ActivityRecord {
        activity_record(ActivityKind::Issue, node)
    }
}

struct Repositories;

impl Feed for Repositories {
    type Node = GraphQLRepository;
    type Record = RepositoryRecord;

    const CONNECTION: &'static str = "repositories";
    const PROGRESS: &'static str = "on repositories";

    fn connection(
        user: UserConnections<GraphQLRepository>,
    ) -> Option<Connection<GraphQLRepository>> {
        user.repositories
    }

    fn keep(node: &GraphQLRepository, window: &DateWindow) -> bool {
        !node.is_fork && !node.is_private && window.contains(node.created_at)
    }

    fn updated_at(node: &GraphQLRepository) -> DateTime<Utc> {
        node.updated_at
    }

    fn into_record(node: GraphQLRepository) -> RepositoryRecord {
        RepositoryRecord {
            name: node.name,
            created_at: node.created_at,
            owner: node.owner,
            url: node.url,
        }
    }
}

/// Decides whether backward pagination can stop: nothing on this page
/// qualified and every edge was last updated at or before the window
/// start. An empty page is always up to date.
pub fn is_up_to_date<I>(survivors: usize, updated: I, window: &DateWindow) -> bool
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    survivors == 0 && updated.into_iter().all(|at| window.is_settled(at))
}

struct PageOutcome<R> {
    survivors: Vec<R>,
    up_to_date: bool,
    start_cursor: Option<String>,
}

fn evaluate_page<F: Feed>(
    connection: Connection<F::Node>,
    window: &DateWindow,
) -> PageOutcome<F::Record> {
    let updated: Vec<DateTime<Utc>> = connection
        .edges
        .iter()
        .map(|edge| F::updated_at(&edge.node))
        .collect();

    let survivors: Vec<F::Record> = connection
        .edges
        .into_iter()
        .map(|edge| edge.node)
        .filter(|node| F::keep(node, window))
        .map(F::into_record)
        .collect();

    PageOutcome {
        up_to_date: is_up_to_date(survivors.len(), updated, window),
        survivors,
        start_cursor: connection.page_info.start_cursor,
    }
}

async fn fetch_page<F, G>(
    forge: &G,
    query: &str,
    variables: &PageVariables,
) -> Result<Connection<F::Node>>
where
    F: Feed,
    G: Forge + Sync + ?Sized,
{
    let body = forge.send(query, variables).await?;

    let response: GraphQLResponse<UserData<F::Node>> =
        serde_json::from_value(body).map_err(|err| {
            error!("Failed to decode {} page: {err}", F::CONNECTION);
            FetchError::Decode(err)
        })?;

    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        error!("GraphQL errors for {}: {}", F::CONNECTION, messages.join("; "));
        return Err(FetchError::GraphQL(messages).into());
    }

    response
        .data
        .and_then(|data| data.user)
        .and_then(F::connection)
        .ok_or_else(|| {
            FetchError::MissingData {
                connection: F::CONNECTION,
            }
            .into()
        })
}

/// Walks a connection backwards from the newest page until the window is
/// exhausted, returning qualifying records oldest page first.
async fn paginate<F, G>(forge: &G, query: &str, spec: &ReportSpec) -> Result<Vec<F::Record>>
where
    F: Feed,
    G: Forge + Sync + ?Sized,
{
    let mut collected: Vec<F::Record> = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let variables = PageVariables {
            login: spec.login.clone(),
            last: spec.page_size,
            before: cursor.take(),
        };
        let connection = fetch_page::<F, G>(forge, query, &variables).await?;
        pages += 1;

        let page = evaluate_page::<F>(connection, &spec.window);
        let mut survivors = page.survivors;
        survivors.append(&mut collected);
        collected = survivors;

        if page.up_to_date {
            return Ok(collected);
        }

        info!("Fetching {}th events {}...", collected.len(), F::PROGRESS);

        match page.start_cursor {
            Some(start) => cursor = Some(start),
            None => {
                warn!("{} page has no start cursor, stopping", F::CONNECTION);
                return Ok(collected);
            }
        }

        if spec.max_pages.is_some_and(|max| pages >= max) {
            warn!(
                "Stopped {} after {} pages with {} records",
                F::CONNECTION,
                pages,
                collected.len()
            );
            return Ok(collected);
        }
    }
}

pub async fn fetch_pull_requests<G>(
    forge: &G,
    query: &str,
    spec: &ReportSpec,
) -> Result<Vec<ActivityRecord>>
where
    G: Forge + Sync + ?Sized,
{
    paginate::<PullRequests, G>(forge, query, spec).await
}

pub async fn fetch_issues<G>(forge: &G, query: &str, spec: &ReportSpec) -> Result<Vec<ActivityRecord>>
where
    G: Forge + Sync + ?Sized,
{
    paginate::<Issues, G>(forge, query, spec).await
}

pub async fn fetch_repositories<G>(
    forge: &G,
    query: &str,
    spec: &ReportSpec,
) -> Result<Vec<RepositoryRecord>>
where
    G: Forge + Sync + ?Sized,
{
    paginate::<Repositories, G>(forge, query, spec).await
}

/// Records gathered by one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Harvest {
    /// Pull requests and issues, ascending by `updated_at`.
    pub activity: Vec<ActivityRecord>,
    pub repositories: Vec<RepositoryRecord>,
}

/// Runs the three fetch chains concurrently and merges their activity.
pub async fn fetch_activity<G>(forge: &G, queries: &QuerySet, spec: &ReportSpec) -> Result<Harvest>
where
    G: Forge + Sync + ?Sized,
{
    let (pull_requests, issues, repositories) = tokio::try_join!(
        fetch_pull_requests(forge, &queries.pull_requests, spec),
        fetch_issues(forge, &queries.issues, spec),
        fetch_repositories(forge, &queries.repositories, spec),
    )?;

    let mut activity = pull_requests;
    activity.extend(issues);
    activity.sort_by_key(|record| record.updated_at);

    Ok(Harvest {
        activity,
        repositories,
    })
}
