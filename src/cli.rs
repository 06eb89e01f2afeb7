use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use url::Url;

use crate::{
    github::DEFAULT_ENDPOINT,
    types::{DateWindow, ReportSpec},
};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

/// Page size used by the GitHub queries unless overridden.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

#[derive(Parser, Debug)]
#[command(name = "ghdigest")]
#[command(
    about = "Summarise a GitHub user's pull requests, issues and new repositories between two days as Markdown, grouped by repository"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
struct CliArgs {
    /// GitHub login whose activity is collected
    #[arg(value_name = "USERNAME")]
    user: String,

    /// First day of the window (yyyy-MM-dd, inclusive)
    #[arg(value_name = "FROM_DAY", value_parser = parse_day)]
    from_day: NaiveDate,

    /// Last day of the window (yyyy-MM-dd, inclusive)
    #[arg(value_name = "TO_DAY", value_parser = parse_day)]
    to_day: NaiveDate,

    /// GraphQL API base URL
    #[arg(long, env = "GHDIGEST_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: Url,

    /// Directory holding PullRequest.gql, Issue.gql and Repository.gql
    #[arg(long, value_name = "DIR")]
    queries: Option<PathBuf>,

    /// Edges requested per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..=100))]
    page_size: u32,

    /// Stop each fetch after this many pages
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,

    /// Print the digest without copying it to the clipboard
    #[arg(long)]
    no_clipboard: bool,
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|err| format!("expected a day as yyyy-MM-dd, got '{s}': {err}"))
}

fn build_spec_from_cli(cli: CliArgs) -> Result<ReportSpec> {
    let window = DateWindow::new(cli.from_day, cli.to_day)?;

    Ok(ReportSpec {
        login: cli.user,
        window,
        page_size: cli.page_size,
        max_pages: cli.max_pages.map(|n| n as usize),
        endpoint: cli.endpoint,
        queries_dir: cli.queries,
        copy_to_clipboard: !cli.no_clipboard,
    })
}

/// Parses command-line arguments into a report specification.
///
/// Clap failures (including `--help` and `--version`) are returned as
/// `clap::Error` inside the `anyhow::Error` so the caller can pick the
/// exit status.
pub fn parse_args<I, T>(args: I) -> Result<ReportSpec>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;
    build_spec_from_cli(cli)
}
