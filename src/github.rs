use std::process::Command;

use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::{debug, error};
use url::Url;

use crate::{fetch::FetchError, types::PageVariables};

pub const DEFAULT_ENDPOINT: &str = "https://api.github.com";

/// Environment variables searched for a token, in order.
pub const TOKEN_VARIABLES: [&str; 3] = ["GITHUB_API_TOKEN", "GITHUB_TOKEN", "GH_TOKEN"];

pub fn get_github_token() -> Result<String> {
    // Prefer environment variables over gh CLI to avoid subprocess overhead.
    for name in TOKEN_VARIABLES {
        if let Ok(token) = std::env::var(name) {
            if !token.trim().is_empty() {
                debug!("using token from {name}");
                return Ok(token);
            }
        }
    }

    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .context("No token in GITHUB_API_TOKEN, GITHUB_TOKEN or GH_TOKEN and gh CLI is unavailable")?;

    if !output.status.success() {
        anyhow::bail!("Failed to get GitHub token from gh CLI. Please set GITHUB_API_TOKEN");
    }

    let token = String::from_utf8(output.stdout)?.trim().to_string();

    if token.is_empty() {
        anyhow::bail!("Empty token returned from gh CLI");
    }

    Ok(token)
}

/// A GraphQL endpoint able to answer the digest queries.
#[async_trait]
pub trait Forge {
    /// Sends one query document with its variables and returns the raw
    /// JSON response body.
    async fn send(&self, query: &str, variables: &PageVariables) -> Result<serde_json::Value>;
}

/// The GitHub GraphQL API, reached through octocrab.
pub struct GitHub {
    client: Octocrab,
}

impl GitHub {
    pub fn new(endpoint: &Url, token: String) -> Result<Self> {
        let client = Octocrab::builder()
            .base_uri(endpoint.as_str())
            .with_context(|| format!("Invalid GraphQL endpoint: '{}'", endpoint))?
            .personal_token(token)
            .build()
            .context("Failed to create GitHub client")?;
        Ok(Self { client })
    }

    /// Creates an authenticated client using available credentials.
    pub fn from_env(endpoint: &Url) -> Result<Self> {
        let token = get_github_token().context("Failed to obtain GitHub authentication token")?;
        Self::new(endpoint, token)
    }
}

#[async_trait]
impl Forge for GitHub {
    async fn send(&self, query: &str, variables: &PageVariables) -> Result<serde_json::Value> {
        let payload = serde_json::json!({
            "query": query,
            "variables": variables,
        });
        debug!(
            login = %variables.login,
            before = variables.before.as_deref().unwrap_or("-"),
            "POST graphql"
        );

        self.client
            .graphql::<serde_json::Value>(&payload)
            .await
            .map_err(|err| {
                error!("GraphQL request failed: {err}");
                FetchError::Transport(err).into()
            })
    }
}
