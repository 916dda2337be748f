// Upstream timeline client — the swap-ready abstraction plus its HTTP
// implementation.
//
// `TimelineSource` is what the web layer talks to. `TwitterClient` reads the
// v1.1 user timeline with an app-only bearer token and probes the public
// profile page to check that an account exists. Tests plug in their own
// source.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::posts::{parse_timeline, Post};
use crate::config::Config;

/// Where timelines come from.
#[async_trait]
pub trait TimelineSource: Send + Sync {
    /// Fetch the most recent posts of `username`, newest first.
    async fn fetch_timeline(&self, username: &str) -> Result<Vec<Post>>;

    /// Whether an account with this handle exists.
    async fn account_exists(&self, username: &str) -> Result<bool>;
}

/// HTTP client for the upstream REST API.
pub struct TwitterClient {
    client: reqwest::Client,
    api_url: String,
    web_url: String,
    bearer_token: String,
    timeline_count: u32,
}

impl TwitterClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("tweets2feed/0.1")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            web_url: config.web_url.trim_end_matches('/').to_string(),
            bearer_token: config.bearer_token.clone(),
            timeline_count: config.timeline_count,
        })
    }
}

#[async_trait]
impl TimelineSource for TwitterClient {
    async fn fetch_timeline(&self, username: &str) -> Result<Vec<Post>> {
        let url = format!("{}/1.1/statuses/user_timeline.json", self.api_url);
        let count = self.timeline_count.to_string();

        debug!(username, "Fetching user timeline");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(&[("screen_name", username), ("count", count.as_str())])
            .send()
            .await
            .with_context(|| format!("Timeline request failed for @{username}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read timeline response for @{username}"))?;

        if !status.is_success() {
            anyhow::bail!("Timeline for @{username} returned {status}: {body}");
        }

        let posts = parse_timeline(&body)
            .with_context(|| format!("Failed to deserialize timeline for @{username}"))?;

        debug!(username, count = posts.len(), "Fetched user timeline");
        Ok(posts)
    }

    async fn account_exists(&self, username: &str) -> Result<bool> {
        // The public profile page answers 200 only for existing accounts,
        // which saves an API call.
        let url = format!("{}/{}", self.web_url, username);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Profile probe failed for @{username}"))?;

        Ok(response.status() == StatusCode::OK)
    }
}
