use std::env;
use std::time::Duration;

use anyhow::Result;

/// Default upstream API endpoint for timeline reads.
pub const DEFAULT_API_URL: &str = "https://api.twitter.com";

/// Default public web endpoint, used to probe whether an account exists.
pub const DEFAULT_WEB_URL: &str = "https://twitter.com";

/// Number of posts requested per timeline fetch (the API maximum).
pub const DEFAULT_TIMELINE_COUNT: u32 = 200;

/// Response lifetimes handed out by the cache policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// Lifetime of every response that is not a 500.
    ///
    /// The upstream rate-limit window is 15 minutes; 45 minutes keeps a
    /// 3x margin so a cached feed never drives us over the limit.
    pub default_ttl: Duration,
    /// Lifetime of a 500. Most likely the upstream rate limit was hit,
    /// so the failure is held long enough to wait it out.
    pub rate_limited_ttl: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(60 * 45),
            rate_limited_ttl: Duration::from_secs(60 * 120),
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// Built once at startup and shared read-only afterwards. The .env file
/// is loaded automatically at startup via dotenvy. Not `Debug`: it holds
/// the signing secret.
#[derive(Clone)]
pub struct Config {
    /// Shared secret for feed URL signatures. `None` disables signing,
    /// which is only allowed in dev mode (see `require_secret`).
    pub secret: Option<String>,
    /// Development mode: response caching is switched off entirely.
    pub dev_mode: bool,
    /// App-only bearer token for the upstream timeline API.
    pub bearer_token: String,
    pub api_url: String,
    pub web_url: String,
    /// Public base URL of this service (e.g. `https://feeds.example.org`).
    /// When set, the feed's self link is absolute.
    pub public_url: Option<String>,
    pub timeline_count: u32,
    pub cache_ttls: CacheTtls,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret: None,
            dev_mode: false,
            bearer_token: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            web_url: DEFAULT_WEB_URL.to_string(),
            public_url: None,
            timeline_count: DEFAULT_TIMELINE_COUNT,
            cache_ttls: CacheTtls::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default; use the `require_*` checks before an
    /// operation that needs a particular value.
    pub fn load() -> Result<Self> {
        let timeline_count = match env::var("TWEETS2FEED_TIMELINE_COUNT") {
            Ok(raw) => raw.trim().parse::<u32>().map_err(|_| {
                anyhow::anyhow!("TWEETS2FEED_TIMELINE_COUNT must be a positive integer, got {raw:?}")
            })?,
            Err(_) => DEFAULT_TIMELINE_COUNT,
        };

        Ok(Self {
            // An empty secret is the same as no secret at all.
            secret: env::var("TWEETS2FEED_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            dev_mode: env::var("TWEETS2FEED_DEBUG")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            bearer_token: env::var("TWITTER_BEARER_TOKEN").unwrap_or_default(),
            api_url: env::var("TWITTER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            web_url: env::var("TWITTER_WEB_URL").unwrap_or_else(|_| DEFAULT_WEB_URL.to_string()),
            public_url: env::var("TWEETS2FEED_PUBLIC_URL")
                .ok()
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            timeline_count,
            cache_ttls: CacheTtls::default(),
        })
    }

    /// Refuse to run without a signing secret outside of dev mode.
    /// Call this before serving feeds.
    pub fn require_secret(&self) -> Result<()> {
        if self.secret.is_none() && !self.dev_mode {
            anyhow::bail!(
                "TWEETS2FEED_SECRET not set. Feed URLs cannot be signed without it.\n\
                 Set TWEETS2FEED_DEBUG=1 to run unsigned for local development."
            );
        }
        Ok(())
    }

    /// Check that the upstream API credentials are configured.
    pub fn require_twitter(&self) -> Result<()> {
        if self.bearer_token.is_empty() {
            anyhow::bail!(
                "TWITTER_BEARER_TOKEN not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
