// Cache lifetime policy.
//
// A 500 most likely means the upstream rate limit was exceeded, so it is
// cached long enough to wait the limit out. Everything else gets the regular
// lifetime, which keeps well inside the 15 minute rate-limit window. Dev mode
// disables caching outright.

use std::time::Duration;

use crate::config::{CacheTtls, Config};

/// Outcome of the cache policy for one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    /// Leave the response uncached and its headers untouched.
    NoCache,
    /// Cache for this long.
    Ttl(Duration),
}

impl CacheDecision {
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            Self::NoCache => None,
            Self::Ttl(ttl) => Some(*ttl),
        }
    }
}

/// The policy with its lifetimes fixed at startup.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    dev_mode: bool,
    ttls: CacheTtls,
}

impl CachePolicy {
    pub fn new(dev_mode: bool, ttls: CacheTtls) -> Self {
        Self { dev_mode, ttls }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.dev_mode, config.cache_ttls)
    }

    pub fn decide(&self, status: u16) -> CacheDecision {
        if self.dev_mode {
            return CacheDecision::NoCache;
        }
        if status == 500 {
            CacheDecision::Ttl(self.ttls.rate_limited_ttl)
        } else {
            CacheDecision::Ttl(self.ttls.default_ttl)
        }
    }
}

/// Decide with the default lifetimes (2700s, 7200s for a 500).
pub fn decide(dev_mode: bool, status: u16) -> CacheDecision {
    CachePolicy::new(dev_mode, CacheTtls::default()).decide(status)
}
