// tweets2feed: signed Atom feeds for Twitter user timelines
//
// This is the library root. Each module corresponds to one part of the
// request path: signing and verifying feed URLs, fetching timelines,
// rendering them, and deciding how long responses may be cached.

pub mod cache;
pub mod config;
pub mod render;
pub mod signing;
pub mod twitter;

#[cfg(feature = "web")]
pub mod web;
