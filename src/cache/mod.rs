// Response caching policy.
//
// The decision is a pure function of the response status and the dev-mode
// flag; the web layer applies it (headers plus the in-process store).

pub mod policy;

pub use policy::{decide, CacheDecision, CachePolicy};
