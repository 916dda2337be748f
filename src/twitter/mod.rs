// Twitter — timeline data model, username rules and the upstream client.
//
// Reads go through the v1.1 REST API with an app-only bearer token. Each
// submodule handles one concern.

pub mod client;
pub mod posts;
pub mod username;
