// Signature guard middleware for the feed route.
//
// Feed path format: /{username}.atom?signature={sha1_hex}
//
// The route attributes are `username` and `_format`; the guard only signs
// `username`. On success the parsed `FeedRequest` is put into the request
// extensions for the handler.

use std::collections::HashMap;

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use super::{text_response, AppState};
use crate::render::feed::{FEED_SUFFIX, USERNAME_PARAM};
use crate::signing::SIGNATURE_PARAM;
use crate::twitter::username;

/// Route attribute naming the requested format. Never signed.
pub const FORMAT_ATTRIBUTE: &str = "_format";

/// A feed request that passed the routing constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub username: String,
}

impl FeedRequest {
    /// Parse the last path segment, e.g. `alangbem.atom`. `None` unless the
    /// segment is a valid username followed by the feed suffix.
    pub fn parse(segment: &str) -> Option<Self> {
        let name = segment.strip_suffix(FEED_SUFFIX)?;
        username::validate(name).ok()?;
        Some(Self {
            username: name.to_string(),
        })
    }

    /// Attributes the router derived from the path.
    fn attributes(&self) -> HashMap<String, String> {
        HashMap::from([
            (USERNAME_PARAM.to_string(), self.username.clone()),
            (
                FORMAT_ATTRIBUTE.to_string(),
                FEED_SUFFIX.trim_start_matches('.').to_string(),
            ),
        ])
    }
}

/// Axum middleware: reject feed requests without a valid signature with 403.
pub async fn require_signature(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(feed) = FeedRequest::parse(&segment) else {
        return text_response(StatusCode::NOT_FOUND, "Not Found");
    };

    let presented = query.get(SIGNATURE_PARAM).map(String::as_str);
    if let Err(reason) = state.feed_guard.authorize(&feed.attributes(), presented) {
        warn!(username = %feed.username, %reason, "Feed request denied");
        return text_response(StatusCode::FORBIDDEN, reason.public_message());
    }

    debug!(username = %feed.username, "Feed request authorized");
    request.extensions_mut().insert(feed);
    next.run(request).await
}
