// GET /{username}.atom — the signed Atom feed.
//
// Runs after the signature guard, which leaves the parsed FeedRequest in the
// request extensions. Upstream failures become a 500 carrying the upstream
// message; the cache middleware then holds that 500 for the long TTL.

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use tracing::{error, info};

use crate::render::feed::{render_feed, self_link, ATOM_CONTENT_TYPE};
use crate::web::guard::FeedRequest;
use crate::web::{text_response, AppState};

pub async fn get_feed(
    State(state): State<AppState>,
    Extension(feed): Extension<FeedRequest>,
    uri: Uri,
) -> Response {
    let posts = match state.timelines.fetch_timeline(&feed.username).await {
        Ok(posts) => posts,
        Err(err) => {
            let message = format!("{err:#}");
            error!(username = %feed.username, error = %message, "Upstream timeline fetch failed");
            return text_response(StatusCode::INTERNAL_SERVER_ERROR, &message);
        }
    };

    let requested = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let self_url = self_link(state.config.public_url.as_deref(), requested);
    let body = render_feed(&feed.username, &self_url, &posts);

    info!(username = %feed.username, posts = posts.len(), "Rendered feed");

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, ATOM_CONTENT_TYPE)],
        body,
    )
        .into_response()
}
