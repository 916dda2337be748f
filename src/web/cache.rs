// Cache middleware — applies the cache policy to feed responses.
//
// Every response the policy gives a TTL gets `Cache-Control: public,
// s-maxage=<ttl>` and is kept in an in-process moka store for that long,
// keyed by path and query. A stored 500 therefore shields the upstream for
// the whole rate-limited window. In dev mode nothing is set or stored.

use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use moka::future::Cache;
use moka::Expiry;
use tracing::{debug, warn};

use super::AppState;

/// Maximum number of stored responses.
pub const DEFAULT_STORE_CAPACITY: u64 = 10_000;

/// Largest response body the middleware will buffer for storage.
const MAX_STORED_BODY: usize = 8 * 1024 * 1024;

/// A response kept for replay.
#[derive(Clone, Debug)]
pub struct StoredResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub ttl: Duration,
}

impl IntoResponse for StoredResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Expires each entry after the TTL the policy gave it.
struct PolicyExpiry;

impl Expiry<String, StoredResponse> for PolicyExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredResponse,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Type alias for the response store.
pub type ResponseStore = Cache<String, StoredResponse>;

/// Create an empty response store.
pub fn new_store() -> ResponseStore {
    Cache::builder()
        .max_capacity(DEFAULT_STORE_CAPACITY)
        .expire_after(PolicyExpiry)
        .build()
}

/// Axum middleware: serve from the store, or run the request and apply the
/// cache policy to its response.
pub async fn apply_cache_policy(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let key = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    if let Some(hit) = state.responses.get(&key).await {
        debug!(key = %key, "cache hit");
        return hit.into_response();
    }
    debug!(key = %key, "cache miss");

    let response = next.run(request).await;
    let Some(ttl) = state.cache_policy.decide(response.status().as_u16()).ttl() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    if let Ok(value) = HeaderValue::from_str(&cache_control(ttl)) {
        parts.headers.insert(header::CACHE_CONTROL, value);
    }

    let body = match axum::body::to_bytes(body, MAX_STORED_BODY).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(key = %key, error = %err, "failed to buffer response for cache");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let stored = StoredResponse {
        status: parts.status,
        headers: parts.headers.clone(),
        body: body.clone(),
        ttl,
    };
    state.responses.insert(key, stored).await;

    Response::from_parts(parts, Body::from(body))
}

/// `Cache-Control` value for a shared-cache lifetime.
pub fn cache_control(ttl: Duration) -> String {
    format!("public, s-maxage={}", ttl.as_secs())
}
