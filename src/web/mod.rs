// Web server — Axum front end for the feed service.
//
// Public routes: the homepage form (GET/POST /) and /health.
// Protected route: GET /{username}.atom, behind the signature guard and
// wrapped by the cache policy middleware, which also keeps an in-process
// copy of every cacheable response.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::cache::CachePolicy;
use crate::config::Config;
use crate::render::feed::USERNAME_PARAM;
use crate::signing::{SignatureGuard, Signer};
use crate::twitter::client::TimelineSource;

pub mod cache;
pub mod guard;
pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub timelines: Arc<dyn TimelineSource>,
    pub signer: Signer,
    pub feed_guard: Arc<SignatureGuard>,
    pub cache_policy: CachePolicy,
    pub responses: cache::ResponseStore,
}

impl AppState {
    /// Wire up the state at startup.
    ///
    /// Fails on guard misconfiguration and on a missing secret outside dev
    /// mode.
    pub fn new(config: Config, timelines: Arc<dyn TimelineSource>) -> Result<Self> {
        config.require_secret()?;

        let signer = Signer::new(config.secret.clone());
        if !signer.is_enabled() {
            warn!("Feed signing is disabled; every feed request will be refused");
        }

        // Only the username is signed: `_format` and the signature itself
        // stay out so new query fields never break existing links.
        let feed_guard = SignatureGuard::new(signer.clone(), [USERNAME_PARAM])
            .context("Failed to configure feed signature guard")?;

        Ok(Self {
            cache_policy: CachePolicy::from_config(&config),
            config: Arc::new(config),
            timelines,
            signer,
            feed_guard: Arc::new(feed_guard),
            responses: cache::new_store(),
        })
    }
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(state: AppState, port: u16, bind: &str) -> Result<()> {
    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("tweets2feed listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    // Feed route: the cache layer is added last so it wraps the guard and
    // sees denials too.
    let feed = Router::new()
        .route("/{file}", get(handlers::feed::get_feed))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            guard::require_signature,
        ))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            cache::apply_cache_policy,
        ));

    let public = Router::new()
        .route(
            "/",
            get(handlers::homepage::show_form).post(handlers::homepage::submit_form),
        )
        .route("/health", get(health));

    Router::new()
        .merge(feed)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check — always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Plain-text response helper for errors.
pub fn text_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message.to_string(),
    )
        .into_response()
}
