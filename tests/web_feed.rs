// End-to-end tests for the HTTP surface.
//
// Drives the full router with tower's `oneshot` against an in-memory
// timeline source, so no network access is involved.

#![cfg(feature = "web")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use tweets2feed::config::Config;
use tweets2feed::twitter::client::TimelineSource;
use tweets2feed::twitter::posts::{parse_timeline, Post};
use tweets2feed::web::{build_router, AppState};

const ALANGBEM_FEED: &str = "/alangbem.atom?signature=87ea11b701cfcd5e6ec73c8fb2fd2cb6032abf73";

const TIMELINE: &str = r##"[{
    "id_str": "350621389112209408",
    "created_at": "Fri Jun 28 15:22:15 +0000 2013",
    "text": "Moving on from #GoogleReader to #Google alternatives, thanks @john http://t.co/abc",
    "entities": {
        "hashtags": [{"text": "GoogleReader"}, {"text": "Google"}],
        "user_mentions": [{"screen_name": "john", "name": "John Snow"}],
        "urls": [{"url": "http://t.co/abc", "expanded_url": "http://example.com/abc"}]
    }
}]"##;

/// In-memory timeline source that counts upstream calls.
#[derive(Default)]
struct FakeTimeline {
    posts: Vec<Post>,
    failure: Option<String>,
    exists: bool,
    fetches: AtomicUsize,
    probes: AtomicUsize,
}

#[async_trait]
impl TimelineSource for FakeTimeline {
    async fn fetch_timeline(&self, _username: &str) -> Result<Vec<Post>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => anyhow::bail!("{message}"),
            None => Ok(self.posts.clone()),
        }
    }

    async fn account_exists(&self, _username: &str) -> Result<bool> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(self.exists)
    }
}

fn signed_config() -> Config {
    Config {
        secret: Some("s3cr3t".to_string()),
        ..Config::default()
    }
}

fn app(config: Config, source: Arc<FakeTimeline>) -> Router {
    let source: Arc<dyn TimelineSource> = source;
    build_router(AppState::new(config, source).unwrap())
}

fn timeline_source() -> Arc<FakeTimeline> {
    Arc::new(FakeTimeline {
        posts: parse_timeline(TIMELINE).unwrap(),
        exists: true,
        ..FakeTimeline::default()
    })
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: &Router, body: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn header_value(response: &Response, name: header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// ============================================================
// Homepage form
// ============================================================

#[tokio::test]
async fn homepage_renders_form() {
    let app = app(signed_config(), timeline_source());
    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert_eq!(html.matches("<form").count(), 1);
    assert!(html.contains(r#"id="generate""#));
}

#[tokio::test]
async fn valid_username_redirects_to_signed_feed() {
    let source = timeline_source();
    let app = app(signed_config(), source.clone());

    let response = post_form(&app, "username=alangbem").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        header_value(&response, header::LOCATION).as_deref(),
        Some(ALANGBEM_FEED)
    );
    assert_eq!(source.probes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalid_username_never_reaches_upstream() {
    let source = timeline_source();
    let app = app(signed_config(), source.clone());

    for candidate in ["", "user-name", "user%40name", "useeeeeeeeeeernaaaaaaaaaaame"] {
        let response = post_form(&app, &format!("username={candidate}")).await;
        assert_eq!(response.status(), StatusCode::OK, "{candidate}");
        let html = body_text(response).await;
        assert!(html.contains(r#"class="warning""#), "{candidate}");
    }
    assert_eq!(source.probes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_account_shows_warning() {
    let source = Arc::new(FakeTimeline::default());
    let app = app(signed_config(), source.clone());

    let response = post_form(&app, "username=ghost").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("User with this screen name does not exist"));
    assert_eq!(source.probes.load(Ordering::SeqCst), 1);
}

// ============================================================
// Protected feed
// ============================================================

#[tokio::test]
async fn signed_feed_is_served_as_atom() {
    let app = app(signed_config(), timeline_source());

    let response = get(&app, ALANGBEM_FEED).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, header::CONTENT_TYPE).as_deref(),
        Some("application/atom+xml")
    );
    assert_eq!(
        header_value(&response, header::CACHE_CONTROL).as_deref(),
        Some("public, s-maxage=2700")
    );

    let xml = body_text(response).await;
    assert!(xml.contains("<title>@alangbem on Twitter</title>"));
    assert!(xml.contains("<id>https://twitter.com/alangbem/status/350621389112209408</id>"));
    // #GoogleReader and #Google each link to their own search
    assert!(xml.contains("q=%23GoogleReader&amp;amp;src=hash&quot;&gt;#GoogleReader&lt;/a&gt;"));
    assert!(xml.contains("q=%23Google&amp;amp;src=hash&quot;&gt;#Google&lt;/a&gt;"));
}

#[tokio::test]
async fn truncated_signature_is_forbidden() {
    let app = app(signed_config(), timeline_source());

    let truncated = &ALANGBEM_FEED[..ALANGBEM_FEED.len() - 1];
    let response = get(&app, truncated).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(response).await, "Wrong signature. Access Denied.");
}

#[tokio::test]
async fn missing_signature_is_forbidden() {
    let source = timeline_source();
    let app = app(signed_config(), source.clone());

    let response = get(&app, "/alangbem.atom").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(response).await, "Wrong signature. Access Denied.");
    assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn signature_for_another_user_is_forbidden() {
    let app = app(signed_config(), timeline_source());
    let response = get(&app, "/a.atom?signature=87ea11b701cfcd5e6ec73c8fb2fd2cb6032abf73").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn extra_query_parameters_are_not_signed() {
    let app = app(signed_config(), timeline_source());
    let response = get(&app, &format!("{ALANGBEM_FEED}&utm_source=reader")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_feed_path_is_not_found() {
    let app = app(signed_config(), timeline_source());
    for uri in ["/user-name.atom?signature=x", "/alangbem.rss", "/useeeeeeeeeeernaaaaaaaaaaame.atom"] {
        assert_eq!(get(&app, uri).await.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn unsigned_state_is_refused_outside_dev_mode() {
    let source: Arc<dyn TimelineSource> = timeline_source();
    assert!(AppState::new(Config::default(), source).is_err());
}

#[tokio::test]
async fn dev_mode_without_secret_refuses_feeds() {
    let source = timeline_source();
    let config = Config {
        dev_mode: true,
        ..Config::default()
    };
    let app = app(config, source.clone());

    let response = get(&app, "/alangbem.atom").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(response).await, "Wrong signature. Access Denied.");

    let response = get(&app, ALANGBEM_FEED).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn self_link_uses_public_url() {
    let config = Config {
        public_url: Some("https://feeds.example.org".to_string()),
        ..signed_config()
    };
    let app = app(config, timeline_source());

    let xml = body_text(get(&app, ALANGBEM_FEED).await).await;
    assert!(xml.contains(
        r#"<link rel="self" type="application/atom+xml" href="https://feeds.example.org/alangbem.atom?signature=87ea11b701cfcd5e6ec73c8fb2fd2cb6032abf73">"#
    ));
}

#[tokio::test]
async fn empty_timeline_still_renders_feed() {
    let app = app(signed_config(), Arc::new(FakeTimeline::default()));
    let response = get(&app, "/a.atom?signature=f822101de3b2d44500e90a552772284e868ce97b").await;
    assert_eq!(response.status(), StatusCode::OK);
    let xml = body_text(response).await;
    assert!(xml.contains("<title>@a on Twitter</title>"));
    assert!(xml.contains("<author><name>@a</name>"));
    assert_eq!(xml.matches("<link ").count(), 2);
}

// ============================================================
// Upstream failures and caching
// ============================================================

#[tokio::test]
async fn upstream_failure_is_cached_for_the_rate_limit_window() {
    let source = Arc::new(FakeTimeline {
        failure: Some("Rate limit exceeded".to_string()),
        ..FakeTimeline::default()
    });
    let app = app(signed_config(), source.clone());

    let first = get(&app, ALANGBEM_FEED).await;
    assert_eq!(first.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        header_value(&first, header::CACHE_CONTROL).as_deref(),
        Some("public, s-maxage=7200")
    );
    assert_eq!(body_text(first).await, "Rate limit exceeded");

    // Served from the response store; the upstream is not asked again.
    let second = get(&app, ALANGBEM_FEED).await;
    assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn successful_feed_is_served_from_store() {
    let source = timeline_source();
    let app = app(signed_config(), source.clone());

    let first = body_text(get(&app, ALANGBEM_FEED).await).await;
    let second = body_text(get(&app, ALANGBEM_FEED).await).await;
    assert_eq!(first, second);
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dev_mode_disables_caching() {
    let source = timeline_source();
    let config = Config {
        dev_mode: true,
        ..signed_config()
    };
    let app = app(config, source.clone());

    let response = get(&app, ALANGBEM_FEED).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(header_value(&response, header::CACHE_CONTROL).is_none());

    get(&app, ALANGBEM_FEED).await;
    assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn health_check() {
    let app = app(signed_config(), timeline_source());
    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}
