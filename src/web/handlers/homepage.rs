// GET / and POST / — the signed-link builder.
//
// POST validates the username (pure check first, so a malformed name never
// reaches the upstream), asks the upstream whether the account exists and
// redirects to the signed feed URL. Any failure re-renders the form with a
// warning.

use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::render::feed::signed_feed_path;
use crate::render::homepage::{render_homepage, UNKNOWN_USER_WARNING};
use crate::twitter::username;
use crate::web::AppState;

#[derive(Deserialize, Default)]
pub struct FeedForm {
    #[serde(default)]
    pub username: String,
}

/// GET / — empty form.
pub async fn show_form() -> Html<String> {
    Html(render_homepage("", None))
}

/// POST / — validate and redirect to the signed feed.
pub async fn submit_form(State(state): State<AppState>, Form(form): Form<FeedForm>) -> Response {
    let candidate = form.username.trim();

    let name = match username::validate(candidate) {
        Ok(name) => name,
        Err(reason) => {
            debug!(candidate, %reason, "Rejected username");
            return rejected(candidate);
        }
    };

    match state.timelines.account_exists(name).await {
        Ok(true) => {
            let location = signed_feed_path(&state.signer, name);
            Redirect::to(&location).into_response()
        }
        Ok(false) => rejected(name),
        Err(err) => {
            let message = format!("{err:#}");
            warn!(username = name, error = %message, "Account lookup failed");
            rejected(name)
        }
    }
}

fn rejected(candidate: &str) -> Response {
    (
        [(header::CACHE_CONTROL, "no-store")],
        Html(render_homepage(candidate, Some(UNKNOWN_USER_WARNING))),
    )
        .into_response()
}
