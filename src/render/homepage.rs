// Homepage — the "build me a signed feed link" form.

use maud::{html, Markup, DOCTYPE};

/// Warning shown for a username that is malformed or unknown upstream.
pub const UNKNOWN_USER_WARNING: &str = "User with this screen name does not exist";

/// Render the homepage. `username` pre-fills the field after a failed
/// submission; `warning` is shown under it.
pub fn render_homepage(username: &str, warning: Option<&str>) -> String {
    let page: Markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Tweets2Feed" }
            }
            body {
                main {
                    h1 { "Tweets2Feed" }
                    p { "Turn a Twitter timeline into an Atom feed." }
                    form method="post" action="/" {
                        label for="username" { "Screen name" }
                        input type="text" id="username" name="username" value=(username) required;
                        @if let Some(warning) = warning {
                            p class="warning" { (warning) }
                        }
                        button id="generate" type="submit" { "Generate" }
                    }
                }
            }
        }
    };
    page.into_string()
}
