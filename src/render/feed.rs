// Atom 1.0 document for a user timeline.
//
// maud renders the XML: every element carries an explicit body (`{}`) so void
// HTML tags like `link` still come out well-formed. Entry content is the
// linkified post HTML, escaped once more as Atom `type="html"` requires.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use maud::{html, Markup, PreEscaped};

use super::linkify::linkify;
use super::photos::photos;
use crate::signing::{ParameterSet, Signer, SIGNATURE_PARAM};
use crate::twitter::posts::Post;

/// Content type of the served document.
pub const ATOM_CONTENT_TYPE: &str = "application/atom+xml";

/// Extension of feed paths, `/<username>.atom`.
pub const FEED_SUFFIX: &str = ".atom";

/// The only parameter a feed signature covers.
pub const USERNAME_PARAM: &str = "username";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// Public profile page of an account.
pub fn profile_page_url(username: &str) -> String {
    format!("https://twitter.com/{username}")
}

/// Public page of a single post.
pub fn status_url(username: &str, id: &str) -> String {
    format!("https://twitter.com/{username}/status/{id}")
}

/// Path of the feed for `username`, signed with `signer`.
///
/// Only the username is signed. The signature is left off when signing is
/// disabled.
pub fn signed_feed_path(signer: &Signer, username: &str) -> String {
    let params: ParameterSet = [(USERNAME_PARAM.to_string(), username.to_string())].into();
    let signed = signer.sign(params);
    match signed.get(SIGNATURE_PARAM) {
        Some(signature) => format!("/{username}{FEED_SUFFIX}?{SIGNATURE_PARAM}={signature}"),
        None => format!("/{username}{FEED_SUFFIX}"),
    }
}

/// Self link of a feed: `path` resolved against the public base URL when one
/// is configured, otherwise the path as requested.
pub fn self_link(public_url: Option<&str>, path: &str) -> String {
    match public_url {
        Some(base) => format!("{}{path}", base.trim_end_matches('/')),
        None => path.to_string(),
    }
}

/// Render the feed for `username`. `self_url` is the signed URL the feed is
/// served from.
pub fn render_feed(username: &str, self_url: &str, posts: &[Post]) -> String {
    let profile = profile_page_url(username);
    let now = Utc::now().fixed_offset();
    let updated = posts
        .iter()
        .filter_map(Post::created_at)
        .max()
        .unwrap_or(now);

    let doc = html! {
        (PreEscaped(XML_DECLARATION))
        feed xmlns=(ATOM_NS) {
            title { "@" (username) " on Twitter" }
            link rel="alternate" type="text/html" href=(profile) {}
            link rel="self" type=(ATOM_CONTENT_TYPE) href=(self_url) {}
            id { (profile) }
            updated { (timestamp(updated)) }
            author {
                name { "@" (username) }
                uri { (profile) }
            }
            @for post in posts {
                (entry(username, post, now))
            }
        }
    };
    doc.into_string()
}

fn entry(username: &str, post: &Post, fallback: DateTime<FixedOffset>) -> Markup {
    let url = status_url(username, &post.id_str);
    let updated = post.created_at().unwrap_or(fallback);

    html! {
        entry {
            title { (plain_text(&post.text)) }
            link rel="alternate" type="text/html" href=(url) {}
            id { (url) }
            updated { (timestamp(updated)) }
            content type="html" { (entry_body(post)) }
        }
    }
}

/// HTML body of an entry: linkified text followed by the post's photos.
pub fn entry_body(post: &Post) -> String {
    let mut body = linkify(post);
    for url in photos(post) {
        body.push_str(
            &html! {
                br;
                img src=(url) alt="";
            }
            .into_string(),
        );
    }
    body
}

fn timestamp(at: DateTime<FixedOffset>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Undo the upstream's entity encoding for plain-text fields.
fn plain_text(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twitter::posts::parse_timeline;

    #[test]
    fn test_empty_feed_structure() {
        let xml = render_feed("a", "/a.atom?signature=x", &[]);
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("<title>@a on Twitter</title>"));
        assert!(xml.contains("<id>https://twitter.com/a</id>"));
        assert!(xml.contains("<author><name>@a</name>"));
        assert_eq!(xml.matches("<link ").count(), 2);
        assert!(!xml.contains("<entry>"));
    }

    #[test]
    fn test_entry_rendering() {
        let posts = parse_timeline(
            r#"[{
                "id_str": "42",
                "created_at": "Fri Jun 28 15:22:15 +0000 2013",
                "text": "Fish &amp; chips #food",
                "entities": {"hashtags": [{"text": "food"}]}
            }]"#,
        )
        .unwrap();

        let xml = render_feed("alangbem", "/alangbem.atom", &posts);
        assert!(xml.contains("<id>https://twitter.com/alangbem/status/42</id>"));
        assert!(xml.contains("<title>Fish &amp; chips #food</title>"));
        assert!(xml.contains("<updated>2013-06-28T15:22:15Z</updated>"));
        // The anchor is escaped inside the html content element
        assert!(xml.contains("&lt;a href=&quot;https://twitter.com/search?q=%23food&amp;amp;src=hash&quot;&gt;#food&lt;/a&gt;"));
    }

    #[test]
    fn test_self_link_escaped() {
        let xml = render_feed("a", "/a.atom?signature=x&y=1", &[]);
        assert!(xml.contains(r#"href="/a.atom?signature=x&amp;y=1""#));
    }

    #[test]
    fn test_self_link() {
        let path = "/a.atom?signature=f822101de3b2d44500e90a552772284e868ce97b";
        assert_eq!(self_link(None, path), path);
        assert_eq!(
            self_link(Some("https://feeds.example.org/"), path),
            format!("https://feeds.example.org{path}")
        );
    }

    #[test]
    fn test_signed_feed_path() {
        let signer = Signer::new(Some("s3cr3t".to_string()));
        assert_eq!(
            signed_feed_path(&signer, "alangbem"),
            "/alangbem.atom?signature=87ea11b701cfcd5e6ec73c8fb2fd2cb6032abf73"
        );
        assert_eq!(signed_feed_path(&Signer::disabled(), "a"), "/a.atom");
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(plain_text("a &lt;b&gt; &amp;amp;"), "a <b> &amp;");
    }
}
