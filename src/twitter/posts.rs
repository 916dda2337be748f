// Timeline posts — the slice of the v1.1 status object the feed needs.
//
// Each entity collection is optional on the wire; absence is kept explicit
// (`None`) rather than collapsed into an empty list.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

/// Timestamp format of `created_at`, e.g. `Wed Aug 27 13:08:45 +0000 2008`.
pub const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// A single post from a user timeline.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id_str: String,
    #[serde(default)]
    pub created_at: String,
    /// Post text as delivered upstream (`&`, `<`, `>` arrive entity-encoded).
    pub text: String,
    #[serde(default)]
    pub entities: Entities,
}

impl Post {
    /// Parse `created_at`. `None` when missing or malformed.
    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_str(&self.created_at, CREATED_AT_FORMAT).ok()
    }
}

/// Structured annotations on a post's text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub hashtags: Option<Vec<Hashtag>>,
    #[serde(default, rename = "user_mentions")]
    pub mentions: Option<Vec<Mention>>,
    #[serde(default)]
    pub urls: Option<Vec<UrlEntity>>,
    #[serde(default)]
    pub media: Option<Vec<MediaEntity>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Hashtag {
    /// Tag text without the leading `#`.
    #[serde(rename = "text")]
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Mention {
    #[serde(rename = "name", default)]
    pub display_name: String,
    /// Handle without the leading `@`.
    #[serde(rename = "screen_name")]
    pub handle: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UrlEntity {
    /// The shortened link as it appears in the text.
    #[serde(rename = "url")]
    pub short_url: String,
    #[serde(default)]
    pub expanded_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaEntity {
    /// Direct link to the media file.
    pub media_url: String,
    /// The shortened link as it appears in the text.
    #[serde(rename = "url")]
    pub short_url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
    AnimatedGif,
    #[serde(other)]
    Other,
}

/// Parse a timeline response body.
///
/// The endpoint returns a JSON array of posts. Any other JSON value (an
/// empty object, for instance) is treated as an empty timeline.
pub fn parse_timeline(body: &str) -> serde_json::Result<Vec<Post>> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if value.is_array() {
        serde_json::from_value(value)
    } else {
        Ok(Vec::new())
    }
}
