// Photo extraction — direct image URLs for the feed entry body.

use std::collections::HashSet;

use crate::twitter::posts::{MediaKind, Post};

/// Media URLs of every photo attached to `post`, in source order, each
/// listed once. Videos and other media kinds are skipped.
pub fn photos(post: &Post) -> Vec<&str> {
    let Some(media) = &post.entities.media else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    media
        .iter()
        .filter(|m| m.kind == MediaKind::Photo)
        .map(|m| m.media_url.as_str())
        .filter(|url| seen.insert(*url))
        .collect()
}
