// Entity linkification — rewrites post text into HTML with a link for every
// hashtag, mention, URL and media reference.
//
// Matching runs against the original text only. Each category claims byte
// ranges in a fixed order (hashtags, mentions, URLs, media); a match that
// overlaps an already claimed range is dropped, so markup inserted for one
// entity can never be matched again by a later one. The output is built in a
// single pass over the sorted ranges.
//
// Text between links is copied through unchanged: the upstream already
// delivers it with `&`, `<` and `>` entity-encoded.

use std::collections::HashSet;

use maud::html;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::twitter::posts::Post;

/// Characters kept verbatim in the hashtag search query (form-urlencoding
/// leaves `-`, `_` and `.` alone).
const TAG_ENCODE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// What a claimed range of text turns into.
#[derive(Debug, Clone, Copy)]
enum Link<'a> {
    Hashtag { tag: &'a str },
    Mention { handle: &'a str, display_name: &'a str },
    Url { short_url: &'a str, expanded_url: &'a str },
    Media { short_url: &'a str, media_url: &'a str },
}

#[derive(Debug, Clone, Copy)]
struct Span<'a> {
    start: usize,
    end: usize,
    link: Link<'a>,
}

impl Span<'_> {
    fn overlaps(&self, start: usize, end: usize) -> bool {
        start < self.end && self.start < end
    }
}

/// Claimed ranges of the text, in claim order.
#[derive(Default)]
struct Claims<'a> {
    spans: Vec<Span<'a>>,
}

impl<'a> Claims<'a> {
    /// Claim `start..end` unless any part of it is already taken.
    fn claim(&mut self, start: usize, end: usize, link: Link<'a>) {
        if self.spans.iter().any(|s| s.overlaps(start, end)) {
            return;
        }
        self.spans.push(Span { start, end, link });
    }
}

/// Render a post's text as HTML with all entities linked.
///
/// A post without entities comes back with its text unchanged.
pub fn linkify(post: &Post) -> String {
    let text = post.text.as_str();
    let entities = &post.entities;
    let mut claims = Claims::default();

    if let Some(hashtags) = &entities.hashtags {
        let mut seen = HashSet::new();
        for hashtag in hashtags {
            let tag = hashtag.tag.as_str();
            if !seen.insert(tag) {
                continue;
            }
            for (start, end) in word_matches(text, '#', tag) {
                claims.claim(start, end, Link::Hashtag { tag });
            }
        }
    }

    if let Some(mentions) = &entities.mentions {
        let mut seen = HashSet::new();
        for mention in mentions {
            let handle = mention.handle.as_str();
            if !seen.insert(handle) {
                continue;
            }
            for (start, end) in word_matches(text, '@', handle) {
                claims.claim(
                    start,
                    end,
                    Link::Mention {
                        handle,
                        display_name: &mention.display_name,
                    },
                );
            }
        }
    }

    if let Some(urls) = &entities.urls {
        let mut seen = HashSet::new();
        for url in urls {
            let short_url = url.short_url.as_str();
            if !seen.insert(short_url) {
                continue;
            }
            for (start, end) in literal_matches(text, short_url) {
                claims.claim(
                    start,
                    end,
                    Link::Url {
                        short_url,
                        expanded_url: &url.expanded_url,
                    },
                );
            }
        }
    }

    if let Some(media) = &entities.media {
        let mut seen = HashSet::new();
        for item in media {
            let short_url = item.short_url.as_str();
            if !seen.insert(short_url) {
                continue;
            }
            for (start, end) in literal_matches(text, short_url) {
                claims.claim(
                    start,
                    end,
                    Link::Media {
                        short_url,
                        media_url: &item.media_url,
                    },
                );
            }
        }
    }

    materialize(text, claims.spans)
}

/// Search link for a hashtag.
pub fn hashtag_search_url(tag: &str) -> String {
    format!(
        "https://twitter.com/search?q=%23{}&src=hash",
        utf8_percent_encode(tag, TAG_ENCODE)
    )
}

/// Profile link for a handle.
pub fn profile_url(handle: &str) -> String {
    format!("https://www.twitter.com/{handle}")
}

fn materialize(text: &str, mut spans: Vec<Span<'_>>) -> String {
    if spans.is_empty() {
        return text.to_string();
    }

    spans.sort_unstable_by_key(|s| s.start);

    let mut out = String::with_capacity(text.len() * 2);
    let mut cursor = 0;
    for span in spans {
        out.push_str(&text[cursor..span.start]);
        out.push_str(&anchor(span.link));
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    out
}

fn anchor(link: Link<'_>) -> String {
    let markup = match link {
        Link::Hashtag { tag } => html! {
            a href=(hashtag_search_url(tag)) { "#" (tag) }
        },
        Link::Mention {
            handle,
            display_name,
        } => html! {
            a href=(profile_url(handle)) title=(display_name) { "@" (handle) }
        },
        Link::Url {
            short_url,
            expanded_url,
        } => html! {
            a href=(short_url) title=(expanded_url) { (short_url) }
        },
        Link::Media {
            short_url,
            media_url,
        } => html! {
            a href=(short_url) title=(media_url) { (short_url) }
        },
    };
    markup.into_string()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Occurrences of `sigil` + `word` where `word` is a whole word: it starts
/// right after the sigil with a word character and the text does not carry
/// on with more word characters after it. `#Google` therefore never matches
/// inside `#GoogleReader`.
fn word_matches(text: &str, sigil: char, word: &str) -> Vec<(usize, usize)> {
    let (Some(first), Some(last)) = (word.chars().next(), word.chars().last()) else {
        return Vec::new();
    };
    if !is_word_char(first) {
        return Vec::new();
    }

    let needle = format!("{sigil}{word}");
    text.match_indices(needle.as_str())
        .map(|(start, _)| (start, start + needle.len()))
        .filter(|&(_, end)| {
            let next_is_word = text[end..].chars().next().is_some_and(is_word_char);
            is_word_char(last) != next_is_word
        })
        .collect()
}

/// Every literal occurrence of `needle`.
fn literal_matches(text: &str, needle: &str) -> Vec<(usize, usize)> {
    if needle.is_empty() {
        return Vec::new();
    }
    text.match_indices(needle)
        .map(|(start, _)| (start, start + needle.len()))
        .collect()
}
