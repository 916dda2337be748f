// Username (handle) validation.
//
// A handle is 1-15 characters of ASCII letters, digits and underscore. This
// check runs before any signing or upstream lookup, and the same rule is the
// routing constraint on the feed endpoint.

use std::sync::LazyLock;

use regex_lite::Regex;

static USERNAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]{1,15}$").expect("username regex should compile")
});

/// Why a candidate username was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsernameError {
    #[error("username is empty")]
    Empty,

    #[error("username is longer than 15 characters")]
    TooLong,

    #[error("username contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Validate a candidate handle, returning it unchanged when it is well formed.
pub fn validate(candidate: &str) -> Result<&str, UsernameError> {
    if USERNAME_REGEX.is_match(candidate) {
        return Ok(candidate);
    }

    if candidate.is_empty() {
        return Err(UsernameError::Empty);
    }
    if let Some(bad) = candidate
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
    {
        return Err(UsernameError::InvalidCharacter(bad));
    }
    Err(UsernameError::TooLong)
}
