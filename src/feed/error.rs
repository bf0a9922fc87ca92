use std::fmt;

/// Errors produced by the feed core.
///
/// `Validation` is returned to the caller of a mutation. `Remote` and
/// `Decode` come from the listing source and end up in `FeedState::error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    Validation(String),
    Remote(String),
    Decode(String),
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Validation(msg) => f.write_str(msg),
            FeedError::Remote(msg) => write!(f, "A network error occurred: {}", msg),
            FeedError::Decode(msg) => write!(f, "Received an unreadable response: {}", msg),
        }
    }
}

impl std::error::Error for FeedError {}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FeedError::Decode(err.to_string())
        } else {
            FeedError::Remote(err.to_string())
        }
    }
}
