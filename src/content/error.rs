//! Errors raised while turning documents into posts

use thiserror::Error;

/// A document could not be fetched from its source
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{location}: server responded with status {status}")]
    Status { location: String, status: u16 },

    #[error("{location}: request failed: {source}")]
    Transport {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{location}: invalid document URL: {reason}")]
    InvalidUrl { location: String, reason: String },
}

/// A fetched document is not a valid post
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("front-matter header is not closed with a `---` line")]
    MalformedHeader,

    #[error("missing required front-matter field `{0}`")]
    MissingField(&'static str),

    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// The whole load batch failed; nothing is published
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to discover posts in {path}: {source}")]
    Discover {
        path: String,
        #[source]
        source: walkdir::Error,
    },

    #[error("document task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
