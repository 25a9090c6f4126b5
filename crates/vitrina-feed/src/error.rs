use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid catalog URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain}")]
    RateLimited {
        domain: String,
        /// Seconds from a numeric `Retry-After` header, when the host sent one.
        retry_after_secs: Option<u64>,
    },

    #[error("catalog not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("CSV from {url} has {error_count} structural error(s), first: {first}")]
    CsvStructure {
        url: String,
        error_count: usize,
        first: String,
    },

    #[error("normalization error on CSV line {line}: {reason}")]
    Normalization { line: u64, reason: String },
}

impl FeedError {
    /// Maps this error onto the kind surfaced to feed callers.
    #[must_use]
    pub fn kind(&self) -> LoadErrorKind {
        match self {
            FeedError::InvalidUrl { .. } => LoadErrorKind::InvalidUrl,
            FeedError::Http(_)
            | FeedError::RateLimited { .. }
            | FeedError::NotFound { .. }
            | FeedError::UnexpectedStatus { .. } => LoadErrorKind::Network,
            FeedError::CsvStructure { .. } => LoadErrorKind::CsvStructure,
            FeedError::Normalization { .. } => LoadErrorKind::Normalization,
        }
    }
}

/// Failure categories a catalog load can end in. Callers pick the
/// user-facing message; the feed only reports the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadErrorKind {
    /// The catalog URL is missing or blank.
    InvalidUrl,
    /// The download failed and no cached copy was available.
    Network,
    /// The CSV downloaded but rows did not match the header shape.
    CsvStructure,
    /// Rows parsed but could not be turned into products.
    Normalization,
}

impl std::fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadErrorKind::InvalidUrl => write!(f, "invalid_url"),
            LoadErrorKind::Network => write!(f, "network"),
            LoadErrorKind::CsvStructure => write!(f, "csv_structure"),
            LoadErrorKind::Normalization => write!(f, "normalization"),
        }
    }
}
