//! Error types for the retrieval pipeline

use thiserror::Error;

/// Errors surfaced by a top-level search
#[derive(Debug, Error)]
pub enum LlomaxError {
    #[error("prompt cannot be empty")]
    InvalidPrompt,
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors from the archive backend
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error: {status}")]
    Http { status: u16 },
    #[error("item not found: {0}")]
    NotFound(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error(transparent)]
    Query(#[from] ConfigError),
}

impl ArchiveError {
    /// Whether the backend answered but had nothing for the identifier
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for ArchiveError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Http {
                status: status.as_u16(),
            },
            None => Self::Network(err.to_string()),
        }
    }
}

/// Validation errors for settings and backend queries
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid collection name: {0:?}")]
    InvalidCollection(String),
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    #[error("unsupported operator: {0:?}, must be one of AND, OR")]
    UnsupportedOperator(String),
    #[error("invalid request timeout: {0} seconds")]
    InvalidTimeout(f64),
    #[error("invalid archive URL: {0}")]
    InvalidUrl(String),
    #[error("keywords cannot be empty")]
    EmptyKeywords,
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors writing downloaded files to disk
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode metadata: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T, E = LlomaxError> = std::result::Result<T, E>;
