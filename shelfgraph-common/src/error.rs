//! Common error types for shelfgraph

use thiserror::Error;

/// Common result type for shelfgraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the pipeline and its boundaries
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog URL did not match the expected pattern for its entity kind
    #[error("Malformed URL: {0}")]
    MalformedUrl(String),

    /// Catalog service request failed (network, HTTP status, or response body)
    #[error("Remote service error: {0}")]
    RemoteService(String),

    /// A catalog entry was missing a required field after extraction
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Chart rendering failed
    #[error("Render error: {0}")]
    Render(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Response cache error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
