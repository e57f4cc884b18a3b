//! Demo error types.

use thiserror::Error;

/// Demo errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] relgraph_core::Error),

    /// Schema declarations could not be resolved.
    #[error("schema error: {0}")]
    Schema(#[from] relgraph_core::SchemaError),

    /// Schema file could not be parsed.
    #[error("invalid schema file: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
