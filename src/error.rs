//! Error types for option construction, matching and document parsing

use thiserror::Error;

/// Result type for fallible json-conform operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A known option key carried a value of the wrong shape.
    /// `input` echoes the whole options document.
    #[error("Invalid option {key} provided: {input}")]
    InvalidOption { key: String, input: String },

    #[error("schema nesting exceeds the depth limit of {limit}")]
    DepthExceeded { limit: usize },

    #[error("at JSON path {path} → {message}")]
    Parse { path: String, message: String },
}
