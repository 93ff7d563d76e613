//! Error types for loading and introspecting command declarations.

use thiserror::Error;

/// Errors that can occur while loading declarations or configuration.
#[derive(Debug, Error)]
pub enum IntrospectError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The file extension does not name a known declaration format.
    #[error("unsupported declaration format: {0}")]
    UnsupportedFormat(String),
}

/// Convenience alias for results with [`IntrospectError`].
pub type Result<T> = std::result::Result<T, IntrospectError>;
