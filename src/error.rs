//! Error types for a3s-activity

use thiserror::Error;

/// Errors that can occur at the boundaries of the activity log
///
/// Recording, querying, detection and erasure never fail; errors only come
/// from parsing caller input, loading configuration, or serializing exports.
#[derive(Debug, Error)]
pub enum ActivityError {
    /// Action name outside the closed action enumeration
    #[error("Unknown activity action: '{0}'")]
    UnknownAction(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem failure while reading configuration
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for activity log operations
pub type Result<T> = std::result::Result<T, ActivityError>;
