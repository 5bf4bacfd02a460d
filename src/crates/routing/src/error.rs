//! Error types for the routing engine.
//!
//! Only configuration loading can fail; resolution itself is pure
//! computation and degrades gracefully instead of erroring (missing slots
//! become warnings, alias cycles stop at the last identifier reached, an
//! empty route is a representable result).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for routing operations.
pub type Result<T> = std::result::Result<T, RoutingError>;

/// Errors that can occur when loading routing configuration.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// A policy or alias document could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A policy or alias document is not valid JSON of the expected shape.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
