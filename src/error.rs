//! Error types for index, heap and clustering operations.

use thiserror::Error;

/// Errors reported by `capcluster` operations.
///
/// Every failure aborts the operation that raised it and is returned to the
/// caller; nothing is retried internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    /// `build` received no points, or a count that is not a multiple of the capacity.
    #[error("Invalid point set size: {size} points cannot be split into clusters of {capacity}")]
    InvalidInputSize { size: usize, capacity: usize },

    /// A point lies outside the index domain (or has a non-finite coordinate).
    #[error("Attempt to insert a point outside bounding box: ({x}, {y})")]
    OutOfDomain { x: f64, y: f64 },

    /// Deletion of a point that is not stored in the index.
    #[error("Deletion of nonexistent point: ({x}, {y})")]
    NotFound { x: f64, y: f64 },

    /// `extract_min` on an empty heap.
    #[error("Empty heap")]
    EmptyHeap,

    /// A configuration value is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed or written.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ClusterError {
    fn from(err: serde_json::Error) -> Self {
        ClusterError::Serialization(err.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for ClusterError {
    fn from(err: toml::de::Error) -> Self {
        ClusterError::Serialization(err.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::ser::Error> for ClusterError {
    fn from(err: toml::ser::Error) -> Self {
        ClusterError::Serialization(err.to_string())
    }
}

/// Result type for `capcluster` operations.
pub type Result<T> = std::result::Result<T, ClusterError>;
