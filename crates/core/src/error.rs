//! Error types for ordmap
//!
//! Map operations themselves never fail: contention is resolved inside each
//! variant. Errors exist for construction-time validation (configuration,
//! shard counts, identifiers) and for the harness (worker failure, report I/O).
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

/// Result type alias for ordmap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ordmap
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration field failed validation
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Unknown map type identifier
    #[error("unknown map type: {0}")]
    UnknownMapType(String),

    /// Unknown workload profile identifier
    #[error("unknown workload profile: {0}")]
    UnknownWorkload(String),

    /// Shard count is not a non-zero power of two
    #[error("shard count must be a non-zero power of two, got {0}")]
    InvalidShardCount(usize),

    /// Duration string could not be parsed
    #[error("unsupported duration format: {0}")]
    InvalidDuration(String),

    /// A worker thread failed (panicked) during a phase
    #[error("worker {worker} failed: {reason}")]
    WorkerFailed {
        /// Index of the failed worker
        worker: usize,
        /// Panic payload, when it was a string
        reason: String,
    },

    /// I/O error (config file, report output)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Build an [`Error::InvalidConfig`] for `field`
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_config() {
        let err = Error::invalid_config("keySpace", "must be positive");
        let msg = err.to_string();
        assert!(msg.contains("invalid configuration"));
        assert!(msg.contains("keySpace must be positive"));
    }

    #[test]
    fn test_error_display_shard_count() {
        let err = Error::InvalidShardCount(12);
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn test_error_display_worker_failed() {
        let err = Error::WorkerFailed {
            worker: 3,
            reason: "boom".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("worker 3"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
