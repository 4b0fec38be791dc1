//! Error handling for the BandVis core
//!
//! This module defines custom error types and a Result alias for use
//! throughout the crate.

use thiserror::Error;

/// Main error type for BandVis operations
#[derive(Error, Debug)]
pub enum BandVisError {
    /// Errors raised by a sample source (remote API unreachable, bad payload)
    #[error("Source error: {0}")]
    Source(String),

    /// Errors related to the persisted view-state store
    #[error("Store error: {0}")]
    Store(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// Caller passed a resolution outside the allowed set
    #[error("Invalid resolution: {minutes} minutes is not an allowed interval")]
    InvalidResolution { minutes: f64 },

    /// Malformed timestamp from a sample source
    #[error("Timestamp error: {0}")]
    Timestamp(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<BandVisError>,
    },
}

impl BandVisError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        BandVisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for BandVis operations
pub type Result<T> = std::result::Result<T, BandVisError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BandVisError::Source("connection refused".to_string());
        assert_eq!(err.to_string(), "Source error: connection refused");
    }

    #[test]
    fn test_error_with_context() {
        let err = BandVisError::Store("disk full".to_string());
        let with_ctx = err.with_context("Failed to persist visibility");
        assert!(with_ctx.to_string().contains("Failed to persist visibility"));
    }

    #[test]
    fn test_invalid_resolution_display() {
        let err = BandVisError::InvalidResolution { minutes: 7.0 };
        assert!(err.to_string().contains("7"));
        assert!(err.to_string().contains("not an allowed interval"));
    }
}
