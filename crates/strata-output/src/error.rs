//! Sink error types

use thiserror::Error;

/// Output sink errors
#[derive(Debug, Error)]
pub enum SinkError {
    /// The target does not implement a forwarded operation
    #[error("Operation not supported by output target: {operation}")]
    NotSupported {
        /// Name of the forwarded operation
        operation: &'static str,
    },

    /// Writing to the target failed
    #[error("Write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Specialized Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

impl SinkError {
    /// Create a not-supported error
    pub fn not_supported(operation: &'static str) -> Self {
        Self::NotSupported { operation }
    }

    /// Check if the target lacks the operation
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotSupported { .. } => "not_supported",
            Self::Io(_) => "io",
        }
    }
}
