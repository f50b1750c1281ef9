//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by configuration layers
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Attempted to use an operation name as a key
    #[error("It is not possible to use '{key}' as a key name, please choose a different key name")]
    ReservedKey {
        /// The rejected key
        key: String,
    },

    /// A merge or construction source could not be converted into a mapping
    #[error("Cannot convert {found} into a mapping")]
    NotAMapping {
        /// Kind of the offending value
        found: &'static str,
    },

    /// Attribute-style access called with the wrong number of arguments
    #[error("Wrong number of arguments for '{name}' (given {got}, expected {expected})")]
    Arity {
        /// Attribute name as dispatched
        name: String,
        /// Number of arguments accepted
        expected: usize,
        /// Number of arguments supplied
        got: usize,
    },

    /// A layer file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path of the layer file
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A layer file could not be parsed
    #[error("Failed to parse {}: {message}", path.display())]
    Parse {
        /// Path of the layer file
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// An object-like merge source failed to serialize
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Specialized Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Create a reserved key error
    pub fn reserved(key: impl Into<String>) -> Self {
        Self::ReservedKey { key: key.into() }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::ReservedKey { .. } => "reserved_key",
            Self::NotAMapping { .. } => "not_a_mapping",
            Self::Arity { .. } => "arity",
            Self::Io { .. } => "io",
            Self::Parse { .. } => "parse",
            Self::Serialization(_) => "serialization",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::reserved("keys");
        assert_eq!(
            err.to_string(),
            "It is not possible to use 'keys' as a key name, please choose a different key name"
        );

        let err = ConfigError::NotAMapping { found: "integer" };
        assert_eq!(err.to_string(), "Cannot convert integer into a mapping");
    }

    #[test]
    fn test_error_category() {
        assert_eq!(ConfigError::reserved("get").category(), "reserved_key");
        let err = ConfigError::Parse {
            path: PathBuf::from("a.toml"),
            message: "bad".to_string(),
        };
        assert_eq!(err.category(), "parse");
        assert_eq!(err.to_string(), "Failed to parse a.toml: bad");
    }
}
