//! Error taxonomy for document collection.
//!
//! Collection errors are values, not panics. A [`CollectError`] raised while
//! opening a file is captured inside the entity and handed back by every later
//! operation, so the type is `Clone` and carries its causes as text.
//!
//! A failure deep inside a dependency tree is never wrapped on the way up: the
//! root document observes exactly the error its failing descendant produced.

use thiserror::Error;

/// Result alias used by the collection engine.
pub type CollectResult<T> = std::result::Result<T, CollectError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollectError {
    /// Missing or malformed command arguments
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Missing or invalid configuration section or value
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configured object-storage provider is not known
    #[error("Unsupported provider: '{0}'")]
    UnsupportedProvider(String),

    /// The entity could not be opened or read
    #[error("Failed to read '{uri}': {reason}")]
    Discovery { uri: String, reason: String },

    /// A local write failed
    #[error("Failed to write '{target}': {reason}")]
    Write { target: String, reason: String },

    /// An object-storage request failed
    #[error("Object storage request for '{key}' failed: {reason}")]
    Storage { key: String, reason: String },

    /// An operation observed a fired cancellation token
    #[error("Collection of '{uri}' was cancelled")]
    Cancelled { uri: String },

    /// A collection task ended without reporting a result
    #[error("Collection of '{uri}' ended without a result")]
    Interrupted { uri: String },
}

impl CollectError {
    pub fn discovery(uri: impl Into<String>, reason: impl ToString) -> Self {
        CollectError::Discovery {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }

    pub fn write(target: impl Into<String>, reason: impl ToString) -> Self {
        CollectError::Write {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    pub fn storage(key: impl Into<String>, reason: impl ToString) -> Self {
        CollectError::Storage {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CollectError::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CollectError::discovery("/tmp/a.md", "No such file or directory");
        assert_eq!(err.to_string(), "Failed to read '/tmp/a.md': No such file or directory");

        let err = CollectError::UnsupportedProvider("gcs".to_string());
        assert_eq!(err.to_string(), "Unsupported provider: 'gcs'");
    }

    #[test]
    fn test_cancelled_predicate() {
        let err = CollectError::Cancelled { uri: "x".to_string() };
        assert!(err.is_cancelled());
        assert!(!CollectError::write("y", "disk full").is_cancelled());
    }

    #[test]
    fn test_captured_error_is_cloneable() {
        let err = CollectError::discovery("/a.png", "denied");
        let copy = err.clone();
        assert_eq!(err, copy);
    }
}
