//! Error types for the modelseek library.
//!
//! All fallible operations return [`ModelseekError`]. Build and load failures
//! are surfaced to the caller immediately; "no match" conditions at query time
//! are never errors and simply produce an empty result list.
//!
//! # Examples
//!
//! ```
//! use modelseek::error::{ErrorKind, ModelseekError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(ModelseekError::invalid_config("k1 must be positive"))
//! }
//!
//! let err = example_operation().unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
//! ```

use std::io;

use thiserror::Error;

/// The main error type for modelseek operations.
#[derive(Error, Debug)]
pub enum ModelseekError {
    /// A build was attempted over zero documents.
    #[error("Empty corpus: no documents to index")]
    EmptyCorpus,

    /// A persisted dense index was produced by a different embedding model.
    #[error("Index model mismatch: index was built with '{found}', configured model is '{expected}'")]
    IndexModelMismatch {
        /// Identifier of the currently configured embedding model.
        expected: String,
        /// Identifier recorded in the persisted index.
        found: String,
    },

    /// Persisted index bytes failed to decode or verify.
    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    /// Configuration values are out of range or inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A document carried a property that maps to no known field.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// The same document id appeared twice in one build.
    #[error("Duplicate document: {0}")]
    DuplicateDocument(String),

    /// The embedding model failed to encode text.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of [`ModelseekError`] used by callers to decide
/// between rebuilding, fixing configuration, or reporting the engine as
/// unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Build attempted on zero documents.
    EmptyCorpus,
    /// Persisted dense index belongs to another embedding model.
    IndexModelMismatch,
    /// Persisted index bytes are unreadable.
    CorruptIndex,
    /// Bad configuration or invalid build input.
    InvalidConfiguration,
    /// I/O, storage or embedding backend failure.
    Unavailable,
}

/// Result type alias for operations that may fail with ModelseekError.
pub type Result<T> = std::result::Result<T, ModelseekError>;

impl ModelseekError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelseekError::EmptyCorpus => ErrorKind::EmptyCorpus,
            ModelseekError::IndexModelMismatch { .. } => ErrorKind::IndexModelMismatch,
            ModelseekError::CorruptIndex(_) => ErrorKind::CorruptIndex,
            ModelseekError::InvalidConfiguration(_)
            | ModelseekError::UnknownField(_)
            | ModelseekError::DuplicateDocument(_) => ErrorKind::InvalidConfiguration,
            ModelseekError::Embedding(_)
            | ModelseekError::Storage(_)
            | ModelseekError::Io(_)
            | ModelseekError::Json(_) => ErrorKind::Unavailable,
        }
    }

    /// Create a new invalid configuration error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        ModelseekError::InvalidConfiguration(msg.into())
    }

    /// Create a new corrupt index error.
    pub fn corrupt_index<S: Into<String>>(msg: S) -> Self {
        ModelseekError::CorruptIndex(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        ModelseekError::Storage(msg.into())
    }

    /// Create a new embedding error.
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        ModelseekError::Embedding(msg.into())
    }

    /// Create a new unknown field error.
    pub fn unknown_field<S: Into<String>>(name: S) -> Self {
        ModelseekError::UnknownField(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = ModelseekError::invalid_config("b must be in (0, 1]");
        assert_eq!(
            error.to_string(),
            "Invalid configuration: b must be in (0, 1]"
        );

        let error = ModelseekError::corrupt_index("bad magic");
        assert_eq!(error.to_string(), "Corrupt index: bad magic");

        let error = ModelseekError::IndexModelMismatch {
            expected: "hashing-64".to_string(),
            found: "minilm".to_string(),
        };
        assert!(error.to_string().contains("minilm"));
        assert!(error.to_string().contains("hashing-64"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ModelseekError::EmptyCorpus.kind(), ErrorKind::EmptyCorpus);
        assert_eq!(
            ModelseekError::unknown_field("color").kind(),
            ErrorKind::InvalidConfiguration
        );
        assert_eq!(
            ModelseekError::DuplicateDocument("a".into()).kind(),
            ErrorKind::InvalidConfiguration
        );
        assert_eq!(
            ModelseekError::storage("disk full").kind(),
            ErrorKind::Unavailable
        );
        assert_eq!(
            ModelseekError::corrupt_index("crc").kind(),
            ErrorKind::CorruptIndex
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = ModelseekError::from(io_error);

        match error {
            ModelseekError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
        assert_eq!(
            ModelseekError::from(io::Error::other("x")).kind(),
            ErrorKind::Unavailable
        );
    }
}
