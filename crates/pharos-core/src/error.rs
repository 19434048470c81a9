//! Error types for the operation plan engine.

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all engine operations.
#[derive(Error, Debug)]
pub enum PlanError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Plan not found for the given ID
    #[error("Plan with ID {id} not found")]
    PlanNotFound { id: String },
    /// Lifecycle conflicts: stale resource version or terminal-state re-entry
    #[error("Conflict: {reason}")]
    Conflict { reason: String },
    /// Structural validation failures, keyed by the offending field
    #[error("Validation failed: {fields:?}")]
    Validation { fields: BTreeMap<String, String> },
    /// Structural patch failures raised while interpreting a JSON pointer
    #[error("Patch error: {source}")]
    Patch {
        #[from]
        source: PatchError,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Structural errors raised by the patch engine.
///
/// Any one of these fails the whole apply; no partially patched document is
/// ever returned to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// Pointer does not follow RFC 6901 syntax
    #[error("Malformed JSON pointer '{pointer}': {reason}")]
    MalformedPointer { pointer: String, reason: String },
    /// Array container addressed with a segment that is not an integer
    #[error("Invalid array index '{segment}' in pointer '{pointer}'")]
    InvalidIndex { pointer: String, segment: String },
    /// Pointer descends into a scalar value
    #[error("Pointer '{pointer}' traverses non-container value at '{segment}'")]
    NotAContainer { pointer: String, segment: String },
}

impl PlanError {
    /// Creates a conflict error with the given reason.
    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    /// Creates a single-field validation error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.into(), reason.into());
        Self::Validation { fields }
    }

    /// Creates a new database error with additional context.
    pub fn database_error(message: &str, source: rusqlite::Error) -> Self {
        Self::Database {
            message: message.to_string(),
            source,
        }
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| PlanError::database_error(message, e))
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, PlanError>;
