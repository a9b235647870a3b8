//! Error types for fkdm.
//!
//! This module defines all error types used throughout the fkdm crate,
//! providing detailed context for debugging and user-facing notices.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fkdm operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A slot write was rejected because it would exceed the storage quota.
    #[error("storage quota exceeded writing '{key}': {needed} bytes needed, quota is {quota}")]
    QuotaExceeded {
        /// Slot that was being written.
        key: String,
        /// Total bytes the store would hold after the write.
        needed: u64,
        /// Configured quota in bytes.
        quota: u64,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Session Errors ===
    /// The persisted session could not be parsed.
    #[error("persisted session in slot '{slot}' is malformed: {source}")]
    SessionCorrupt {
        /// Slot holding the session blob.
        slot: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    // === Form Errors ===
    /// Required report fields were left empty.
    #[error("required fields are empty: {}", .fields.join(", "))]
    MissingFields {
        /// Wire names of the empty fields.
        fields: Vec<&'static str>,
    },

    /// A form field name was not recognized.
    #[error("unknown report field: {0}")]
    UnknownField(String),

    // === Navigation Errors ===
    /// A path did not match any route.
    #[error("unknown route: {0}")]
    UnknownRoute(String),

    // === Share Errors ===
    /// The external opener could not be launched.
    #[error("failed to open {url}: {message}")]
    Open {
        /// Link that was being opened.
        url: String,
        /// Description of what went wrong.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for fkdm operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create an opener failure for the given link.
    #[must_use]
    pub fn open(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Open {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Check if this error is a storage write rejection.
    ///
    /// These are the failures a user sees as "could not save" notices.
    #[must_use]
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseOpen { .. }
                | Self::Io(_)
        )
    }

    /// Check if this error is a required-field validation failure.
    #[must_use]
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, Self::MissingFields { .. })
    }
}
