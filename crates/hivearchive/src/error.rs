//! Error types for hivearchive.
//!
//! This module defines all error types used throughout the hivearchive crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for hivearchive operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Store Errors ===
    /// The remote store could not be reached or rejected the request.
    #[error("store unavailable during {operation}: {message}")]
    StoreUnavailable {
        /// The store operation that failed (`fetch` or `append`).
        operation: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// An append was attempted with empty text.
    #[error("refusing to store empty text")]
    EmptyInput,

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

    /// The store connection variable is not set.
    #[error("store connection is not configured: environment variable {variable} is not set")]
    StoreConfigMissing {
        /// Name of the environment variable that was consulted.
        variable: String,
    },

    /// The store connection variable could not be interpreted.
    #[error("store connection in {variable} is malformed: {message}")]
    StoreConfigMalformed {
        /// Name of the environment variable that was consulted.
        variable: String,
        /// Description of the problem.
        message: String,
    },

    // === Collaborator Errors ===
    /// A host capability (speech) is missing or failed.
    #[error("{capability} is not available: {message}")]
    UnsupportedCapability {
        /// Name of the capability.
        capability: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// Saving an exported file failed.
    #[error("failed to export to {path}: {source}")]
    ExportFailure {
        /// Destination that could not be written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Selection Errors ===
    /// A row number does not refer to a visible record.
    #[error("row {row} is out of range ({visible} visible)")]
    RowOutOfRange {
        /// The 1-based row that was requested.
        row: usize,
        /// How many rows are visible.
        visible: usize,
    },

    // === I/O Errors ===
    /// File system or terminal operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for hivearchive operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a store unavailable error.
    #[must_use]
    pub fn store_unavailable(operation: &'static str, message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            operation,
            message: message.into(),
        }
    }

    /// Create an unsupported capability error.
    #[must_use]
    pub fn unsupported(capability: &'static str, message: impl Into<String>) -> Self {
        Self::UnsupportedCapability {
            capability,
            message: message.into(),
        }
    }

    /// Create a malformed store connection error.
    #[must_use]
    pub fn store_config_malformed(variable: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreConfigMalformed {
            variable: variable.into(),
            message: message.into(),
        }
    }

    /// Check if this error means the remote store failed.
    #[must_use]
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }

    /// Check if this error is the empty-input rejection.
    #[must_use]
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Self::EmptyInput)
    }

    /// Check if this error stops the program at startup.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::StoreConfigMissing { .. }
                | Self::StoreConfigMalformed { .. }
                | Self::ConfigLoad(_)
                | Self::ConfigValidation { .. }
        )
    }

    /// Process exit status for this error: 2 for startup failures, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        if self.is_fatal() {
            2
        } else {
            1
        }
    }
}
