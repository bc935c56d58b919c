//! Error types for the artifact depot.
//!
//! Every failure is scoped to a single request. The host turns an error into
//! the canonical `{}` payload plus the error's code and message.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for depot operations.
#[derive(Debug, Error)]
pub enum DepotError {
    // Caller errors
    #[error("Unable to deserialize request: {message}")]
    MalformedRequest {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("`{field}` field {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    #[error("File not found on path: {}", .path.display())]
    ArtifactNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    // Operator errors
    #[error("Wrong service configuration: {message}")]
    Misconfiguration { message: String },

    // Internal errors
    #[error("Failed to serialize response: {message}")]
    SerializationFailure { message: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Method not found: {0}")]
    MethodNotFound(String),
}

/// Result type alias for depot operations.
pub type Result<T> = std::result::Result<T, DepotError>;

impl From<rusqlite::Error> for DepotError {
    fn from(err: rusqlite::Error) -> Self {
        DepotError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl DepotError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        DepotError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a configuration error for a missing or unusable key.
    pub fn misconfigured(message: impl Into<String>) -> Self {
        DepotError::Misconfiguration {
            message: message.into(),
        }
    }

    /// Convert to a JSON-RPC error code.
    ///
    /// Standard JSON-RPC error codes:
    /// - -32700: Parse error
    /// - -32601: Method not found
    /// - -32602: Invalid params
    /// - -32603: Internal error
    ///
    /// Custom error codes:
    /// - -32002: Artifact not found
    pub fn to_rpc_error_code(&self) -> i32 {
        match self {
            DepotError::MalformedRequest { .. } => -32700,
            DepotError::MethodNotFound(_) => -32601,
            DepotError::InvalidArgument { .. } => -32602,
            DepotError::ArtifactNotFound { .. } => -32002,

            // Everything else is an internal error
            _ => -32603,
        }
    }

    /// Whether the caller (rather than the operator or the service) caused this error.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DepotError::MalformedRequest { .. }
                | DepotError::InvalidArgument { .. }
                | DepotError::ArtifactNotFound { .. }
                | DepotError::MethodNotFound(_)
        )
    }
}
