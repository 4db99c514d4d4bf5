//! Error types and handling for the Haiku backend

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the Haiku backend
#[derive(Error, Debug)]
pub enum HaikuError {
    /// Mutation or deletion target does not exist
    #[error("{message}")]
    NotFound { message: String },

    /// Request body or query failed to deserialize
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Weather or text-generation provider failed
    #[error("{message}")]
    Upstream { message: String },

    /// A provider credential is not configured
    #[error("{message}")]
    ConfigurationMissing { message: String },

    /// Invalid application configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Storage engine or document codec failure
    #[error("Store error: {message}")]
    Store { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Coarse classification of [`HaikuError`], used at the transport boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Upstream,
    ConfigurationMissing,
    Config,
    Store,
    Io,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::Upstream => "upstream",
            ErrorKind::ConfigurationMissing => "configuration_missing",
            ErrorKind::Config => "config",
            ErrorKind::Store => "store",
            ErrorKind::Io => "io",
        }
    }
}

impl HaikuError {
    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new upstream provider error
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Create a new missing-credential error
    pub fn configuration_missing<S: Into<String>>(message: S) -> Self {
        Self::ConfigurationMissing {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            HaikuError::NotFound { .. } => ErrorKind::NotFound,
            HaikuError::Validation { .. } => ErrorKind::Validation,
            HaikuError::Upstream { .. } => ErrorKind::Upstream,
            HaikuError::ConfigurationMissing { .. } => ErrorKind::ConfigurationMissing,
            HaikuError::Config { .. } => ErrorKind::Config,
            HaikuError::Store { .. } => ErrorKind::Store,
            HaikuError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Provider-side failures are reported inside a successful response body
    /// so that low-power clients never have to parse an HTTP error.
    #[must_use]
    pub fn is_payload_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Upstream | ErrorKind::ConfigurationMissing
        )
    }
}

impl From<fjall::Error> for HaikuError {
    fn from(err: fjall::Error) -> Self {
        HaikuError::store(err.to_string())
    }
}

impl From<postcard::Error> for HaikuError {
    fn from(err: postcard::Error) -> Self {
        HaikuError::store(format!("document codec: {err}"))
    }
}

impl From<tokio::task::JoinError> for HaikuError {
    fn from(err: tokio::task::JoinError) -> Self {
        HaikuError::store(format!("storage task failed: {err}"))
    }
}

impl IntoResponse for HaikuError {
    fn into_response(self) -> Response {
        match self.kind() {
            ErrorKind::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "detail": self.to_string() }))).into_response()
            }
            ErrorKind::Validation => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": self.to_string() })),
            )
                .into_response(),
            ErrorKind::Upstream | ErrorKind::ConfigurationMissing => (
                StatusCode::OK,
                Json(json!({ "error": self.to_string(), "kind": self.kind().as_str() })),
            )
                .into_response(),
            ErrorKind::Config | ErrorKind::Store | ErrorKind::Io => {
                tracing::error!("Request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
