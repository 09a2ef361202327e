//! Error types for vale-api and their HTTP mapping.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;
use vale_auth::AuthError;

/// Result type alias for vale-api operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message sent to clients for any 5xx; the cause is only logged.
const INTERNAL_MESSAGE: &str = "Erro interno do servidor";

/// Errors that can occur in vale-api
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from vale-core (validation, status policy)
    #[error("{0}")]
    Core(#[from] vale_core::Error),

    /// Error from vale-storage
    #[error("{0}")]
    Storage(#[from] vale_storage::Error),

    /// Error from vale-auth
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Malformed request (body, query or path)
    #[error("{0}")]
    BadRequest(String),

    /// Caller is not authenticated
    #[error("{0}")]
    Unauthorized(String),

    /// Caller is authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    /// Request body or attachment is over the configured size
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (binding, config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected server-side failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// Creates an internal error.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal(message.into())
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Core(e) => core_status(e),
            Error::Storage(e) => match e {
                vale_storage::Error::NotFound { .. } => StatusCode::NOT_FOUND,
                vale_storage::Error::Conflict(_) => StatusCode::CONFLICT,
                vale_storage::Error::Core(e) => core_status(e),
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Auth(e) if e.is_forbidden() => StatusCode::FORBIDDEN,
            Error::Auth(e) if e.is_client_error() => StatusCode::UNAUTHORIZED,
            Error::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Config(_) | Error::Io(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

fn core_status(err: &vale_core::Error) -> StatusCode {
    match err {
        vale_core::Error::Policy(_) => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            INTERNAL_MESSAGE.to_string()
        } else {
            tracing::debug!(%status, error = %self, "Request rejected");
            self.to_string()
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
