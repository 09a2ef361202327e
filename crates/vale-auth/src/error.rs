//! Auth-specific error types.

use vale_core::{Permission, Role};

/// Errors that can occur during authentication and authorization.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header or bearer token present.
    #[error("missing authentication token")]
    MissingToken,

    /// Token format is invalid (not a valid JWT).
    #[error("invalid token format: {0}")]
    InvalidFormat(String),

    /// JWT signature verification failed.
    #[error("invalid token signature: {0}")]
    InvalidSignature(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token claims could not be mapped to an operator.
    #[error("invalid token claims: {0}")]
    InvalidClaims(String),

    /// Email or password did not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but was not approved yet.
    #[error("account pending approval")]
    PendingApproval,

    /// The operator's role does not grant the permission.
    #[error("role '{role}' lacks permission '{permission}'")]
    Forbidden {
        /// The caller's role
        role: Role,
        /// The permission that was required
        permission: Permission,
    },

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Token signing failed.
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

impl AuthError {
    /// Whether this error was caused by the caller (vs. a 500).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::InvalidFormat(_)
                | AuthError::InvalidSignature(_)
                | AuthError::Expired
                | AuthError::InvalidClaims(_)
                | AuthError::InvalidCredentials
                | AuthError::PendingApproval
                | AuthError::Forbidden { .. }
        )
    }

    /// Whether the caller is known but not allowed (403 rather than 401).
    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            AuthError::PendingApproval | AuthError::Forbidden { .. }
        )
    }
}
