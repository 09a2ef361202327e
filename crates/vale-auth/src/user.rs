//! Authenticated operator identity and extraction helpers.

use axum::extract::FromRequestParts;
use axum::response::Response;
use vale_core::{AdminId, Permission, Role};

use crate::error::AuthError;
use crate::middleware::unauthorized_response;

/// An authenticated operator, extracted from a validated token.
///
/// Stored in HTTP request extensions by the auth middleware. Handlers take
/// it as an extractor; requests that never went through the middleware are
/// rejected with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The operator's account id (the `sub` claim).
    pub id: AdminId,
    /// The operator's email address.
    pub email: String,
    /// The operator's current tier, as stored on the account.
    pub role: Role,
}

impl AuthenticatedUser {
    /// The identity injected when authentication is disabled.
    pub fn anonymous() -> Self {
        Self {
            id: AdminId::from_uuid(Default::default()),
            email: "anonymous".to_string(),
            role: Role::Adm,
        }
    }

    /// Fails with [`AuthError::Forbidden`] unless the role grants
    /// `permission`.
    pub fn require(&self, permission: Permission) -> Result<(), AuthError> {
        if self.role.allows(permission) {
            Ok(())
        } else {
            log::debug!(
                "Denied {permission} to {} ({})",
                self.email,
                self.role
            );
            Err(AuthError::Forbidden {
                role: self.role,
                permission,
            })
        }
    }
}

/// Extract the `AuthenticatedUser` from HTTP request `Parts`, if present.
pub fn user_from_parts(parts: &http::request::Parts) -> Option<&AuthenticatedUser> {
    parts.extensions.get::<AuthenticatedUser>()
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        user_from_parts(parts)
            .cloned()
            .ok_or_else(|| unauthorized_response(&AuthError::MissingToken.to_string()))
    }
}
