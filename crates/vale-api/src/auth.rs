//! Session validation against the account table.

use std::future::Future;
use std::pin::Pin;

use vale_auth::{AuthConfig, AuthError, AuthenticatedUser, JwtValidator, TokenValidator};
use vale_core::AdminStatus;
use vale_storage::Database;

/// Validates the token signature, then reloads the account.
///
/// The role in the token is only what it was at login; the stored role wins,
/// so a demotion or suspension takes effect on the next request. Deleted
/// and pending accounts are rejected.
#[derive(Debug, Clone)]
pub struct SessionValidator {
    jwt: JwtValidator,
    db: Database,
}

impl SessionValidator {
    /// Creates a validator over `db` for tokens signed per `config`.
    pub fn new(db: Database, config: &AuthConfig) -> Self {
        Self {
            jwt: JwtValidator::from_config(config),
            db,
        }
    }

    async fn validate_session(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claimed = self.jwt.decode(token)?;

        let admin = match self.db.admins().get(claimed.id).await {
            Ok(admin) => admin,
            Err(e) if e.is_not_found() => {
                return Err(AuthError::InvalidClaims("account no longer exists".into()));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load session account");
                return Err(AuthError::InvalidClaims("account lookup failed".into()));
            }
        };

        if admin.status != AdminStatus::Ativo {
            return Err(AuthError::PendingApproval);
        }

        Ok(AuthenticatedUser {
            id: admin.id,
            email: admin.email,
            role: admin.role,
        })
    }
}

impl TokenValidator for SessionValidator {
    fn validate(
        &self,
        token: &str,
        _config: &AuthConfig,
    ) -> Pin<Box<dyn Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>> {
        let token = token.to_string();
        Box::pin(async move { self.validate_session(&token).await })
    }
}
