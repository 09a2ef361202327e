//! Authentication for Vale Palete.
//!
//! Provides:
//! - [`PasswordHasher`]: bcrypt hashing for operator passwords
//! - [`TokenIssuer`] / [`JwtValidator`]: HS256 session tokens
//! - [`AuthenticatedUser`]: identity extracted from a validated token
//! - [`TokenValidator`]: trait for async token validation
//! - [`AuthLayer`] / [`AuthService`]: Tower middleware parameterised over `TokenValidator`
//! - [`AuthConfig`]: configuration for the auth layer (`[auth]` config section)
//! - [`AuthError`]: auth-specific error types

mod error;
mod middleware;
mod password;
mod token;
mod user;

use serde::{Deserialize, Serialize};

pub use error::AuthError;
pub use middleware::{AuthLayer, AuthService, unauthorized_response};
pub use password::PasswordHasher;
pub use token::{Claims, JwtValidator, SessionToken, TokenIssuer};
pub use user::{AuthenticatedUser, user_from_parts};

/// Secret used when none is configured. Only suitable for development.
pub const DEV_JWT_SECRET: &str = "valepalete-dev-secret-change-me";

/// Configuration for authentication.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Whether authentication is enabled. When false, every request runs as
    /// an anonymous adm.
    pub enabled: bool,
    /// HMAC secret for session tokens.
    pub jwt_secret: String,
    /// Session lifetime in hours.
    pub token_ttl_hours: i64,
    /// Email suffixes accepted at registration (e.g. `@empresa.com`).
    /// Empty accepts any domain.
    pub allowed_email_domains: Vec<String>,
    /// bcrypt work factor.
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_hours: 12,
            allowed_email_domains: Vec::new(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl AuthConfig {
    /// Whether the development secret is still in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

/// Trait for validating tokens and extracting user identity.
///
/// The middleware calls `validate()` with the bearer token and stores the
/// returned user in the request extensions.
pub trait TokenValidator: Send + Sync + 'static {
    /// Validate a token and return the authenticated user.
    fn validate(
        &self,
        token: &str,
        config: &AuthConfig,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>,
    >;
}
