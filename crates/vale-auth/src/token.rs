//! HS256 session tokens.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use vale_core::{Admin, AdminId, Role};

use crate::{AuthConfig, AuthError, AuthenticatedUser, TokenValidator};

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: String,
    /// Account email
    pub email: String,
    /// Account tier at login time
    pub role: Role,
    /// Expiry (seconds since epoch)
    pub exp: i64,
    /// Issued at (seconds since epoch)
    pub iat: i64,
}

/// A freshly issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    /// Encoded JWT
    pub token: String,
    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Signs session tokens for operators who logged in.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Creates an issuer signing with `secret`; tokens live `ttl_hours`
    /// (at least one hour).
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours.max(1)),
        }
    }

    /// Creates an issuer from the `[auth]` config section.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_hours)
    }

    /// Issues a token for `admin`.
    pub fn issue(&self, admin: &Admin) -> Result<SessionToken, AuthError> {
        self.issue_at(admin, Utc::now())
    }

    fn issue_at(&self, admin: &Admin, now: DateTime<Utc>) -> Result<SessionToken, AuthError> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: admin.id.to_string(),
            email: admin.email.clone(),
            role: admin.role,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| AuthError::Encoding(e.to_string()))?;

        Ok(SessionToken { token, expires_at })
    }
}

/// Validates tokens issued by [`TokenIssuer`] with the same secret.
#[derive(Clone)]
pub struct JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtValidator").finish_non_exhaustive()
    }
}

impl JwtValidator {
    /// Creates a validator for tokens signed with `secret`.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Creates a validator from the `[auth]` config section.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret)
    }

    /// Decodes and checks a token.
    pub fn decode(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::Base64(_)
                | jsonwebtoken::errors::ErrorKind::Json(_)
                | jsonwebtoken::errors::ErrorKind::Utf8(_) => {
                    AuthError::InvalidFormat(e.to_string())
                }
                _ => AuthError::InvalidSignature(e.to_string()),
            }
        })?;

        let claims = data.claims;
        let id = claims
            .sub
            .parse::<AdminId>()
            .map_err(|e| AuthError::InvalidClaims(format!("sub: {e}")))?;

        Ok(AuthenticatedUser {
            id,
            email: claims.email,
            role: claims.role,
        })
    }
}

impl TokenValidator for JwtValidator {
    fn validate(
        &self,
        token: &str,
        _config: &AuthConfig,
    ) -> Pin<Box<dyn Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>> {
        let result = self.decode(token);
        Box::pin(async move { result })
    }
}
