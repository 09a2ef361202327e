//! Tower authentication middleware.
//!
//! `AuthLayer` and `AuthService` wrap any inner service with bearer token
//! validation. Generic over `TokenValidator`.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::IntoResponse;
use http::{Request, StatusCode};
use tower::{Layer, Service};

use crate::{AuthConfig, AuthError, AuthenticatedUser, TokenValidator};

/// Tower `Layer` that wraps services with token authentication.
#[derive(Clone)]
pub struct AuthLayer<V: TokenValidator> {
    validator: Arc<V>,
    config: AuthConfig,
}

impl<V: TokenValidator> AuthLayer<V> {
    /// Create a new auth layer with the given validator and config.
    pub fn new(validator: Arc<V>, config: AuthConfig) -> Self {
        Self { validator, config }
    }
}

impl<V: TokenValidator, S> Layer<S> for AuthLayer<V> {
    type Service = AuthService<V, S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            validator: self.validator.clone(),
            config: self.config.clone(),
        }
    }
}

/// Tower `Service` that validates tokens before forwarding requests.
///
/// On successful validation, inserts `AuthenticatedUser` into request
/// extensions. With auth disabled every request carries
/// [`AuthenticatedUser::anonymous`].
#[derive(Clone)]
pub struct AuthService<V: TokenValidator, S> {
    inner: S,
    validator: Arc<V>,
    config: AuthConfig,
}

impl<V, S> Service<Request<Body>> for AuthService<V, S>
where
    V: TokenValidator,
    S: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send,
{
    type Response = axum::response::Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let validator = self.validator.clone();
        let config = self.config.clone();
        let token = bearer_token(&req).map(str::to_string);
        let path = req.uri().path().to_string();

        Box::pin(async move {
            let session = authenticate(validator.as_ref(), &config, token.as_deref(), &path);
            let user = match session.await {
                Ok(user) => user,
                Err(rejection) => return Ok(rejection),
            };
            req.extensions_mut().insert(user);

            let resp = inner
                .call(req)
                .await
                .unwrap_or_else(|infallible| match infallible {});
            Ok(resp.into_response())
        })
    }
}

// Resolves the caller or builds the 401 that ends the request.
async fn authenticate<V: TokenValidator>(
    validator: &V,
    config: &AuthConfig,
    token: Option<&str>,
    path: &str,
) -> Result<AuthenticatedUser, axum::response::Response> {
    if !config.enabled {
        return Ok(AuthenticatedUser::anonymous());
    }

    let Some(token) = token else {
        return Err(unauthorized_response(&AuthError::MissingToken.to_string()));
    };

    match validator.validate(token, config).await {
        Ok(user) => {
            log::debug!("Authenticated {} ({})", user.email, user.role);
            Ok(user)
        }
        Err(err) => {
            log::warn!("Rejected session on {path}: {err}");
            Err(unauthorized_response(&err.to_string()))
        }
    }
}

/// Token from an `Authorization: Bearer <token>` header. The scheme name is
/// case-insensitive.
fn bearer_token(req: &Request<Body>) -> Option<&str> {
    let value = req
        .headers()
        .get(http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// 401 with a `{"error": ...}` body and a `WWW-Authenticate: Bearer` challenge.
pub fn unauthorized_response(message: &str) -> axum::response::Response {
    let body = serde_json::json!({ "error": message });

    (
        StatusCode::UNAUTHORIZED,
        [
            (http::header::CONTENT_TYPE, "application/json"),
            (http::header::WWW_AUTHENTICATE, "Bearer"),
        ],
        serde_json::to_string(&body).unwrap_or_default(),
    )
        .into_response()
}
