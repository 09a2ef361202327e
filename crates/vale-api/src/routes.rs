//! Router assembly.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use vale_auth::AuthLayer;

use crate::auth::SessionValidator;
use crate::config::ServerConfig;
use crate::handlers::{admins, cadastros, dashboard, health, vales};
use crate::state::SharedState;

/// Room for the JSON around a base64 attachment.
const BODY_OVERHEAD: usize = 64 * 1024;

/// Builds the full application router.
///
/// `/health`, registration and login are public; everything else goes
/// through [`AuthLayer`] with a [`SessionValidator`].
pub fn router(state: SharedState) -> Router {
    let validator = Arc::new(SessionValidator::new(state.db.clone(), &state.config.auth));
    let auth = AuthLayer::new(validator, state.config.auth.clone());

    let public = Router::new()
        .route("/health", get(health::health))
        .route("/api/admins", post(admins::register))
        .route("/api/admins/login", post(admins::login));

    let protected = Router::new()
        .route("/api/admins", get(admins::list))
        .route("/api/admins/{id}", axum::routing::delete(admins::delete))
        .route("/api/admins/{id}/status", put(admins::set_status))
        .route("/api/admins/{id}/role", put(admins::set_role))
        .route(
            "/api/clientes",
            get(cadastros::list_clientes).post(cadastros::create_cliente),
        )
        .route(
            "/api/clientes/{id}",
            axum::routing::delete(cadastros::delete_cliente),
        )
        .route(
            "/api/transportadoras",
            get(cadastros::list_transportadoras).post(cadastros::create_transportadora),
        )
        .route(
            "/api/transportadoras/{id}",
            axum::routing::delete(cadastros::delete_transportadora),
        )
        .route("/api/vales", get(vales::list).post(vales::create))
        .route("/api/vales/expirar", post(vales::expire))
        .route(
            "/api/vales/{id}",
            get(vales::get).put(vales::update_status).delete(vales::delete),
        )
        .route("/api/vales/{id}/arquivo", put(vales::attach))
        .route("/api/vales/{id}/processar", post(vales::process))
        .route("/api/dashboard", get(dashboard::dashboard))
        .route_layer(auth);

    let body_limit = body_limit(state.config.vales.max_attachment_bytes);
    let cors = cors_layer(&state.config.server);

    public
        .merge(protected)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Request body limit for a given decoded attachment size.
pub fn body_limit(max_attachment_bytes: usize) -> usize {
    max_attachment_bytes
        .div_ceil(3)
        .saturating_mul(4)
        .saturating_add(BODY_OVERHEAD)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
