//! Liveness probe.

use axum::Json;
use axum::extract::State;

use crate::state::SharedState;
use crate::views::HealthResponse;

/// `GET /health`
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let database = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            false
        }
    };

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}
