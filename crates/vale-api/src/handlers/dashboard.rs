//! Dashboard totals.

use axum::Json;
use axum::extract::State;
use vale_auth::AuthenticatedUser;
use vale_core::{DashboardStats, Permission, ValeFilter};

use crate::error::Result;
use crate::state::SharedState;

/// `GET /api/dashboard`
pub async fn dashboard(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
) -> Result<Json<DashboardStats>> {
    user.require(Permission::Read)?;
    state.sweep_overdue().await?;

    let vales = state.db.vales().list(&ValeFilter::default()).await?;
    let clientes = state.db.clientes().count().await?;
    let transportadoras = state.db.transportadoras().count().await?;

    Ok(Json(DashboardStats::compute(
        &vales,
        clientes,
        transportadoras,
        &state.policy,
        state.today(),
    )))
}
