//! Voucher lifecycle.
//!
//! Every read sweeps overdue vouchers first so `acumulado` is never stale.
//! Status changes are checked against [`StatusPolicy`] and then written with
//! a compare-and-set on the status that was checked.
//!
//! [`StatusPolicy`]: vale_core::StatusPolicy

use axum::Json;
use axum::extract::State;
use http::StatusCode;
use vale_auth::AuthenticatedUser;
use vale_core::{Attachment, NewVale, Permission, ValeFilter, ValeId};

use crate::error::{Error, Result};
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::state::SharedState;
use crate::views::{ExpireResponse, ProcessRequest, ValeStatusUpdate, ValeView};

/// `GET /api/vales`
pub async fn list(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    QueryParams(filter): QueryParams<ValeFilter>,
) -> Result<Json<Vec<ValeView>>> {
    user.require(Permission::Read)?;
    state.sweep_overdue().await?;

    let today = state.today();
    let vales = state.db.vales().list(&filter).await?;
    Ok(Json(
        vales
            .into_iter()
            .map(|vale| ValeView::new(vale, &state.policy, today))
            .collect(),
    ))
}

/// `GET /api/vales/{id}`
pub async fn get(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    PathParam(id): PathParam<ValeId>,
) -> Result<Json<ValeView>> {
    user.require(Permission::Read)?;
    state.sweep_overdue().await?;

    let vale = state.db.vales().get(id).await?;
    Ok(Json(ValeView::new(vale, &state.policy, state.today())))
}

/// `POST /api/vales`
pub async fn create(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    JsonBody(payload): JsonBody<NewVale>,
) -> Result<(StatusCode, Json<ValeView>)> {
    user.require(Permission::ManageVales)?;
    let new = payload.validated()?;

    let today = state.today();
    let status = state.policy.initial_status(new.data_vencimento, today);
    let vale = state.db.vales().create(&new, status).await?;
    Ok((
        StatusCode::CREATED,
        Json(ValeView::new(vale, &state.policy, today)),
    ))
}

/// `PUT /api/vales/{id}`
pub async fn update_status(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    PathParam(id): PathParam<ValeId>,
    JsonBody(update): JsonBody<ValeStatusUpdate>,
) -> Result<Json<ValeView>> {
    user.require(Permission::ManageVales)?;

    let today = state.today();
    let vale = state.db.vales().get(id).await?;
    let from = vale.status;
    let vale = match state
        .policy
        .check_transition(&vale, update.status, today)
        .map_err(vale_core::Error::from)?
    {
        Some(to) => state.db.vales().update_status(id, from, to).await?,
        None => vale,
    };

    Ok(Json(ValeView::new(vale, &state.policy, today)))
}

/// `PUT /api/vales/{id}/arquivo`
pub async fn attach(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    PathParam(id): PathParam<ValeId>,
    JsonBody(attachment): JsonBody<Attachment>,
) -> Result<Json<ValeView>> {
    user.require(Permission::ManageVales)?;

    let decoded = attachment.decode()?;
    let limit = state.config.vales.max_attachment_bytes;
    if decoded.len() > limit {
        return Err(Error::PayloadTooLarge(format!(
            "file has {} bytes, the limit is {limit}",
            decoded.len()
        )));
    }

    let today = state.today();
    let vale = state.db.vales().get(id).await?;
    state
        .policy
        .check_attach(&vale, today)
        .map_err(vale_core::Error::from)?;

    let vale = state.db.vales().attach_file(id, &attachment).await?;
    tracing::debug!(%id, bytes = decoded.len(), mime = ?decoded.mime, "Proof stored");
    Ok(Json(ValeView::new(vale, &state.policy, today)))
}

/// `POST /api/vales/{id}/processar`
pub async fn process(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    PathParam(id): PathParam<ValeId>,
    JsonBody(request): JsonBody<ProcessRequest>,
) -> Result<Json<ValeView>> {
    user.require(Permission::ManageVales)?;

    let today = state.today();
    let vale = state.db.vales().get(id).await?;
    let to = state
        .policy
        .check_process(&vale, request.modo, today)
        .map_err(vale_core::Error::from)?;

    let vale = state.db.vales().update_status(id, vale.status, to).await?;
    tracing::info!(%id, modo = ?request.modo, by = %user.email, "Vale processed");
    Ok(Json(ValeView::new(vale, &state.policy, today)))
}

/// `POST /api/vales/expirar`
pub async fn expire(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
) -> Result<Json<ExpireResponse>> {
    user.require(Permission::ManageVales)?;
    let expirados = state.sweep_overdue().await?;
    Ok(Json(ExpireResponse { expirados }))
}

/// `DELETE /api/vales/{id}`
pub async fn delete(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    PathParam(id): PathParam<ValeId>,
) -> Result<StatusCode> {
    user.require(Permission::ManageVales)?;
    state.db.vales().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
