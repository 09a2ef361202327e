//! Clients and carriers.

use axum::Json;
use axum::extract::State;
use http::StatusCode;
use vale_auth::AuthenticatedUser;
use vale_core::{
    Cliente, ClienteId, NewCliente, NewTransportadora, Permission, Transportadora,
    TransportadoraId,
};

use crate::error::Result;
use crate::extract::{JsonBody, PathParam};
use crate::state::SharedState;

/// `GET /api/clientes`
pub async fn list_clientes(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Cliente>>> {
    user.require(Permission::Read)?;
    Ok(Json(state.db.clientes().list().await?))
}

/// `POST /api/clientes`
pub async fn create_cliente(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    JsonBody(payload): JsonBody<NewCliente>,
) -> Result<(StatusCode, Json<Cliente>)> {
    user.require(Permission::ManageVales)?;
    let new = payload.validated()?;
    let cliente = state.db.clientes().create(&new.nome).await?;
    Ok((StatusCode::CREATED, Json(cliente)))
}

/// `DELETE /api/clientes/{id}`
pub async fn delete_cliente(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    PathParam(id): PathParam<ClienteId>,
) -> Result<StatusCode> {
    user.require(Permission::ManageCadastros)?;
    state.db.clientes().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/transportadoras`
pub async fn list_transportadoras(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Transportadora>>> {
    user.require(Permission::Read)?;
    Ok(Json(state.db.transportadoras().list().await?))
}

/// `POST /api/transportadoras`
pub async fn create_transportadora(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    JsonBody(payload): JsonBody<NewTransportadora>,
) -> Result<(StatusCode, Json<Transportadora>)> {
    user.require(Permission::ManageVales)?;
    let new = payload.validated()?;
    let transportadora = state.db.transportadoras().create(&new.nome).await?;
    Ok((StatusCode::CREATED, Json(transportadora)))
}

/// `DELETE /api/transportadoras/{id}`
pub async fn delete_transportadora(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    PathParam(id): PathParam<TransportadoraId>,
) -> Result<StatusCode> {
    user.require(Permission::ManageCadastros)?;
    state.db.transportadoras().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
