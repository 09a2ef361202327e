//! Operator accounts: registration, login and approval.

use axum::Json;
use axum::extract::State;
use http::StatusCode;
use vale_auth::{AuthError, AuthenticatedUser, PasswordHasher};
use vale_core::{Admin, AdminFilter, AdminId, AdminStatus, NewAdmin, Permission, normalize_email};

use crate::error::{Error, Result};
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::state::SharedState;
use crate::views::{AdminStatusUpdate, LoginRequest, LoginResponse, RoleUpdate};

/// `POST /api/admins`
///
/// Open to anyone. The first adm is active at once; every other account
/// waits for approval.
pub async fn register(
    State(state): State<SharedState>,
    JsonBody(payload): JsonBody<NewAdmin>,
) -> Result<(StatusCode, Json<Admin>)> {
    let new = payload.validated(&state.registration)?;
    let hash = hash_password(state.hasher, new.senha.clone()).await?;
    let admin = state.db.admins().create(&new, &hash).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}

/// `POST /api/admins/login`
pub async fn login(
    State(state): State<SharedState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let email = normalize_email(&payload.email).map_err(|_| AuthError::InvalidCredentials)?;
    let credentials = state.db.admins().find_by_email(&email).await?;

    // Unknown emails still pay for a bcrypt round.
    let hasher = state.hasher;
    let senha_hash = credentials.as_ref().map(|c| c.senha_hash.clone());
    let matches = tokio::task::spawn_blocking(move || {
        hasher.verify_account(&payload.senha, senha_hash.as_deref())
    })
    .await
    .map_err(|e| Error::internal(format!("password check task failed: {e}")))?;

    let credentials = match credentials {
        Some(credentials) if matches => credentials,
        Some(_) => {
            tracing::debug!(%email, "Login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }
        None => {
            tracing::debug!(%email, "Login for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let admin = credentials.admin;
    if admin.status != AdminStatus::Ativo {
        return Err(AuthError::PendingApproval.into());
    }

    let session = state.issuer.issue(&admin)?;
    tracing::info!(id = %admin.id, role = %admin.role, "Operator logged in");
    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        usuario: admin,
    }))
}

/// `GET /api/admins`
pub async fn list(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    QueryParams(filter): QueryParams<AdminFilter>,
) -> Result<Json<Vec<Admin>>> {
    user.require(Permission::ManageUsers)?;
    Ok(Json(state.db.admins().list(&filter).await?))
}

/// `PUT /api/admins/{id}/status`
pub async fn set_status(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    PathParam(id): PathParam<AdminId>,
    JsonBody(update): JsonBody<AdminStatusUpdate>,
) -> Result<Json<Admin>> {
    user.require(Permission::ManageUsers)?;
    let admin = state.db.admins().set_status(id, update.status).await?;
    tracing::info!(%id, status = %admin.status, by = %user.email, "Account status changed");
    Ok(Json(admin))
}

/// `PUT /api/admins/{id}/role`
pub async fn set_role(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    PathParam(id): PathParam<AdminId>,
    JsonBody(update): JsonBody<RoleUpdate>,
) -> Result<Json<Admin>> {
    user.require(Permission::ManageUsers)?;
    let admin = state.db.admins().set_role(id, update.role).await?;
    tracing::info!(%id, role = %admin.role, by = %user.email, "Account role changed");
    Ok(Json(admin))
}

/// `DELETE /api/admins/{id}`
pub async fn delete(
    State(state): State<SharedState>,
    user: AuthenticatedUser,
    PathParam(id): PathParam<AdminId>,
) -> Result<StatusCode> {
    user.require(Permission::ManageUsers)?;
    state.db.admins().delete(id).await?;
    tracing::info!(%id, by = %user.email, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

// Runs bcrypt on the blocking pool.
async fn hash_password(hasher: PasswordHasher, senha: String) -> Result<String> {
    let hash = tokio::task::spawn_blocking(move || hasher.hash(&senha))
        .await
        .map_err(|e| Error::internal(format!("password hashing task failed: {e}")))??;
    Ok(hash)
}
