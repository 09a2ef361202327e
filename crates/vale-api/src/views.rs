//! Request and response bodies that are not plain domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use vale_core::{Admin, AdminStatus, ProcessMode, Role, StatusPolicy, Urgencia, Vale, ValeStatus};

/// A voucher with its computed fields.
///
/// `urgencia` is only set for open vouchers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValeView {
    /// Stored voucher
    #[serde(flatten)]
    pub vale: Vale,
    /// Due-date urgency
    pub urgencia: Option<Urgencia>,
    /// `quantidade * valorUnitario`
    pub valor_total: f64,
}

impl ValeView {
    /// Decorates `vale` as seen on `today`.
    pub fn new(vale: Vale, policy: &StatusPolicy, today: NaiveDate) -> Self {
        let urgencia = (policy.effective_status(&vale, today) == ValeStatus::Acumulado)
            .then(|| policy.urgencia(vale.data_vencimento, today));
        let valor_total = vale.valor_total();
        Self {
            vale,
            urgencia,
            valor_total,
        }
    }
}

/// `POST /api/admins/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plaintext password
    pub senha: String,
}

/// Successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token
    pub token: String,
    /// Token expiry
    pub expires_at: DateTime<Utc>,
    /// The account that logged in
    pub usuario: Admin,
}

/// `PUT /api/admins/{id}/status`
#[derive(Debug, Clone, Deserialize)]
pub struct AdminStatusUpdate {
    /// New approval state
    pub status: AdminStatus,
}

/// `PUT /api/admins/{id}/role`
#[derive(Debug, Clone, Deserialize)]
pub struct RoleUpdate {
    /// New tier
    pub role: Role,
}

/// `PUT /api/vales/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct ValeStatusUpdate {
    /// Requested status
    pub status: ValeStatus,
}

/// `POST /api/vales/{id}/processar`
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessRequest {
    /// How the voucher is settled
    pub modo: ProcessMode,
}

/// `POST /api/vales/expirar`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpireResponse {
    /// Vouchers moved to `vencido`
    pub expirados: u64,
}

/// `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
    /// Whether the database answered
    pub database: bool,
}
