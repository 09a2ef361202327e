//! Voucher lifecycle policy.
//!
//! A voucher starts `acumulado`. It becomes `vencido` once its due date is
//! in the past, or `processado` when an operator settles it. Both are
//! terminal. Every status change in the service goes through
//! [`StatusPolicy`]; no caller compares dates on its own.
//!
//! Settling comes in two flavours ([`ProcessMode`]):
//!
//! - `Baixa`: the proof file has been uploaded, the voucher can be closed.
//! - `ContatoCliente`: the voucher is about to expire and the client was
//!   contacted directly, no file required.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::Vale;

/// Days before the due date during which a voucher counts as "due soon".
pub const DEFAULT_DUE_SOON_DAYS: i64 = 3;

// ============================================================================
// ValeStatus
// ============================================================================

/// Lifecycle state of a voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValeStatus {
    /// Open, waiting to be settled.
    Acumulado,
    /// Settled.
    Processado,
    /// Past its due date without being settled.
    Vencido,
}

impl ValeStatus {
    /// All states, in lifecycle order.
    pub const ALL: [ValeStatus; 3] = [Self::Acumulado, Self::Processado, Self::Vencido];

    /// Stored/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acumulado => "acumulado",
            Self::Processado => "processado",
            Self::Vencido => "vencido",
        }
    }

    /// Returns `true` if no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Processado | Self::Vencido)
    }
}

impl fmt::Display for ValeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValeStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "acumulado" => Ok(Self::Acumulado),
            "processado" => Ok(Self::Processado),
            "vencido" => Ok(Self::Vencido),
            other => Err(Error::unknown_value("status", other)),
        }
    }
}

// ============================================================================
// Urgencia
// ============================================================================

/// How close an open voucher is to its due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Urgencia {
    /// More than the due-soon window away.
    NoPrazo,
    /// Within the due-soon window (inclusive), not yet overdue.
    VenceEmBreve,
    /// Due date already passed.
    Vencido,
}

// ============================================================================
// ProcessMode
// ============================================================================

/// How an operator settles a voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProcessMode {
    /// Settle against the uploaded proof file.
    Baixa,
    /// Settle after contacting the client about an imminent due date.
    ContatoCliente,
}

// ============================================================================
// PolicyViolation
// ============================================================================

/// Reasons the policy refuses a transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PolicyViolation {
    /// The voucher is no longer open.
    #[error("vale is already {0}")]
    NotOpen(ValeStatus),

    /// `Baixa` needs the proof file first.
    #[error("vale has no attached file")]
    MissingAttachment,

    /// `ContatoCliente` is reserved for vouchers about to expire.
    #[error("vale is not due within {days} days")]
    NotDueSoon {
        /// The configured due-soon window
        days: i64,
    },

    /// Manual expiry of a voucher whose due date has not passed.
    #[error("vale is not overdue yet")]
    NotOverdue,

    /// Any move out of a terminal state, or back to acumulado.
    #[error("transition {from} -> {to} is not allowed")]
    Forbidden {
        /// Current status
        from: ValeStatus,
        /// Requested status
        to: ValeStatus,
    },
}

// ============================================================================
// StatusPolicy
// ============================================================================

/// The single home of voucher status rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPolicy {
    due_soon_days: i64,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self {
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
        }
    }
}

impl StatusPolicy {
    /// Creates a policy with a custom due-soon window (negative values are
    /// clamped to zero).
    pub fn new(due_soon_days: i64) -> Self {
        Self {
            due_soon_days: due_soon_days.max(0),
        }
    }

    /// The due-soon window in days.
    pub fn due_soon_days(&self) -> i64 {
        self.due_soon_days
    }

    /// A voucher is overdue the day after its due date.
    pub fn is_overdue(&self, due: NaiveDate, today: NaiveDate) -> bool {
        due < today
    }

    /// Classifies how close `due` is relative to `today`.
    pub fn urgencia(&self, due: NaiveDate, today: NaiveDate) -> Urgencia {
        let days = (due - today).num_days();
        if days < 0 {
            Urgencia::Vencido
        } else if days <= self.due_soon_days {
            Urgencia::VenceEmBreve
        } else {
            Urgencia::NoPrazo
        }
    }

    /// The status a voucher should have on `today`, regardless of whether
    /// the stored row has caught up yet.
    pub fn effective_status(&self, vale: &Vale, today: NaiveDate) -> ValeStatus {
        match vale.status {
            ValeStatus::Acumulado if self.is_overdue(vale.data_vencimento, today) => {
                ValeStatus::Vencido
            }
            status => status,
        }
    }

    /// Status assigned to a voucher being created on `today`.
    pub fn initial_status(&self, due: NaiveDate, today: NaiveDate) -> ValeStatus {
        if self.is_overdue(due, today) {
            ValeStatus::Vencido
        } else {
            ValeStatus::Acumulado
        }
    }

    /// Checks that `vale` can be settled with `mode`.
    ///
    /// Returns the target status on success.
    pub fn check_process(
        &self,
        vale: &Vale,
        mode: ProcessMode,
        today: NaiveDate,
    ) -> Result<ValeStatus, PolicyViolation> {
        let current = self.effective_status(vale, today);
        if current != ValeStatus::Acumulado {
            return Err(PolicyViolation::NotOpen(current));
        }

        match mode {
            ProcessMode::Baixa => {
                if !vale.has_attachment() {
                    return Err(PolicyViolation::MissingAttachment);
                }
            }
            ProcessMode::ContatoCliente => {
                if self.urgencia(vale.data_vencimento, today) != Urgencia::VenceEmBreve {
                    return Err(PolicyViolation::NotDueSoon {
                        days: self.due_soon_days,
                    });
                }
            }
        }

        Ok(ValeStatus::Processado)
    }

    /// Checks a generic status update (`PUT /vales/{id}` with a status).
    ///
    /// Returns `Ok(None)` when the voucher already has the requested status.
    pub fn check_transition(
        &self,
        vale: &Vale,
        to: ValeStatus,
        today: NaiveDate,
    ) -> Result<Option<ValeStatus>, PolicyViolation> {
        let from = vale.status;
        if from == to {
            return Ok(None);
        }
        if from.is_terminal() {
            return Err(PolicyViolation::Forbidden { from, to });
        }

        match (from, to) {
            (ValeStatus::Acumulado, ValeStatus::Processado) => self
                .check_process(vale, ProcessMode::Baixa, today)
                .map(Some),
            (ValeStatus::Acumulado, ValeStatus::Vencido) => {
                if self.is_overdue(vale.data_vencimento, today) {
                    Ok(Some(ValeStatus::Vencido))
                } else {
                    Err(PolicyViolation::NotOverdue)
                }
            }
            (from, to) => Err(PolicyViolation::Forbidden { from, to }),
        }
    }

    /// Files can only be attached to open vouchers.
    pub fn check_attach(&self, vale: &Vale, today: NaiveDate) -> Result<(), PolicyViolation> {
        match self.effective_status(vale, today) {
            ValeStatus::Acumulado => Ok(()),
            other => Err(PolicyViolation::NotOpen(other)),
        }
    }
}
