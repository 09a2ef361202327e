//! What each operator tier may do.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Role;

/// An action class guarded by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Permission {
    /// Read vouchers, clients, carriers and the dashboard.
    Read,
    /// Create and settle vouchers, upload proofs, register clients and
    /// carriers.
    ManageVales,
    /// Delete clients and carriers.
    ManageCadastros,
    /// Approve, promote and remove operator accounts.
    ManageUsers,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "read",
            Self::ManageVales => "manageVales",
            Self::ManageCadastros => "manageCadastros",
            Self::ManageUsers => "manageUsers",
        };
        f.write_str(name)
    }
}

impl Role {
    /// Whether this tier grants `permission`.
    pub fn allows(&self, permission: Permission) -> bool {
        match self {
            Role::Adm => true,
            Role::Supervisor => matches!(permission, Permission::Read | Permission::ManageVales),
            Role::Consultor => permission == Permission::Read,
        }
    }
}
