#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Vale Core
//!
//! Domain types, validation, and the voucher status policy shared by every
//! Vale Palete crate. It has no internal dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`ids`]: Typed UUID identifiers
//! - [`model`]: Entities and their input payloads
//! - [`status`]: Voucher lifecycle policy
//! - [`permission`]: Role-based permissions
//! - [`attachment`]: Proof file decoding
//! - [`stats`]: Dashboard aggregation

pub mod attachment;
pub mod error;
pub mod ids;
pub mod model;
pub mod permission;
pub mod stats;
pub mod status;

mod proptests;

// Re-exports for convenience
pub use attachment::{Attachment, DecodedFile};
pub use error::{Error, Result};
pub use ids::{AdminId, ClienteId, TransportadoraId, ValeId};
pub use model::{
    Admin, AdminFilter, AdminStatus, Cliente, NewAdmin, NewCliente, NewTransportadora, NewVale,
    RegistrationRules, Role, Transportadora, Vale, ValeFilter, normalize_email,
};
pub use permission::Permission;
pub use stats::{DashboardStats, MonthlyStats};
pub use status::{PolicyViolation, ProcessMode, StatusPolicy, Urgencia, ValeStatus};
