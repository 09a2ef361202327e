//! # vale-storage
//!
//! SQLite persistence for the Vale Palete service.
//!
//! - [`Database`]: pool, migrations and repository accessors
//! - [`AdminRepo`]: operator accounts (unique email, single adm)
//! - [`NamedRepo`]: clients and carriers
//! - [`ValeRepo`]: vouchers with compare-and-set status updates
//!
//! Uniqueness rules are enforced by the schema (unique indexes), not only
//! by the checks performed before inserting.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod admins;
pub mod cadastros;
pub mod database;
pub mod error;
pub mod vales;

pub use admins::{AdminCredentials, AdminRepo};
pub use cadastros::{Named, NamedRepo};
pub use database::{Database, DatabaseConfig};
pub use error::{Error, Result};
pub use vales::ValeRepo;
