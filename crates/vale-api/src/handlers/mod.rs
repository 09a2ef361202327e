//! Route handlers, one module per resource.

pub mod admins;
pub mod cadastros;
pub mod dashboard;
pub mod health;
pub mod vales;
