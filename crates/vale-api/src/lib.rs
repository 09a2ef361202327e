//! # vale-api
//!
//! HTTP API for the Vale Palete service.
//!
//! - [`router`]: the axum router with every endpoint
//! - [`serve`]: binds, runs the expiry sweeper and shuts down on signals
//! - [`AppConfig`]: layered TOML + environment configuration
//! - [`Error`]: API errors and their `{"error": ...}` responses

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod views;

pub use auth::SessionValidator;
pub use config::AppConfig;
pub use error::{Error, Result};
pub use routes::router;
pub use server::{serve, spawn_expiry_sweeper};
pub use state::{AppState, SharedState};
