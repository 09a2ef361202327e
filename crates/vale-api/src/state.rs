//! Shared application state.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use vale_auth::{PasswordHasher, TokenIssuer};
use vale_core::{RegistrationRules, StatusPolicy};
use vale_storage::Database;

use crate::config::AppConfig;

/// Everything handlers need, shared behind an `Arc`.
#[derive(Debug)]
pub struct AppState {
    /// Database handle
    pub db: Database,
    /// Effective configuration
    pub config: AppConfig,
    /// Voucher status rules
    pub policy: StatusPolicy,
    /// Password hashing
    pub hasher: PasswordHasher,
    /// Session token signing
    pub issuer: TokenIssuer,
    /// Registration rules
    pub registration: RegistrationRules,
}

/// State handle stored in the router.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Builds state from an open database and a loaded config.
    pub fn new(db: Database, config: AppConfig) -> SharedState {
        let policy = StatusPolicy::new(config.vales.due_soon_days);
        let hasher = PasswordHasher::new(config.auth.bcrypt_cost);
        let issuer = TokenIssuer::from_config(&config.auth);
        let registration = config.registration_rules();

        Arc::new(Self {
            db,
            config,
            policy,
            hasher,
            issuer,
            registration,
        })
    }

    /// The business date, in the server's local time zone.
    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    /// Expires overdue vouchers. Called before reads so responses never
    /// show a stale `acumulado`.
    pub async fn sweep_overdue(&self) -> crate::Result<u64> {
        Ok(self.db.vales().expire_overdue(self.today()).await?)
    }
}
