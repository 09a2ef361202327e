//! Connection pool and migrations.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::admins::AdminRepo;
use crate::cadastros::NamedRepo;
use crate::error::Result;
use crate::vales::ValeRepo;
use vale_core::{Cliente, Transportadora};

/// Database settings (`[database]` section of the config file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite://valepalete.db` or `sqlite::memory:`
    pub url: String,
    /// Pool size
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://valepalete.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Handle to the service database.
///
/// Cloning is cheap; all clones share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database described by `config`.
    ///
    /// Migrations are not applied; call [`Database::migrate`].
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await?;

        tracing::debug!(url = %config.url, "Connected to database");
        Ok(Self { pool })
    }

    /// A fresh, migrated in-memory database.
    ///
    /// Uses a single connection that never expires, since every SQLite
    /// in-memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Operator accounts.
    pub fn admins(&self) -> AdminRepo<'_> {
        AdminRepo::new(&self.pool)
    }

    /// Clients.
    pub fn clientes(&self) -> NamedRepo<'_, Cliente> {
        NamedRepo::new(&self.pool)
    }

    /// Carriers.
    pub fn transportadoras(&self) -> NamedRepo<'_, Transportadora> {
        NamedRepo::new(&self.pool)
    }

    /// Vouchers.
    pub fn vales(&self) -> ValeRepo<'_> {
        ValeRepo::new(&self.pool)
    }

    /// Checks that the database answers.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
