//! Vale Palete CLI
//!
//! Runs the HTTP server and a few maintenance commands.

mod cli;
mod config_handlers;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vale_api::{AppConfig, AppState};
use vale_storage::Database;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let command = match cli.command {
        Command::Config { action } => {
            return config_handlers::handle_config_command(config_path, action)
                .context("config command failed");
        }
        command => command,
    };

    let config = AppConfig::load(config_path).context("failed to load configuration")?;
    init_logging(&config.logging.filter);

    match command {
        Command::Serve => vale_api::serve(config).await.context("server failed")?,
        Command::Migrate => {
            let db = open_database(&config).await?;
            db.close().await;
            println!("Migrations applied to {}", config.database.url);
        }
        Command::Expire => {
            let db = open_database(&config).await?;
            let state = AppState::new(db.clone(), config);
            let expired = state.sweep_overdue().await.context("expiry sweep failed")?;
            db.close().await;
            println!("{expired} vale(s) marked vencido");
        }
        Command::Config { .. } => {}
    }

    Ok(())
}

/// `RUST_LOG` wins over `logging.filter`.
fn init_logging(filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}

async fn open_database(config: &AppConfig) -> Result<Database> {
    let db = Database::connect(&config.database)
        .await
        .with_context(|| format!("failed to open {}", config.database.url))?;
    db.migrate().await.context("failed to apply migrations")?;
    Ok(db)
}
