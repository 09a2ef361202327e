//! Server lifecycle: startup, the expiry sweeper and graceful shutdown.

use std::time::Duration;

use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use vale_storage::Database;

use crate::config::AppConfig;
use crate::error::Result;
use crate::routes::router;
use crate::state::{AppState, SharedState};

/// Connects, migrates and serves until Ctrl+C or SIGTERM.
pub async fn serve(config: AppConfig) -> Result<()> {
    if !config.auth.enabled {
        warn!("Authentication is disabled; every request runs as adm");
    } else if config.auth.uses_dev_secret() {
        warn!("Using the development JWT secret; set auth.jwt_secret");
    }

    info!(url = %config.database.url, "Opening database");
    let db = Database::connect(&config.database).await?;
    db.migrate().await?;

    let state = AppState::new(db.clone(), config);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = spawn_expiry_sweeper(state.clone(), shutdown_rx);

    let address = state.config.server.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    let _ = shutdown_tx.send(true);
    if let Some(handle) = sweeper {
        if let Err(e) = handle.await {
            warn!(error = %e, "Expiry sweeper did not stop cleanly");
        }
    }
    db.close().await;
    Ok(())
}

/// Starts the periodic overdue sweep, unless `vales.expiry_sweep_secs` is 0.
///
/// The first sweep runs immediately. The task ends when `shutdown` flips.
pub fn spawn_expiry_sweeper(
    state: SharedState,
    mut shutdown: watch::Receiver<bool>,
) -> Option<JoinHandle<()>> {
    let secs = state.config.vales.expiry_sweep_secs;
    if secs == 0 {
        info!("Expiry sweeper disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(every_secs = secs, "Expiry sweeper started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = state.sweep_overdue().await {
                        warn!(error = %e, "Expiry sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Expiry sweeper stopped");
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
