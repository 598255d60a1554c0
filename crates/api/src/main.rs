//! `cron-trigger-server` -- launches registered cron scripts on demand.
//!
//! Listens on loopback for `POST /trigger {"cronName": "..."}` and starts the
//! matching script detached from the request, with its output appended to
//! `$LOG_DIR/<cronName>.log`. See [`ServerConfig::from_env`] for settings.

use std::sync::Arc;

use cron_trigger_api::config::ServerConfig;
use cron_trigger_api::dispatcher::Dispatcher;
use cron_trigger_api::state::AppState;
use cron_trigger_api::{logging, router};
use cron_trigger_core::registry::JobRegistry;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Configuration comes first: it names the activity log.
    let config = ServerConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    });

    let log_dir_result = std::fs::create_dir_all(&config.log_dir);

    // --- Tracing ---
    logging::init(&config.activity_log_file);

    if let Err(e) = log_dir_result {
        tracing::warn!(
            log_dir = %config.log_dir.display(),
            error = %e,
            "Cannot create log directory, job launches will fail",
        );
    }

    // --- Job registry ---
    let registry = match &config.registry_file {
        Some(path) => JobRegistry::load(path, &config.scripts_dir).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to load job registry");
            std::process::exit(1);
        }),
        None => JobRegistry::builtin(&config.scripts_dir),
    };

    let addr = config.socket_addr();
    tracing::info!(%addr, "Cron Trigger Server starting");
    tracing::info!(scripts_dir = %config.scripts_dir.display(), "Scripts directory");
    tracing::info!(log_file = %config.activity_log_file.display(), "Activity log");
    tracing::info!(count = registry.len(), "Crons configured");
    for job in registry.iter() {
        tracing::debug!(
            cron = %job.name,
            path = %job.path().display(),
            "Registered cron",
        );
    }

    // --- App state ---
    let registry = Arc::new(registry);
    let dispatcher = Dispatcher::from_config(&config, registry);
    let state = AppState {
        config: Arc::new(config),
        dispatcher: Arc::new(dispatcher),
    };

    let app = router::build_app_router(state);

    // --- Start server ---
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(%addr, error = %e, "Failed to bind to address");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix). Launched jobs live
/// in their own process groups and keep running after shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
