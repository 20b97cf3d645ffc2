//! pegawai-functions: admin-only callable functions for pegawai accounts
//!
//! Serves `createEmployee`, `updateEmployee` and `deleteEmployee`:
//! - Verifies the caller's Firebase ID token and requires the `admin` role
//! - Writes the account to Firebase Authentication
//! - Writes the profile document to Cloud Firestore

mod api;
mod auth;
mod config;
mod error;
mod google;
mod identity;
mod pegawai;
mod profiles;
mod state;
#[cfg(test)]
mod testing;

use config::Config;
use error::BoxError;
use state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    init_tracing(config.log_json);

    tracing::info!(
        environment = %config.environment,
        project = %config.project_id,
        "Starting pegawai-functions"
    );

    let state = AppState::from_config(&config)?;
    let app = api::build_app(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("pegawai-functions listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pegawai_functions=info,pegawai=info,tower_http=info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Graceful shutdown handler
///
/// Listens for SIGTERM (Cloud Run) and Ctrl+C signals
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
