//! LocaTour terminal client
//!
//! Session-scoped chat and routing client for the LocaTour
//! travel-recommendation backend.

mod api;
mod format;
mod geo;
mod location;
mod repl;
mod route_flow;
mod session;
mod workflow;

use api::ApiClient;
use location::{EnvLocationProvider, LocationProvider};
use session::SqliteSessionStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workflow::Workflows;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stderr so the REPL owns stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "locatour=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    // Configuration
    let api_url =
        std::env::var("LOCATOUR_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());

    let db_path = std::env::var("LOCATOUR_DB_PATH").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.locatour/locatour.db")
    });

    // Ensure session store directory exists
    if let Some(parent) = PathBuf::from(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %db_path, "Opening session store");
    let sessions = Arc::new(SqliteSessionStore::open(&db_path)?);

    let api = Arc::new(ApiClient::new(&api_url));

    // Liveness probe; the client still starts when the backend is down so
    // the user sees normalized errors instead of a refused prompt.
    match api.health_check().await {
        Ok(_) => tracing::info!(url = %api_url, "Backend reachable"),
        Err(e) => tracing::warn!(url = %api_url, error = %e, "Backend not reachable"),
    }

    let provider = EnvLocationProvider::new();
    if provider.is_available() {
        tracing::info!(
            permission = ?provider.check_permission().await,
            "Location provider ready"
        );
    } else {
        tracing::warn!(
            "No location fix configured. Set {} and {} to use /route and /nearby.",
            EnvLocationProvider::LAT_VAR,
            EnvLocationProvider::LON_VAR,
        );
    }

    let workflows = Workflows::new(api, sessions, Arc::new(provider));
    repl::run(&workflows).await?;

    Ok(())
}
