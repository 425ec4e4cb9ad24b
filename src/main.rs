//! # CareData Backend
//!
//! Backend-for-frontend of the CareData health-records web app.
//!
//! ## What it does
//! - Verifies Cognito id tokens against the user pool's published key set
//! - Keeps a profile and a three-section health record per caller
//! - Extracts structured health data from a photo of a medical document
//!   using a vision-capable model

mod app; // Router and outer layers
mod config; // Environment configuration
mod db; // Profile and health-record stores
mod error; // Error types and HTTP mapping
mod handlers; // Route handlers
mod identity; // Token verification and profile resolution
mod middleware; // Bearer-token guard
mod scan; // Document image extraction
mod state; // Shared application state

use crate::config::Config;
use crate::state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default filter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,caredata_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded: {:?}", config);

    let app_state = AppState::new(&config).await?;
    tracing::info!("Application state initialized");

    let app = app::router(app_state);

    let bind_addr = config.bind_address();
    tracing::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
