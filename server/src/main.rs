//! FxQuote Server Binary
//!
//! Serves retail FX quotes priced from the upstream mid-market rate source.

use std::sync::Arc;

use tracing::{error, info};

use fxquote_fx::{HttpRateProvider, Pricer};
use fxquote_server::{app_router, telemetry::init_tracing, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::from_env();

    // Initialize logging
    init_tracing(config.log_format);

    info!("Starting FxQuote Server");

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let addr = config.socket_addr().map_err(|e| anyhow::anyhow!(e))?;

    let provider = Arc::new(HttpRateProvider::new(config.upstream.clone())?);
    let pricer = Pricer::new(provider, config.pricer.clone());
    let state = Arc::new(AppState::new(pricer));

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        listen_addr = %addr,
        upstream = %config.upstream.base_url,
        margin = %config.pricer.margin,
        "Server running"
    );

    axum::serve(listener, app_router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl+C");
            }
            info!("Shutdown signal received");
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
