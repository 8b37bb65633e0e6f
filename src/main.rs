//! pi-gateway server entry point.
//!
//! Loads configuration, selects the mock payment store backend and
//! starts the Axum HTTP server.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use pi_gateway::api;
use pi_gateway::app_state::AppState;
use pi_gateway::config::{GatewayConfig, LogFormat, StoreBackend};
use pi_gateway::persistence::{InMemoryPaymentStore, PaymentStore, PostgresPaymentStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env().context("loading configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(
        addr = %config.listen_addr,
        upstream = %config.pi_api_base_url,
        sandbox = config.sandbox,
        "starting pi-gateway"
    );
    if config.pi_api_key.is_none() {
        tracing::warn!("PI_API_KEY not set; payment and verify endpoints will answer 500");
    }

    // Build persistence layer
    let store: Arc<dyn PaymentStore> = match (config.store_backend, config.database_url.as_deref()) {
        (StoreBackend::Postgres, Some(url)) => Arc::new(
            PostgresPaymentStore::connect(
                url,
                config.database_max_connections,
                config.database_connect_timeout_secs,
            )
            .await
            .context("connecting to postgres")?,
        ),
        (StoreBackend::Postgres, None) => anyhow::bail!("DATABASE_URL not configured"),
        (StoreBackend::Memory, _) => Arc::new(InMemoryPaymentStore::new()),
    };

    // Build application state and router
    let listen_addr = config.listen_addr;
    let app_state = AppState::new(config, store).context("building application state")?;
    let app = api::build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("binding {listen_addr}"))?;
    tracing::info!(addr = %listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
