//! Gatepass checkout HTTP server.

use anyhow::Context;
use gatepass_gateway::HttpPaymentGateway;
use gatepass_store::{PostgresTicketStore, TicketStore};
use gatepass_web::{build_router, AppState, CheckoutService, Config};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatepass=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Gatepass checkout server");

    // Missing gateway credentials are the one failure allowed to kill
    // startup; everything after this point degrades per-request instead.
    let config = Config::from_env().context("configuration error")?;

    info!("Connecting to ticket store...");
    let store = PostgresTicketStore::connect(&config.database.url, config.database.max_connections)
        .await
        .context("failed to connect to ticket store")?;
    store.migrate().await.context("migration failed")?;
    info!("Ticket store ready");

    let gateway = HttpPaymentGateway::new(
        config.gateway.key_id.clone(),
        config.gateway.key_secret.clone(),
    )
    .context("failed to build gateway client")?;

    let shared_store: Arc<dyn TicketStore> = Arc::new(store.clone());
    let service = Arc::new(CheckoutService::new(
        Arc::clone(&shared_store),
        Arc::new(gateway),
        config.gateway.key_secret.clone(),
        config.gateway.currency.clone(),
    ));

    if config.admin_token.is_none() {
        warn!("ADMIN_API_TOKEN not set; GET /tickets will answer 401");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep_handle = gatepass_web::sweep::spawn(
        shared_store,
        Duration::from_secs(config.sweep.interval_secs),
        Duration::from_secs(config.sweep.pending_ttl_secs),
        shutdown_rx,
    );

    let state = AppState::new(service, config.gateway.key_id.clone(), config.admin_token);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shutting down");
    let _ = shutdown_tx.send(true);
    let _ = sweep_handle.await;
    store.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
    }
}
