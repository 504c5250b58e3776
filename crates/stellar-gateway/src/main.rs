// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Stellar Gateway - HTTP front end
//!
//! Connects to the scheduler bridge and serves the appointment API until
//! interrupted.

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use stellar_gateway::{AppState, Config};
use stellar_protocol::BridgeClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from crate directory or parent directories)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stellar_gateway=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting Stellar Gateway");

    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!(
        http_addr = %config.http_addr,
        bridge_addr = %config.bridge_addr,
        bridge_timeout_ms = config.bridge_timeout.map(|t| t.as_millis() as u64),
        "Configuration loaded"
    );

    let bridge = BridgeClient::new(config.bridge_client_config());
    // The scheduler may start later; requests connect lazily.
    if let Err(e) = bridge.connect().await {
        warn!("Scheduler bridge not reachable yet: {}", e);
    }
    let state = AppState::new(bridge);

    let listener = TcpListener::bind(config.http_addr)
        .await
        .context("failed to bind gateway HTTP server")?;

    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = stellar_gateway::serve(listener, server_state).await {
            error!("Gateway HTTP server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    server_handle.abort();
    state.bridge.close().await;
    info!("Shutdown complete");

    Ok(())
}
