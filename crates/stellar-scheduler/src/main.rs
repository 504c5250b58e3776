// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Stellar Scheduler - appointment worker
//!
//! Opens the appointment store, starts the dispatch loop and serves the bridge
//! until interrupted.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use stellar_protocol::BridgeServer;
use stellar_scheduler::config::Config;
use stellar_scheduler::server;
use stellar_scheduler::{DispatchQueue, Dispatcher, SqliteStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from crate directory or parent directories)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stellar_scheduler=info".parse()?),
        )
        .init();

    info!("Starting Stellar Scheduler");

    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!(
        database = %config.database_path.display(),
        bridge_addr = %config.bridge_addr,
        queue_capacity = config.dispatch_queue_capacity,
        "Configuration loaded"
    );

    let store = SqliteStore::from_path(&config.database_path).await?;
    let dispatcher = Dispatcher::new(Arc::new(store.clone()));
    let (handle, dispatch_task) = DispatchQueue::spawn(dispatcher, config.dispatch_queue_capacity);

    let bridge = BridgeServer::bind(config.bridge_addr).await?;
    let bridge_handle = tokio::spawn(async move {
        if let Err(e) = server::run_bridge_server(bridge, handle).await {
            error!("Bridge server error: {}", e);
        }
    });

    info!("Stellar Scheduler initialized successfully");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    bridge_handle.abort();
    dispatch_task.abort();

    store.close().await;
    info!("Shutdown complete");

    Ok(())
}
