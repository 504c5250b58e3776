// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Stellar Gateway - HTTP front end
//!
//! Exposes the appointment operations over HTTP/JSON and forwards each one as a
//! single request over the bridge to `stellar-scheduler`.
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | `POST` | `/schedule` | `{"p_id", "patient", "date", "time"}` |
//! | `POST` | `/cancel` | `{"appointment_id"}` |
//! | `GET` | `/view_today` | |
//! | `GET` | `/view_all` | |
//! | `GET` | `/health` | |
//!
//! Scheduler replies are returned unchanged with status 200. Missing keys give
//! 400, a scheduler fault 500, and an unreachable bridge 502.

#![deny(missing_docs)]

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use stellar_protocol::BridgeClient;

/// Configuration loaded from environment variables.
pub mod config;

/// HTTP error mapping.
pub mod error;

/// Route handlers.
pub mod routes;

pub use config::Config;
pub use error::GatewayError;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The single bridge connection to the scheduler.
    pub bridge: Arc<BridgeClient>,
}

impl AppState {
    /// Wrap a bridge client.
    pub fn new(bridge: BridgeClient) -> Self {
        Self {
            bridge: Arc::new(bridge),
        }
    }
}

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/schedule", post(routes::schedule))
        .route("/cancel", post(routes::cancel))
        .route("/view_today", get(routes::view_today))
        .route("/view_all", get(routes::view_all))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the gateway on an already bound listener until the server fails.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "Gateway HTTP server listening");
    axum::serve(listener, router(state)).await
}
