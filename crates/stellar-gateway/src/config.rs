// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration loading from environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use stellar_protocol::BridgeClientConfig;

/// Stellar Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server listens on
    pub http_addr: SocketAddr,
    /// Scheduler bridge address
    pub bridge_addr: SocketAddr,
    /// Bridge reply timeout; `None` waits indefinitely
    pub bridge_timeout: Option<Duration>,
    /// TCP connect timeout for the bridge
    pub connect_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional (with defaults):
    /// - `STELLAR_GATEWAY_PORT`: HTTP port (default: 5678)
    /// - `STELLAR_BRIDGE_ADDR`: Scheduler bridge address (default: 127.0.0.1:5555)
    /// - `STELLAR_BRIDGE_TIMEOUT_MS`: Reply timeout, 0 disables (default: 0)
    /// - `STELLAR_CONNECT_TIMEOUT_MS`: Connect timeout (default: 10000)
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_port: u16 = std::env::var("STELLAR_GATEWAY_PORT")
            .unwrap_or_else(|_| "5678".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("STELLAR_GATEWAY_PORT", "must be a valid port number")
            })?;

        let bridge_addr: SocketAddr = std::env::var("STELLAR_BRIDGE_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5555".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("STELLAR_BRIDGE_ADDR", "must be a valid socket address")
            })?;

        let bridge_timeout_ms = parse_millis("STELLAR_BRIDGE_TIMEOUT_MS", "0")?;
        let connect_timeout_ms = parse_millis("STELLAR_CONNECT_TIMEOUT_MS", "10000")?;

        Ok(Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], http_port)),
            bridge_addr,
            bridge_timeout: (bridge_timeout_ms > 0).then(|| Duration::from_millis(bridge_timeout_ms)),
            connect_timeout: Duration::from_millis(connect_timeout_ms),
        })
    }

    /// Bridge client settings derived from this configuration.
    pub fn bridge_client_config(&self) -> BridgeClientConfig {
        BridgeClientConfig {
            server_addr: self.bridge_addr,
            connect_timeout: self.connect_timeout,
            request_timeout: self.bridge_timeout,
        }
    }
}

fn parse_millis(var: &'static str, default: &str) -> Result<u64, ConfigError> {
    std::env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| ConfigError::Invalid(var, "must be a number of milliseconds"))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
