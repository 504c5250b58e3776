// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration loading from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Stellar Scheduler configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Address the bridge server listens on
    pub bridge_addr: SocketAddr,
    /// Maximum number of requests waiting for the dispatcher
    pub dispatch_queue_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional (with defaults):
    /// - `STELLAR_DATABASE_PATH`: SQLite file (default: appointments.db)
    /// - `STELLAR_BRIDGE_PORT`: Bridge port (default: 5555)
    /// - `STELLAR_DISPATCH_QUEUE_CAPACITY`: Dispatch queue bound (default: 64)
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_path = PathBuf::from(
            std::env::var("STELLAR_DATABASE_PATH")
                .unwrap_or_else(|_| "appointments.db".to_string()),
        );

        let bridge_port: u16 = std::env::var("STELLAR_BRIDGE_PORT")
            .unwrap_or_else(|_| "5555".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("STELLAR_BRIDGE_PORT", "must be a valid port number")
            })?;

        let dispatch_queue_capacity: usize = std::env::var("STELLAR_DISPATCH_QUEUE_CAPACITY")
            .unwrap_or_else(|_| "64".to_string())
            .parse()
            .ok()
            .filter(|capacity| *capacity > 0)
            .ok_or(ConfigError::Invalid(
                "STELLAR_DISPATCH_QUEUE_CAPACITY",
                "must be a positive integer",
            ))?;

        Ok(Self {
            database_path,
            bridge_addr: SocketAddr::from(([0, 0, 0, 0], bridge_port)),
            dispatch_queue_capacity,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
