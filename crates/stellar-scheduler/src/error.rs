// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for stellar-scheduler.
//!
//! Expected request failures (missing fields, unknown action, unknown
//! appointment) are not errors here: they become structured replies. These
//! variants cover infrastructure faults that end the current request.

use std::fmt;

/// Infrastructure errors raised while serving a request.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SchedulerError {
    /// Database operation failed.
    DatabaseError {
        /// The operation that failed.
        operation: String,
        /// Error details.
        details: String,
    },

    /// The dispatch loop is no longer running.
    DispatcherStopped,

    /// Bridge transport failed.
    BridgeError {
        /// Error details.
        details: String,
    },
}

impl SchedulerError {
    /// Build a database error for the given operation.
    pub fn database(operation: &str, details: impl fmt::Display) -> Self {
        Self::DatabaseError {
            operation: operation.to_string(),
            details: details.to_string(),
        }
    }

    /// Get the error code string for this error type.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DatabaseError { .. } => "DATABASE_ERROR",
            Self::DispatcherStopped => "DISPATCHER_STOPPED",
            Self::BridgeError { .. } => "BRIDGE_ERROR",
        }
    }
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatabaseError { operation, details } => {
                write!(f, "Database error during '{}': {}", operation, details)
            }
            Self::DispatcherStopped => write!(f, "Dispatcher is not running"),
            Self::BridgeError { details } => write!(f, "Bridge error: {}", details),
        }
    }
}

impl std::error::Error for SchedulerError {}

impl From<sqlx::Error> for SchedulerError {
    fn from(err: sqlx::Error) -> Self {
        SchedulerError::database("query", err)
    }
}

impl From<sqlx::migrate::MigrateError> for SchedulerError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        SchedulerError::database("migrate", err)
    }
}

impl From<stellar_protocol::ServerError> for SchedulerError {
    fn from(err: stellar_protocol::ServerError) -> Self {
        SchedulerError::BridgeError {
            details: err.to_string(),
        }
    }
}
