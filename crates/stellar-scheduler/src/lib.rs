// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Stellar Scheduler - appointment worker
//!
//! The scheduler is the back tier of Stellar. It owns the appointment store and
//! answers request envelopes sent by the gateway over the bridge.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────┐
//! │    stellar-gateway    │
//! │  HTTP/JSON, port 5678 │
//! └───────────────────────┘
//!           │
//!           │ Bridge (TCP, port 5555)
//!           ▼
//! ┌───────────────────────┐      ┌───────────────────────┐
//! │  Bridge server        │─────►│  Dispatch queue       │
//! │  (one task per conn)  │      │  (bounded, FIFO)      │
//! └───────────────────────┘      └───────────────────────┘
//!                                           │
//!                                           ▼
//!                                ┌───────────────────────┐
//!                                │  Dispatcher           │
//!                                │  (single writer)      │
//!                                └───────────────────────┘
//!                                           │
//!                                           ▼
//!                                ┌───────────────────────┐
//!                                │  SQLite               │
//!                                │  appointments.db      │
//!                                └───────────────────────┘
//! ```
//!
//! # Actions
//!
//! | Action | Reply |
//! |--------|-------|
//! | `schedule` | `{"status":"success","appointment_id":N}` |
//! | `cancel` | `{"status":"success","message":"Appointment N canceled."}` |
//! | `view_today` | `{"appointments":[...]}` for the current local date |
//! | `view_all` | `{"appointments":[...]}` |
//!
//! Anything else yields `{"status":"error","message":"Invalid action."}`.

#![deny(missing_docs)]

/// Configuration loaded from environment variables.
pub mod config;

/// Request validation and action handlers.
pub mod dispatcher;

/// Error types for infrastructure faults.
pub mod error;

/// Embedded schema migrations.
pub mod migrations;

/// Appointment storage trait and the SQLite backend.
pub mod persistence;

/// Single-consumer work queue in front of the dispatcher.
pub mod queue;

/// Bridge server that feeds the dispatch queue.
pub mod server;

pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::SchedulerError;
pub use persistence::{AppointmentStore, SqliteStore};
pub use queue::{DispatchHandle, DispatchQueue};
