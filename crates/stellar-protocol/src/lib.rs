// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Stellar Protocol - the bridge between gateway and scheduler
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     stellar-protocol                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Envelopes: RequestEnvelope -> Request, Reply               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Framing: length + type header, JSON payload                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Transport: TCP (tokio), one outstanding request            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use stellar_protocol::{BridgeClient, Request, RequestEnvelope};
//!
//! let client = BridgeClient::for_addr("127.0.0.1:5555".parse()?);
//! let reply = client
//!     .request(&RequestEnvelope::from(Request::ViewAll))
//!     .await?;
//! ```

pub mod client;
pub mod envelope;
pub mod frame;
pub mod server;

pub use client::{BridgeClient, BridgeClientConfig, ClientError};
pub use envelope::{Appointment, Reply, Request, RequestEnvelope, RequestError, Status};
pub use frame::{Frame, FrameError, FramedStream, MessageType};
pub use server::{BridgeServer, ConnectionHandler, ServerError};
