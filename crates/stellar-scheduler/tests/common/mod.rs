// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Common test infrastructure for stellar-scheduler E2E tests.
//!
//! Provides TestContext for setting up a file-backed store, the dispatch loop,
//! the bridge server and a connected client.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;
use tokio::task::JoinHandle;

use stellar_protocol::{BridgeClient, BridgeServer, Reply, Request, RequestEnvelope};
use stellar_scheduler::server::run_bridge_server;
use stellar_scheduler::{DispatchQueue, Dispatcher, SqliteStore};

/// "Today" as seen by the dispatcher in every test context.
pub const TODAY: &str = "2025-02-25";

/// Test context that manages the store, servers and a bridge client.
pub struct TestContext {
    pub client: BridgeClient,
    pub server_addr: SocketAddr,
    pub store: SqliteStore,
    server_task: JoinHandle<()>,
    dispatch_task: JoinHandle<()>,
    // Held so the database file outlives the test.
    _dir: TempDir,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// This sets up:
    /// 1. A SQLite store in a temporary directory
    /// 2. The dispatch loop with the clock pinned to [`TODAY`]
    /// 3. The bridge server on an ephemeral port
    /// 4. A bridge client pointed at that server
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = SqliteStore::from_path(dir.path().join("appointments.db"))
            .await
            .expect("Failed to open store");

        let today = NaiveDate::parse_from_str(TODAY, "%Y-%m-%d").unwrap();
        let dispatcher = Dispatcher::with_clock(Arc::new(store.clone()), Arc::new(move || today));
        let (handle, dispatch_task) = DispatchQueue::spawn(dispatcher, 16);

        let server = BridgeServer::bind("127.0.0.1:0".parse().unwrap())
            .await
            .expect("Failed to bind bridge server");
        let server_addr = server.local_addr().unwrap();
        let server_task = tokio::spawn(async move {
            if let Err(e) = run_bridge_server(server, handle).await {
                eprintln!("Test bridge server error: {}", e);
            }
        });

        Self {
            client: BridgeClient::for_addr(server_addr),
            server_addr,
            store,
            server_task,
            dispatch_task,
            _dir: dir,
        }
    }

    /// Send a typed request and unwrap the transport result.
    pub async fn send(&self, request: Request) -> Reply {
        self.client
            .request(&RequestEnvelope::from(request))
            .await
            .expect("bridge request failed")
    }

    /// Schedule an appointment and return the assigned id.
    pub async fn schedule(&self, p_id: i64, patient: &str, date: &str, time: &str) -> i64 {
        let reply = self
            .send(Request::Schedule {
                p_id,
                patient: patient.to_string(),
                date: date.to_string(),
                time: time.to_string(),
            })
            .await;
        match reply {
            Reply::Scheduled { appointment_id, .. } => appointment_id,
            other => panic!("schedule failed: {other:?}"),
        }
    }

    /// Stop the servers and close the store.
    pub async fn shutdown(self) {
        self.client.close().await;
        self.server_task.abort();
        self.dispatch_task.abort();
        self.store.close().await;
    }
}
