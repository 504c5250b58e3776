// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Dispatch work queue.
//!
//! Bridge connections may be served concurrently, but every request is
//! funneled through one bounded FIFO queue into a single dispatcher task. That
//! task is the only writer to the store, so requests run one at a time in
//! arrival order.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use stellar_protocol::{Reply, RequestEnvelope};

use crate::dispatcher::Dispatcher;
use crate::error::SchedulerError;

struct Job {
    envelope: RequestEnvelope,
    reply_tx: oneshot::Sender<Result<Reply, SchedulerError>>,
}

/// Cloneable handle for submitting requests to the dispatch loop.
#[derive(Clone)]
pub struct DispatchHandle {
    tx: mpsc::Sender<Job>,
}

impl DispatchHandle {
    /// Enqueue a request and wait for the dispatcher's reply.
    pub async fn submit(&self, envelope: RequestEnvelope) -> Result<Reply, SchedulerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Job { envelope, reply_tx })
            .await
            .map_err(|_| SchedulerError::DispatcherStopped)?;
        reply_rx
            .await
            .map_err(|_| SchedulerError::DispatcherStopped)?
    }
}

/// The single-consumer dispatch loop.
pub struct DispatchQueue;

impl DispatchQueue {
    /// Spawn the dispatch loop. It stops once every handle has been dropped.
    pub fn spawn(dispatcher: Dispatcher, capacity: usize) -> (DispatchHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity);
        let task = tokio::spawn(run_dispatch_loop(dispatcher, rx));
        (DispatchHandle { tx }, task)
    }
}

async fn run_dispatch_loop(dispatcher: Dispatcher, mut rx: mpsc::Receiver<Job>) {
    info!("Dispatch loop started");

    while let Some(job) = rx.recv().await {
        let result = dispatcher.dispatch(job.envelope).await;
        if job.reply_tx.send(result).is_err() {
            debug!("requester went away before the reply was ready");
        }
    }

    info!("Dispatch loop stopped");
}
