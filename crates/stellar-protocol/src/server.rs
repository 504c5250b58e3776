// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Bridge server helpers for the scheduler.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, instrument, warn};

use crate::frame::{Frame, FrameError, FramedStream};

/// Errors that can occur in the bridge server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("bind error: {0}")]
    Bind(#[from] std::io::Error),

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
}

/// TCP listener for bridge connections
pub struct BridgeServer {
    listener: TcpListener,
}

impl BridgeServer {
    /// Bind the server to the given address
    pub async fn bind(bind_addr: SocketAddr) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(bind_addr).await?;
        info!(addr = %listener.local_addr()?, "bridge server bound");
        Ok(Self { listener })
    }

    /// Get the local address the server is bound to
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept the next incoming connection
    pub async fn accept(&self) -> Result<ConnectionHandler, ServerError> {
        let (stream, remote) = self.listener.accept().await?;
        stream.set_nodelay(true)?;
        Ok(ConnectionHandler::new(stream, remote))
    }

    /// Run the server, spawning one task per accepted connection.
    ///
    /// Returns only if accepting fails.
    #[instrument(skip(self, handler))]
    pub async fn run<H, Fut>(&self, handler: H) -> Result<(), ServerError>
    where
        H: Fn(ConnectionHandler) -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        info!("bridge server running");

        loop {
            match self.accept().await {
                Ok(conn) => {
                    debug!(remote = %conn.remote_address(), "accepted connection");
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        handler(conn).await;
                    });
                }
                Err(ServerError::Bind(e)) if is_transient_accept_error(&e) => {
                    warn!(error = %e, "failed to accept connection");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn is_transient_accept_error(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::Interrupted
    )
}

/// Handler for an individual bridge connection.
///
/// Frames on one connection are strictly sequential: read a request, write its
/// reply, then read the next.
pub struct ConnectionHandler {
    stream: FramedStream<TcpStream>,
    remote: SocketAddr,
}

impl ConnectionHandler {
    pub fn new(stream: TcpStream, remote: SocketAddr) -> Self {
        Self {
            stream: FramedStream::new(stream),
            remote,
        }
    }

    /// Get the remote address of the connection
    pub fn remote_address(&self) -> SocketAddr {
        self.remote
    }

    /// Read the next frame
    pub async fn read_frame(&mut self) -> Result<Frame, FrameError> {
        self.stream.read_frame().await
    }

    /// Write a frame
    pub async fn write_frame(&mut self, frame: &Frame) -> Result<(), FrameError> {
        self.stream.write_frame(frame).await
    }
}
