// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Bridge client used by the gateway to reach the scheduler.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::envelope::{Reply, RequestEnvelope};
use crate::frame::{Frame, FrameError, FramedStream, MessageType};

/// Errors that can occur in the bridge client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection timed out after {0}ms")]
    ConnectTimeout(u64),

    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("unexpected message type from server: {0:?}")]
    UnexpectedMessage(MessageType),

    #[error("server failed to process request: {0}")]
    Remote(String),
}

/// Configuration for the bridge client
#[derive(Debug, Clone)]
pub struct BridgeClientConfig {
    /// Scheduler bridge address
    pub server_addr: SocketAddr,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Upper bound on one request/reply exchange. `None` waits forever.
    pub request_timeout: Option<Duration>,
}

impl Default for BridgeClientConfig {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([127, 0, 0, 1], 5555)),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}

/// Strict request/reply client for the bridge.
///
/// One TCP connection is shared by every caller. The connection lock is held
/// from sending a request until its reply has been read, so at most one
/// request is ever outstanding and concurrent callers queue up behind it.
pub struct BridgeClient {
    connection: Mutex<Option<FramedStream<TcpStream>>>,
    config: BridgeClientConfig,
}

impl BridgeClient {
    /// Create a new client with the given configuration. No connection is
    /// made until the first request (or an explicit [`BridgeClient::connect`]).
    pub fn new(config: BridgeClientConfig) -> Self {
        Self {
            connection: Mutex::new(None),
            config,
        }
    }

    /// Create a client with default settings for the given address
    pub fn for_addr(server_addr: SocketAddr) -> Self {
        Self::new(BridgeClientConfig {
            server_addr,
            ..Default::default()
        })
    }

    /// Get the client configuration
    pub fn config(&self) -> &BridgeClientConfig {
        &self.config
    }

    async fn open(&self) -> Result<FramedStream<TcpStream>, ClientError> {
        info!(addr = %self.config.server_addr, "connecting to scheduler bridge");

        let connect = TcpStream::connect(self.config.server_addr);
        let stream = tokio::time::timeout(self.config.connect_timeout, connect)
            .await
            .map_err(|_| {
                ClientError::ConnectTimeout(self.config.connect_timeout.as_millis() as u64)
            })??;
        stream.set_nodelay(true)?;

        info!("connected to scheduler bridge");
        Ok(FramedStream::new(stream))
    }

    /// Connect to the server if not already connected
    #[instrument(skip(self))]
    pub async fn connect(&self) -> Result<(), ClientError> {
        let mut guard = self.connection.lock().await;
        if guard.is_some() {
            debug!("reusing existing connection");
            return Ok(());
        }
        *guard = Some(self.open().await?);
        Ok(())
    }

    /// Send one request envelope and wait for its reply.
    ///
    /// The connection is taken out of the client for the duration of the
    /// exchange and only returned once its reply has been read. A transport
    /// failure, a timeout or a caller that stops waiting therefore drops the
    /// connection, and the next call reconnects instead of reading a stale
    /// reply.
    #[instrument(skip(self, request), fields(action = request.action.as_deref().unwrap_or("")))]
    pub async fn request(&self, request: &RequestEnvelope) -> Result<Reply, ClientError> {
        let frame = Frame::request(request)?;
        let mut guard = self.connection.lock().await;

        let mut stream = match guard.take() {
            Some(stream) => stream,
            None => self.open().await?,
        };

        let exchange = stream.exchange(&frame);
        let result = match self.config.request_timeout {
            Some(limit) => match tokio::time::timeout(limit, exchange).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(timeout_ms = limit.as_millis() as u64, "bridge request timed out");
                    return Err(ClientError::Timeout(limit.as_millis() as u64));
                }
            },
            None => exchange.await,
        };

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "bridge exchange failed, dropping connection");
                return Err(e.into());
            }
        };
        *guard = Some(stream);

        match reply.message_type {
            MessageType::Response => Ok(reply.decode()?),
            MessageType::Error => Err(ClientError::Remote(reply.text())),
            other => Err(ClientError::UnexpectedMessage(other)),
        }
    }

    /// Close the connection
    pub async fn close(&self) {
        let mut guard = self.connection.lock().await;
        if guard.take().is_some() {
            debug!("bridge connection closed");
        }
    }

    /// Check if the client currently holds a connection
    pub async fn is_connected(&self) -> bool {
        self.connection.lock().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeClientConfig::default();
        assert_eq!(config.server_addr.port(), 5555);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_for_addr_keeps_defaults() {
        let addr: SocketAddr = "127.0.0.1:6000".parse().unwrap();
        let client = BridgeClient::for_addr(addr);
        assert_eq!(client.config().server_addr, addr);
        assert!(client.config().request_timeout.is_none());
    }

    #[test]
    fn test_client_error_display() {
        assert_eq!(
            ClientError::Timeout(500).to_string(),
            "request timed out after 500ms"
        );
        assert_eq!(
            ClientError::Remote("disk I/O error".to_string()).to_string(),
            "server failed to process request: disk I/O error"
        );
    }

    #[tokio::test]
    async fn test_oversized_request_keeps_connection_state() {
        let client = BridgeClient::for_addr("127.0.0.1:9".parse().unwrap());
        let mut envelope = RequestEnvelope::for_action("schedule");
        let patient = "x".repeat(crate::frame::MAX_FRAME_SIZE);
        envelope.patient = Some(serde_json::Value::from(patient));

        // Rejected before any connection attempt.
        let result = client.request(&envelope).await;
        assert!(matches!(
            result,
            Err(ClientError::Frame(FrameError::FrameTooLarge(_)))
        ));
        assert!(!client.is_connected().await);
    }

    #[tokio::test]
    async fn test_new_client_is_not_connected() {
        let client = BridgeClient::new(BridgeClientConfig::default());
        assert!(!client.is_connected().await);
    }
}
