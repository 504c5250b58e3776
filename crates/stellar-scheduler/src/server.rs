// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Bridge server for stellar-scheduler.
//!
//! Accepts gateway connections and routes each request frame through the
//! dispatch queue.

use tracing::{debug, error, info, instrument, warn};

use stellar_protocol::frame::MAX_FRAME_SIZE;
use stellar_protocol::{
    BridgeServer, ConnectionHandler, Frame, FrameError, MessageType, Reply, RequestEnvelope,
    RequestError,
};

use crate::error::SchedulerError;
use crate::queue::DispatchHandle;

/// Run the bridge server until accepting fails.
#[instrument(skip(server, handle))]
pub async fn run_bridge_server(
    server: BridgeServer,
    handle: DispatchHandle,
) -> Result<(), SchedulerError> {
    info!(addr = %server.local_addr()?, "Bridge server starting");

    server
        .run(move |conn: ConnectionHandler| {
            let handle = handle.clone();
            async move {
                handle_connection(conn, handle).await;
            }
        })
        .await?;

    Ok(())
}

/// Serve request frames on one connection until the peer hangs up.
#[instrument(skip(conn, handle), fields(remote = %conn.remote_address()))]
pub async fn handle_connection(mut conn: ConnectionHandler, handle: DispatchHandle) {
    debug!("Gateway connection accepted");

    loop {
        match handle_request(&mut conn, &handle).await {
            Ok(()) => {}
            Err(FrameError::ConnectionClosed) => break,
            Err(e) => {
                error!("Connection error: {}", e);
                break;
            }
        }
    }

    debug!("Gateway connection closed");
}

/// Read one request, dispatch it, and write the reply.
async fn handle_request(
    conn: &mut ConnectionHandler,
    handle: &DispatchHandle,
) -> Result<(), FrameError> {
    let request_frame = conn.read_frame().await?;

    if request_frame.message_type != MessageType::Request {
        warn!(message_type = ?request_frame.message_type, "Unexpected frame from gateway");
        let reply = Reply::from(RequestError::InvalidAction);
        return conn.write_frame(&Frame::response(&reply)?).await;
    }

    let envelope: RequestEnvelope = match request_frame.decode() {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Undecodable request payload");
            let reply = Reply::from(RequestError::InvalidAction);
            return conn.write_frame(&Frame::response(&reply)?).await;
        }
    };

    let response = reply_frame(handle.submit(envelope).await)?;
    conn.write_frame(&response).await
}

/// Build the frame answering one request.
///
/// A reply too large to frame becomes an error frame, so the request still
/// gets exactly one answer and the connection stays usable.
fn reply_frame(result: Result<Reply, SchedulerError>) -> Result<Frame, FrameError> {
    match result {
        Ok(reply) => match Frame::response(&reply) {
            Err(FrameError::FrameTooLarge(size)) => {
                error!(size, "Reply exceeds the frame size limit");
                Frame::error(format!(
                    "Reply too large: {} bytes (max: {})",
                    size, MAX_FRAME_SIZE
                ))
            }
            framed => framed,
        },
        Err(e) => {
            error!(code = e.error_code(), "Request failed: {}", e);
            Frame::error(e.to_string())
        }
    }
}
