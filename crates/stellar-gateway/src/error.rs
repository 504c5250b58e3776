// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP error mapping for the gateway.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use stellar_protocol::{ClientError, Reply};

/// Errors that can end a gateway request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// `/schedule` body is not an object or lacks one of the required keys.
    #[error("Missing required fields.")]
    MissingFields,

    /// `/cancel` body is not an object or lacks `appointment_id`.
    #[error("Missing appointment ID.")]
    MissingAppointmentId,

    /// The bridge could not deliver the request or read the reply.
    #[error("bridge unavailable: {0}")]
    Bridge(ClientError),

    /// The scheduler failed while serving the request.
    #[error("scheduler error: {0}")]
    Remote(String),
}

impl GatewayError {
    /// Returns the HTTP status code for this error.
    ///
    /// - Validation: 400 Bad Request
    /// - Scheduler fault: 500 Internal Server Error
    /// - Bridge fault: 502 Bad Gateway
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingFields | Self::MissingAppointmentId => StatusCode::BAD_REQUEST,
            Self::Remote(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Bridge(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<ClientError> for GatewayError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Remote(message) => Self::Remote(message),
            other => Self::Bridge(other),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            Self::MissingFields | Self::MissingAppointmentId => {
                (status, Json(Reply::error(self.to_string()))).into_response()
            }
            Self::Bridge(_) | Self::Remote(_) => {
                error!(status = status.as_u16(), "{}", self);
                (status, self.to_string()).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            GatewayError::MissingFields.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::MissingAppointmentId.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::Remote("disk I/O error".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::Bridge(ClientError::Timeout(100)).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_remote_client_error_maps_to_remote() {
        let err = GatewayError::from(ClientError::Remote("boom".to_string()));
        assert!(matches!(err, GatewayError::Remote(ref m) if m == "boom"));

        let err = GatewayError::from(ClientError::Timeout(50));
        assert!(matches!(err, GatewayError::Bridge(ClientError::Timeout(50))));
    }

    #[test]
    fn test_validation_errors_render_reply_envelope() {
        let response = GatewayError::MissingFields.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let content_type = response.headers()["content-type"].to_str().unwrap();
        assert!(content_type.starts_with("application/json"), "{content_type}");
    }
}
