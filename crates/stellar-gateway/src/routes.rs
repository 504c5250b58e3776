// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP handlers.
//!
//! Handlers only check that the required keys are present, copy the client's
//! values into a request envelope and return the scheduler's reply as-is.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};

use stellar_protocol::envelope::action;
use stellar_protocol::{Reply, RequestEnvelope};

use crate::AppState;
use crate::error::GatewayError;

const SCHEDULE_FIELDS: [&str; 4] = ["p_id", "patient", "date", "time"];

/// `POST /schedule`
#[instrument(skip(state, body))]
pub async fn schedule(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Reply>, GatewayError> {
    let fields = json_object(&body).ok_or(GatewayError::MissingFields)?;
    if !SCHEDULE_FIELDS.iter().all(|key| fields.contains_key(*key)) {
        return Err(GatewayError::MissingFields);
    }

    let mut envelope = RequestEnvelope::for_action(action::SCHEDULE);
    envelope.p_id = fields.get("p_id").cloned();
    envelope.patient = fields.get("patient").cloned();
    envelope.date = fields.get("date").cloned();
    envelope.time = fields.get("time").cloned();

    forward(&state, envelope).await
}

/// `POST /cancel`
#[instrument(skip(state, body))]
pub async fn cancel(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Reply>, GatewayError> {
    let fields = json_object(&body).ok_or(GatewayError::MissingAppointmentId)?;
    let appointment_id = fields
        .get("appointment_id")
        .cloned()
        .ok_or(GatewayError::MissingAppointmentId)?;

    let mut envelope = RequestEnvelope::for_action(action::CANCEL);
    envelope.appointment_id = Some(appointment_id);

    forward(&state, envelope).await
}

/// `GET /view_today`
#[instrument(skip(state))]
pub async fn view_today(State(state): State<AppState>) -> Result<Json<Reply>, GatewayError> {
    forward(&state, RequestEnvelope::for_action(action::VIEW_TODAY)).await
}

/// `GET /view_all`
#[instrument(skip(state))]
pub async fn view_all(State(state): State<AppState>) -> Result<Json<Reply>, GatewayError> {
    forward(&state, RequestEnvelope::for_action(action::VIEW_ALL)).await
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn forward(state: &AppState, envelope: RequestEnvelope) -> Result<Json<Reply>, GatewayError> {
    let reply = state.bridge.request(&envelope).await?;
    debug!(error = reply.is_error(), "scheduler replied");
    Ok(Json(reply))
}

fn json_object(body: &[u8]) -> Option<Map<String, Value>> {
    match serde_json::from_slice(body).ok()? {
        Value::Object(fields) => Some(fields),
        _ => None,
    }
}
