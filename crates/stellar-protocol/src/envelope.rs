// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request and reply envelopes exchanged over the bridge.
//!
//! The gateway only presence-checks client input, so the wire request is the
//! loosely typed [`RequestEnvelope`]. The scheduler turns it into a [`Request`]
//! exactly once via `TryFrom`, and every decode failure carries the message
//! that is sent back to the client.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Action discriminators understood by the scheduler.
pub mod action {
    pub const SCHEDULE: &str = "schedule";
    pub const CANCEL: &str = "cancel";
    pub const VIEW_TODAY: &str = "view_today";
    pub const VIEW_ALL: &str = "view_all";
}

/// Flat request envelope as it travels on the wire.
///
/// Field values are kept as raw JSON so the gateway can forward client input
/// verbatim. A JSON `null` is treated the same as an absent key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<Value>,
}

impl RequestEnvelope {
    /// Envelope carrying only an action discriminator.
    pub fn for_action(action: &str) -> Self {
        Self {
            action: Some(action.to_string()),
            ..Default::default()
        }
    }
}

/// A validated request, one variant per action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Schedule {
        p_id: i64,
        patient: String,
        date: String,
        time: String,
    },
    Cancel {
        appointment_id: i64,
    },
    ViewToday,
    ViewAll,
}

impl Request {
    /// Wire name of this request's action.
    pub fn action(&self) -> &'static str {
        match self {
            Request::Schedule { .. } => action::SCHEDULE,
            Request::Cancel { .. } => action::CANCEL,
            Request::ViewToday => action::VIEW_TODAY,
            Request::ViewAll => action::VIEW_ALL,
        }
    }
}

/// Reasons a request envelope cannot be turned into a [`Request`].
///
/// The display text is the exact client-facing error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Invalid action.")]
    InvalidAction,

    #[error("Missing patient ID.")]
    MissingPatientId,

    #[error("Missing required fields.")]
    MissingFields,

    #[error("Missing appointment ID.")]
    MissingAppointmentId,

    /// An identifier that is not an integer can never match a stored record.
    #[error("Appointment not found.")]
    AppointmentNotFound,
}

impl TryFrom<RequestEnvelope> for Request {
    type Error = RequestError;

    fn try_from(envelope: RequestEnvelope) -> Result<Self, Self::Error> {
        match envelope.action.as_deref() {
            Some(action::SCHEDULE) => {
                // A zero patient ID counts as missing.
                let p_id = envelope
                    .p_id
                    .as_ref()
                    .and_then(integer_value)
                    .filter(|id| *id != 0)
                    .ok_or(RequestError::MissingPatientId)?;

                Ok(Request::Schedule {
                    p_id,
                    patient: text_value(envelope.patient)?,
                    date: text_value(envelope.date)?,
                    time: text_value(envelope.time)?,
                })
            }
            Some(action::CANCEL) => {
                let value = envelope
                    .appointment_id
                    .ok_or(RequestError::MissingAppointmentId)?;
                let appointment_id =
                    integer_value(&value).ok_or(RequestError::AppointmentNotFound)?;
                Ok(Request::Cancel { appointment_id })
            }
            Some(action::VIEW_TODAY) => Ok(Request::ViewToday),
            Some(action::VIEW_ALL) => Ok(Request::ViewAll),
            _ => Err(RequestError::InvalidAction),
        }
    }
}

impl From<Request> for RequestEnvelope {
    fn from(request: Request) -> Self {
        let mut envelope = RequestEnvelope::for_action(request.action());
        match request {
            Request::Schedule {
                p_id,
                patient,
                date,
                time,
            } => {
                envelope.p_id = Some(Value::from(p_id));
                envelope.patient = Some(Value::from(patient));
                envelope.date = Some(Value::from(date));
                envelope.time = Some(Value::from(time));
            }
            Request::Cancel { appointment_id } => {
                envelope.appointment_id = Some(Value::from(appointment_id));
            }
            Request::ViewToday | Request::ViewAll => {}
        }
        envelope
    }
}

/// Integers arrive as JSON numbers, or as numeric strings from lenient clients.
fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_value(value: Option<Value>) -> Result<String, RequestError> {
    match value {
        Some(Value::String(s)) => Ok(s),
        _ => Err(RequestError::MissingFields),
    }
}

/// One appointment as it appears in a listing reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub p_id: i64,
    pub patient: String,
    pub date: String,
    pub time: String,
}

/// Outcome marker carried by status replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Reply envelope returned for every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    /// `{"status":"success","appointment_id":<int>}`
    Scheduled { status: Status, appointment_id: i64 },
    /// `{"status":"success"|"error","message":<string>}`
    Message { status: Status, message: String },
    /// `{"appointments":[...]}`
    Appointments { appointments: Vec<Appointment> },
}

impl Reply {
    pub fn scheduled(appointment_id: i64) -> Self {
        Reply::Scheduled {
            status: Status::Success,
            appointment_id,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Reply::Message {
            status: Status::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Reply::Message {
            status: Status::Error,
            message: message.into(),
        }
    }

    pub fn appointments(appointments: Vec<Appointment>) -> Self {
        Reply::Appointments { appointments }
    }

    /// True for `{"status":"error", ...}` replies.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Reply::Message {
                status: Status::Error,
                ..
            }
        )
    }
}

impl From<RequestError> for Reply {
    fn from(err: RequestError) -> Self {
        Reply::error(err.to_string())
    }
}
