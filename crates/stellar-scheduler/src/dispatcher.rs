// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Action dispatcher.
//!
//! Decodes each request envelope into a [`Request`], applies it to the
//! appointment store and builds the reply. Validation failures, unknown
//! actions and unknown appointments all become `{"status":"error"}` replies;
//! only store faults are returned as errors.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, instrument, warn};

use stellar_protocol::{Appointment, Reply, Request, RequestEnvelope, RequestError};

use crate::error::SchedulerError;
use crate::persistence::{AppointmentStore, NewAppointment};

/// Date format shared by stored appointments and `view_today`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of "today". Called once per `view_today` request.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Applies requests to the appointment store.
pub struct Dispatcher {
    store: Arc<dyn AppointmentStore>,
    clock: Clock,
}

impl Dispatcher {
    /// Dispatcher using the local system date for `view_today`.
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self::with_clock(store, Arc::new(|| Local::now().date_naive()))
    }

    /// Dispatcher with an explicit source for today's date.
    pub fn with_clock(store: Arc<dyn AppointmentStore>, clock: Clock) -> Self {
        Self { store, clock }
    }

    /// Handle one request envelope.
    pub async fn dispatch(&self, envelope: RequestEnvelope) -> Result<Reply, SchedulerError> {
        let request = match Request::try_from(envelope) {
            Ok(request) => request,
            Err(e) => {
                warn!(reason = %e, "rejecting request");
                return Ok(e.into());
            }
        };

        debug!(action = request.action(), "dispatching request");

        match request {
            Request::Schedule {
                p_id,
                patient,
                date,
                time,
            } => {
                let appointment = NewAppointment {
                    p_id,
                    patient,
                    date,
                    time,
                };
                self.handle_schedule(appointment).await
            }
            Request::Cancel { appointment_id } => self.handle_cancel(appointment_id).await,
            Request::ViewToday => self.handle_view_today().await,
            Request::ViewAll => self.handle_view_all().await,
        }
    }

    #[instrument(skip(self, appointment), fields(p_id = appointment.p_id))]
    async fn handle_schedule(&self, appointment: NewAppointment) -> Result<Reply, SchedulerError> {
        let appointment_id = self.store.create(&appointment).await?;
        info!(appointment_id, date = %appointment.date, "appointment scheduled");
        Ok(Reply::scheduled(appointment_id))
    }

    #[instrument(skip(self))]
    async fn handle_cancel(&self, appointment_id: i64) -> Result<Reply, SchedulerError> {
        if self.store.delete(appointment_id).await? {
            info!("appointment canceled");
            Ok(Reply::success(format!(
                "Appointment {} canceled.",
                appointment_id
            )))
        } else {
            debug!("appointment not found");
            Ok(RequestError::AppointmentNotFound.into())
        }
    }

    #[instrument(skip(self))]
    async fn handle_view_today(&self) -> Result<Reply, SchedulerError> {
        let today = (self.clock)().format(DATE_FORMAT).to_string();
        let records = self.store.query_by_date(&today).await?;
        debug!(%today, count = records.len(), "listing today's appointments");

        let appointments = records
            .into_iter()
            .map(|record| Appointment {
                date: today.clone(),
                ..record.into()
            })
            .collect();
        Ok(Reply::appointments(appointments))
    }

    #[instrument(skip(self))]
    async fn handle_view_all(&self) -> Result<Reply, SchedulerError> {
        let records = self.store.query_all().await?;
        debug!(count = records.len(), "listing all appointments");
        Ok(Reply::appointments(
            records.into_iter().map(Appointment::from).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::SqliteStore;
    use serde_json::{Value, json};

    fn fixed_clock(date: &str) -> Clock {
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT).unwrap();
        Arc::new(move || date)
    }

    async fn dispatcher_on(date: &str) -> Dispatcher {
        let store = SqliteStore::in_memory().await.unwrap();
        Dispatcher::with_clock(Arc::new(store), fixed_clock(date))
    }

    async fn send(dispatcher: &Dispatcher, request: Value) -> Value {
        let envelope: RequestEnvelope = serde_json::from_value(request).unwrap();
        let reply = dispatcher.dispatch(envelope).await.unwrap();
        serde_json::to_value(reply).unwrap()
    }

    fn schedule(p_id: i64, patient: &str, date: &str, time: &str) -> Value {
        json!({"action": "schedule", "p_id": p_id, "patient": patient, "date": date, "time": time})
    }

    #[tokio::test]
    async fn test_schedule_then_view_all() {
        let dispatcher = dispatcher_on("2025-02-20").await;

        let reply = send(&dispatcher, schedule(7, "John Doe", "2025-02-25", "10:00")).await;
        assert_eq!(reply, json!({"status": "success", "appointment_id": 1}));

        let reply = send(&dispatcher, json!({"action": "view_all"})).await;
        assert_eq!(
            reply,
            json!({"appointments": [
                {"id": 1, "p_id": 7, "patient": "John Doe", "date": "2025-02-25", "time": "10:00"}
            ]})
        );
    }

    #[tokio::test]
    async fn test_cancel_existing_then_missing() {
        let dispatcher = dispatcher_on("2025-02-20").await;
        send(&dispatcher, schedule(7, "John Doe", "2025-02-25", "10:00")).await;

        let reply = send(&dispatcher, json!({"action": "cancel", "appointment_id": 1})).await;
        assert_eq!(
            reply,
            json!({"status": "success", "message": "Appointment 1 canceled."})
        );

        let reply = send(&dispatcher, json!({"action": "view_all"})).await;
        assert_eq!(reply, json!({"appointments": []}));

        // Already canceled.
        let reply = send(&dispatcher, json!({"action": "cancel", "appointment_id": 1})).await;
        assert_eq!(
            reply,
            json!({"status": "error", "message": "Appointment not found."})
        );
    }

    #[tokio::test]
    async fn test_cancel_never_issued_id() {
        let dispatcher = dispatcher_on("2025-02-20").await;
        let reply = send(&dispatcher, json!({"action": "cancel", "appointment_id": 999})).await;
        assert_eq!(
            reply,
            json!({"status": "error", "message": "Appointment not found."})
        );
    }

    #[tokio::test]
    async fn test_cancel_non_integer_id_leaves_store_untouched() {
        let dispatcher = dispatcher_on("2025-02-20").await;
        send(&dispatcher, schedule(7, "John Doe", "2025-02-25", "10:00")).await;

        for id in [json!("abc"), json!(1.5), json!(true)] {
            let reply = send(&dispatcher, json!({"action": "cancel", "appointment_id": id})).await;
            assert_eq!(
                reply,
                json!({"status": "error", "message": "Appointment not found."}),
                "appointment_id = {id}"
            );
        }

        let reply = send(&dispatcher, json!({"action": "view_all"})).await;
        assert_eq!(reply["appointments"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_without_id() {
        let dispatcher = dispatcher_on("2025-02-20").await;
        let reply = send(&dispatcher, json!({"action": "cancel"})).await;
        assert_eq!(
            reply,
            json!({"status": "error", "message": "Missing appointment ID."})
        );
    }

    #[tokio::test]
    async fn test_schedule_without_patient_id_touches_nothing() {
        let dispatcher = dispatcher_on("2025-02-20").await;

        let reply = send(
            &dispatcher,
            json!({"action": "schedule", "patient": "John Doe", "date": "2025-02-25", "time": "10:00"}),
        )
        .await;
        assert_eq!(
            reply,
            json!({"status": "error", "message": "Missing patient ID."})
        );

        let reply = send(&dispatcher, schedule(0, "John Doe", "2025-02-25", "10:00")).await;
        assert_eq!(
            reply,
            json!({"status": "error", "message": "Missing patient ID."})
        );

        let reply = send(&dispatcher, json!({"action": "view_all"})).await;
        assert_eq!(reply, json!({"appointments": []}));
    }

    #[tokio::test]
    async fn test_schedule_missing_time() {
        let dispatcher = dispatcher_on("2025-02-20").await;
        let reply = send(
            &dispatcher,
            json!({"action": "schedule", "p_id": 3, "patient": "Ann", "date": "2025-02-25"}),
        )
        .await;
        assert_eq!(
            reply,
            json!({"status": "error", "message": "Missing required fields."})
        );
    }

    #[tokio::test]
    async fn test_invalid_action() {
        let dispatcher = dispatcher_on("2025-02-20").await;
        let reply = send(&dispatcher, json!({"action": "bogus"})).await;
        assert_eq!(reply, json!({"status": "error", "message": "Invalid action."}));

        // The dispatcher keeps serving afterwards.
        let reply = send(&dispatcher, json!({"action": "view_all"})).await;
        assert_eq!(reply, json!({"appointments": []}));
    }

    #[tokio::test]
    async fn test_view_today_filters_by_clock_date() {
        let dispatcher = dispatcher_on("2025-02-25").await;
        send(&dispatcher, schedule(1, "Past", "2025-02-24", "09:00")).await;
        send(&dispatcher, schedule(2, "Today", "2025-02-25", "10:00")).await;
        send(&dispatcher, schedule(3, "Future", "2025-02-26", "11:00")).await;

        let reply = send(&dispatcher, json!({"action": "view_today"})).await;
        assert_eq!(
            reply,
            json!({"appointments": [
                {"id": 2, "p_id": 2, "patient": "Today", "date": "2025-02-25", "time": "10:00"}
            ]})
        );
    }

    #[tokio::test]
    async fn test_view_today_reads_clock_on_every_call() {
        use std::sync::atomic::{AtomicBool, Ordering};

        // Flips from the 25th to the 26th after the first read, like a run across midnight.
        let crossed_midnight = Arc::new(AtomicBool::new(false));
        let flag = crossed_midnight.clone();
        let clock: Clock = Arc::new(move || {
            let day = if flag.swap(true, Ordering::SeqCst) { 26 } else { 25 };
            NaiveDate::from_ymd_opt(2025, 2, day).unwrap()
        });

        let store = SqliteStore::in_memory().await.unwrap();
        let dispatcher = Dispatcher::with_clock(Arc::new(store), clock);
        send(&dispatcher, schedule(1, "Tue", "2025-02-25", "09:00")).await;
        send(&dispatcher, schedule(2, "Wed", "2025-02-26", "09:00")).await;

        let first = send(&dispatcher, json!({"action": "view_today"})).await;
        assert_eq!(first["appointments"][0]["patient"], "Tue");

        let second = send(&dispatcher, json!({"action": "view_today"})).await;
        assert_eq!(second["appointments"][0]["patient"], "Wed");
        assert!(crossed_midnight.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_reads_are_idempotent() {
        let dispatcher = dispatcher_on("2025-02-25").await;
        send(&dispatcher, schedule(1, "A", "2025-02-25", "09:00")).await;
        send(&dispatcher, schedule(2, "B", "2025-03-01", "10:00")).await;

        for action in ["view_all", "view_today"] {
            let first = send(&dispatcher, json!({"action": action})).await;
            let second = send(&dispatcher, json!({"action": action})).await;
            assert_eq!(first, second, "{action} should be idempotent");
        }
    }

    #[tokio::test]
    async fn test_ids_unique_and_increasing_across_many_schedules() {
        let dispatcher = dispatcher_on("2025-02-25").await;
        let mut last = 0;
        for n in 1..=20 {
            let reply = send(
                &dispatcher,
                schedule(n, &format!("Patient {n}"), "2025-02-25", "09:00"),
            )
            .await;
            let id = reply["appointment_id"].as_i64().unwrap();
            assert!(id > last);
            last = id;
        }

        let reply = send(&dispatcher, json!({"action": "view_all"})).await;
        let listed = reply["appointments"].as_array().unwrap();
        assert_eq!(listed.len(), 20);
        for (i, entry) in listed.iter().enumerate() {
            let n = i as i64 + 1;
            assert_eq!(entry["p_id"], n);
            assert_eq!(entry["patient"], format!("Patient {n}"));
        }
    }

    #[tokio::test]
    async fn test_store_fault_is_returned_as_error() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.close().await;
        let dispatcher = Dispatcher::new(Arc::new(store));

        let envelope: RequestEnvelope = serde_json::from_value(json!({"action": "view_all"})).unwrap();
        let result = dispatcher.dispatch(envelope).await;
        assert!(matches!(result, Err(SchedulerError::DatabaseError { .. })));
    }
}
