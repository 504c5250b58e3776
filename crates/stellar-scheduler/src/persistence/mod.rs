//! Persistence interface and backends for stellar-scheduler.

pub mod sqlite;

pub use self::sqlite::SqliteStore;

use async_trait::async_trait;
use stellar_protocol::Appointment;

use crate::error::SchedulerError;

/// Appointment row as stored.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AppointmentRecord {
    /// Store-assigned identifier.
    pub id: i64,
    /// Opaque patient identifier.
    pub p_id: i64,
    /// Patient name.
    pub patient: String,
    /// Appointment date, `YYYY-MM-DD` by convention (not validated).
    pub date: String,
    /// Appointment time, `HH:MM` by convention (not validated).
    pub time: String,
}

impl From<AppointmentRecord> for Appointment {
    fn from(record: AppointmentRecord) -> Self {
        Appointment {
            id: record.id,
            p_id: record.p_id,
            patient: record.patient,
            date: record.date,
            time: record.time,
        }
    }
}

/// Fields of an appointment that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    /// Opaque patient identifier.
    pub p_id: i64,
    /// Patient name.
    pub patient: String,
    /// Appointment date.
    pub date: String,
    /// Appointment time.
    pub time: String,
}

/// Storage contract used by the dispatcher.
///
/// Every call commits before it returns. Errors mean the store is unusable
/// and are not retried.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Insert an appointment and return its newly assigned id.
    async fn create(&self, appointment: &NewAppointment) -> Result<i64, SchedulerError>;

    /// Delete by id. Returns false when no record matched.
    async fn delete(&self, id: i64) -> Result<bool, SchedulerError>;

    /// Every stored appointment in id order.
    async fn query_all(&self) -> Result<Vec<AppointmentRecord>, SchedulerError>;

    /// Appointments whose date equals `date` exactly, in id order.
    async fn query_by_date(&self, date: &str) -> Result<Vec<AppointmentRecord>, SchedulerError>;
}
