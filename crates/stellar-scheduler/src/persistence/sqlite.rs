//! SQLite-backed appointment store.

use std::path::Path;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{debug, info};

use crate::error::SchedulerError;
use crate::migrations;

use super::{AppointmentRecord, AppointmentStore, NewAppointment};

/// SQLite-backed appointment store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database file at `path` and run migrations.
    ///
    /// Parent directories are created when missing.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, SchedulerError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                SchedulerError::database(
                    "create_dir",
                    format!("Failed to create directory {:?}: {}", parent, e),
                )
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        // A single connection keeps every statement on one writer.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| {
                SchedulerError::database(
                    "connect",
                    format!("Failed to connect to SQLite at {:?}: {}", path, e),
                )
            })?;

        migrations::run_sqlite(&pool).await?;
        info!(path = %path.display(), "appointment store ready");

        Ok(Self { pool })
    }

    /// In-memory store with the schema applied.
    pub async fn in_memory() -> Result<Self, SchedulerError> {
        // One connection: each new connection to `:memory:` is a separate database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        migrations::run_sqlite(&pool).await?;
        Ok(Self { pool })
    }

    /// Close the underlying pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl AppointmentStore for SqliteStore {
    async fn create(&self, appointment: &NewAppointment) -> Result<i64, SchedulerError> {
        let result = sqlx::query(
            r#"
            INSERT INTO appointments (p_id, patient, date, time)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(appointment.p_id)
        .bind(&appointment.patient)
        .bind(&appointment.date)
        .bind(&appointment.time)
        .execute(&self.pool)
        .await
        .map_err(|e| SchedulerError::database("insert_appointment", e))?;

        let id = result.last_insert_rowid();
        debug!(appointment_id = id, "appointment inserted");
        Ok(id)
    }

    async fn delete(&self, id: i64) -> Result<bool, SchedulerError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| SchedulerError::database("delete_appointment", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn query_all(&self) -> Result<Vec<AppointmentRecord>, SchedulerError> {
        let records = sqlx::query_as::<_, AppointmentRecord>(
            r#"
            SELECT id, p_id, patient, date, time
            FROM appointments
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SchedulerError::database("list_appointments", e))?;

        Ok(records)
    }

    async fn query_by_date(&self, date: &str) -> Result<Vec<AppointmentRecord>, SchedulerError> {
        let records = sqlx::query_as::<_, AppointmentRecord>(
            r#"
            SELECT id, p_id, patient, date, time
            FROM appointments
            WHERE date = ?
            ORDER BY id
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SchedulerError::database("list_appointments_by_date", e))?;

        Ok(records)
    }
}
