//! Processed-event log used for duplicate detection.

use super::{from_db_int, to_db_int};
use crate::error::StoreError;
use ohlcv_domain::EventId;
use sqlx::{PgConnection, PgPool, Row};
use std::sync::Arc;

/// Repository for the processed-event log.
#[derive(Clone)]
pub struct EventRepository {
    pool: Arc<PgPool>,
}

impl EventRepository {
    /// Creates a new EventRepository.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Checks whether an event was already committed.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn exists(&self, event: EventId) -> Result<bool, StoreError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM processed_events WHERE block_number = $1 AND log_index = $2",
        )
        .bind(to_db_int(event.block_number, "block_number")?)
        .bind(to_db_int(event.log_index, "log_index")?)
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(count.0 > 0)
    }

    /// Returns the highest committed event.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn latest(&self) -> Result<Option<EventId>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT block_number, log_index FROM processed_events
            ORDER BY block_number DESC, log_index DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(|row| -> Result<EventId, StoreError> {
            Ok(EventId::new(
                from_db_int(row.try_get("block_number")?, "block_number")?,
                from_db_int(row.try_get("log_index")?, "log_index")?,
            ))
        })
        .transpose()
    }

    /// Records an event as committed.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn mark(conn: &mut PgConnection, event: EventId) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO processed_events (block_number, log_index)
            VALUES ($1, $2)
            ON CONFLICT (block_number, log_index) DO NOTHING
            "#,
        )
        .bind(to_db_int(event.block_number, "block_number")?)
        .bind(to_db_int(event.log_index, "log_index")?)
        .execute(conn)
        .await?;
        Ok(())
    }
}
