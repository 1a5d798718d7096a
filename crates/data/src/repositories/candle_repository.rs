//! Candle persistence.

use super::{from_db_int, to_db_int};
use crate::error::StoreError;
use ohlcv_domain::{Candle, CandleKey, EventId, Interval, PairId};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use std::sync::Arc;

fn candle_from_row(row: &PgRow) -> Result<Candle, StoreError> {
    let pair_id: String = row.try_get("pair_id")?;
    let interval_secs = from_db_int(row.try_get("interval_secs")?, "interval_secs")?;
    let interval = Interval::from_secs(interval_secs)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown interval {interval_secs}")))?;

    Ok(Candle {
        pair: PairId::from(pair_id),
        interval,
        bucket_start: from_db_int(row.try_get("bucket_start")?, "bucket_start")?,
        open: row.try_get("open")?,
        high: row.try_get("high")?,
        low: row.try_get("low")?,
        close: row.try_get("close")?,
        volume: row.try_get("volume")?,
        quote_volume: row.try_get("quote_volume")?,
        trades: from_db_int(row.try_get("trades")?, "trades")?,
        open_event: EventId::new(
            from_db_int(row.try_get("open_block")?, "open_block")?,
            from_db_int(row.try_get("open_log_index")?, "open_log_index")?,
        ),
        close_event: EventId::new(
            from_db_int(row.try_get("close_block")?, "close_block")?,
            from_db_int(row.try_get("close_log_index")?, "close_log_index")?,
        ),
    })
}

/// Repository for candle reads and upserts.
#[derive(Clone)]
pub struct CandleRepository {
    pool: Arc<PgPool>,
}

impl CandleRepository {
    /// Creates a new CandleRepository.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Finds the candle with the given key.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find(&self, key: &CandleKey) -> Result<Option<Candle>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT * FROM candles
            WHERE pair_id = $1 AND interval_secs = $2 AND bucket_start = $3
            "#,
        )
        .bind(key.pair.as_str())
        .bind(to_db_int(key.interval.as_secs(), "interval_secs")?)
        .bind(to_db_int(key.bucket_start, "bucket_start")?)
        .fetch_optional(self.pool.as_ref())
        .await?;
        row.as_ref().map(candle_from_row).transpose()
    }

    /// Finds the latest candles for a pair and interval, newest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_latest(
        &self,
        pair: &PairId,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM candles
            WHERE pair_id = $1 AND interval_secs = $2
            ORDER BY bucket_start DESC
            LIMIT $3
            "#,
        )
        .bind(pair.as_str())
        .bind(to_db_int(interval.as_secs(), "interval_secs")?)
        .bind(to_db_int(limit as u64, "limit")?)
        .fetch_all(self.pool.as_ref())
        .await?;
        rows.iter().map(candle_from_row).collect()
    }

    /// Creates or replaces a candle.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn upsert(conn: &mut PgConnection, candle: &Candle) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO candles (pair_id, interval_secs, bucket_start, open, high, low, close,
                                 volume, quote_volume, trades, open_block, open_log_index,
                                 close_block, close_log_index)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (pair_id, interval_secs, bucket_start) DO UPDATE SET
                open = EXCLUDED.open,
                high = EXCLUDED.high,
                low = EXCLUDED.low,
                close = EXCLUDED.close,
                volume = EXCLUDED.volume,
                quote_volume = EXCLUDED.quote_volume,
                trades = EXCLUDED.trades,
                open_block = EXCLUDED.open_block,
                open_log_index = EXCLUDED.open_log_index,
                close_block = EXCLUDED.close_block,
                close_log_index = EXCLUDED.close_log_index,
                updated_at = NOW()
            "#,
        )
        .bind(candle.pair.as_str())
        .bind(to_db_int(candle.interval.as_secs(), "interval_secs")?)
        .bind(to_db_int(candle.bucket_start, "bucket_start")?)
        .bind(candle.open)
        .bind(candle.high)
        .bind(candle.low)
        .bind(candle.close)
        .bind(candle.volume)
        .bind(candle.quote_volume)
        .bind(to_db_int(candle.trades, "trades")?)
        .bind(to_db_int(candle.open_event.block_number, "open_block")?)
        .bind(to_db_int(candle.open_event.log_index, "open_log_index")?)
        .bind(to_db_int(candle.close_event.block_number, "close_block")?)
        .bind(to_db_int(candle.close_event.log_index, "close_log_index")?)
        .execute(conn)
        .await?;
        Ok(())
    }
}
