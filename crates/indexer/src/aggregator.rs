//! Multi-interval candle aggregation.

use crate::error::IndexerError;
use crate::registry::Registry;
use ohlcv_data::{ChangeSet, Store};
use ohlcv_domain::{Candle, CandleKey, Interval, TradeRecord};
use tracing::debug;

/// Folds trades into one candle per tracked interval.
#[derive(Debug, Clone)]
pub struct Aggregator {
    intervals: Vec<Interval>,
}

impl Aggregator {
    pub fn new(intervals: Vec<Interval>) -> Self {
        Self { intervals }
    }

    /// Stages the trade's pair and its candle updates into `changes`.
    ///
    /// For every interval the bucket containing the trade is looked up in
    /// `changes` first, then in the store; a missing bucket is opened by this
    /// trade. Returns the number of candles touched.
    ///
    /// # Errors
    /// Returns a registry conflict, `IndexerError::Malformed` when a volume
    /// sum overflows, or a store error. `changes` may be left partially
    /// filled and must then be discarded.
    pub async fn apply(
        &self,
        trade: &TradeRecord,
        store: &dyn Store,
        changes: &mut ChangeSet,
    ) -> Result<usize, IndexerError> {
        Registry::new(store, changes)
            .get_or_create_pair(
                &trade.pair,
                &trade.base,
                &trade.quote,
                trade.timestamp,
                trade.event.block_number,
            )
            .await?;

        for interval in &self.intervals {
            let key = CandleKey::containing(trade.pair.clone(), *interval, trade.timestamp);

            if let Some(candle) = changes.candle_mut(&key) {
                candle.merge(trade)?;
                continue;
            }

            let candle = match store.candle(&key).await? {
                Some(mut candle) => {
                    candle.merge(trade)?;
                    candle
                }
                None => {
                    debug!(
                        pair = %key.pair,
                        interval = %key.interval,
                        bucket = key.bucket_start,
                        "Opening candle"
                    );
                    Candle::first(key, trade)
                }
            };
            changes.candles.push(candle);
        }

        Ok(self.intervals.len())
    }
}
