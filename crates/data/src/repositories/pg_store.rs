//! PostgreSQL-backed [`Store`].

use super::{CandleRepository, Database, EventRepository, ListingRepository, PairRepository};
use crate::error::StoreError;
use crate::store::{ChangeSet, Store};
use async_trait::async_trait;
use ohlcv_domain::{Address, Candle, CandleKey, EventId, Interval, Listing, Pair, PairId, Token};
use tracing::debug;

/// Store persisting to PostgreSQL. Each change set is one transaction.
#[derive(Clone)]
pub struct PgStore {
    db: Database,
}

impl PgStore {
    /// Creates a store over an open database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn token(&self, address: &Address) -> Result<Option<Token>, StoreError> {
        self.db.pairs().find_token(address).await
    }

    async fn pair(&self, id: &PairId) -> Result<Option<Pair>, StoreError> {
        self.db.pairs().find_pair(id).await
    }

    async fn pairs(&self) -> Result<Vec<Pair>, StoreError> {
        self.db.pairs().find_all().await
    }

    async fn candle(&self, key: &CandleKey) -> Result<Option<Candle>, StoreError> {
        self.db.candles().find(key).await
    }

    async fn latest_candles(
        &self,
        pair: &PairId,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, StoreError> {
        self.db.candles().find_latest(pair, interval, limit).await
    }

    async fn listing(
        &self,
        marketplace: &Address,
        id: &str,
    ) -> Result<Option<Listing>, StoreError> {
        self.db.listings().find(marketplace, id).await
    }

    async fn is_processed(&self, event: EventId) -> Result<bool, StoreError> {
        self.db.events().exists(event).await
    }

    async fn cursor(&self) -> Result<Option<EventId>, StoreError> {
        self.db.events().latest().await
    }

    async fn commit(&self, changes: ChangeSet) -> Result<(), StoreError> {
        let mut tx = self.db.pool().begin().await?;

        for token in &changes.tokens {
            PairRepository::insert_token(&mut *tx, token).await?;
        }
        for pair in &changes.pairs {
            PairRepository::insert_pair(&mut *tx, pair).await?;
        }
        for candle in &changes.candles {
            CandleRepository::upsert(&mut *tx, candle).await?;
        }
        for listing in &changes.listings {
            ListingRepository::upsert(&mut *tx, listing).await?;
        }
        if let Some(event) = changes.event {
            EventRepository::mark(&mut *tx, event).await?;
        }

        tx.commit().await?;

        debug!(
            event = ?changes.event,
            candles = changes.candles.len(),
            "Committed change set"
        );
        Ok(())
    }
}
