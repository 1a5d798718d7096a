//! In-memory store.

use crate::error::StoreError;
use crate::store::{ChangeSet, Store};
use async_trait::async_trait;
use ohlcv_domain::{Address, Candle, CandleKey, EventId, Interval, Listing, Pair, PairId, Token};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct State {
    tokens: HashMap<Address, Token>,
    pairs: HashMap<PairId, Pair>,
    /// Ordered by (pair, interval, bucket_start) for range scans.
    candles: BTreeMap<CandleKey, Candle>,
    listings: HashMap<(Address, String), Listing>,
    processed: HashSet<EventId>,
    cursor: Option<EventId>,
}

/// Store keeping everything in process memory.
///
/// Commits take the write lock once, so a change set is applied as a unit.
/// [`MemoryStore::set_available`] simulates an outage for retry paths.
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<State>,
    available: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Makes every subsequent call succeed (`true`) or fail with
    /// `StoreError::Unavailable` (`false`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store offline".to_string()))
        }
    }

    /// Number of candles held.
    pub async fn candle_count(&self) -> usize {
        self.state.read().await.candles.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn token(&self, address: &Address) -> Result<Option<Token>, StoreError> {
        self.check()?;
        Ok(self.state.read().await.tokens.get(address).cloned())
    }

    async fn pair(&self, id: &PairId) -> Result<Option<Pair>, StoreError> {
        self.check()?;
        Ok(self.state.read().await.pairs.get(id).cloned())
    }

    async fn pairs(&self) -> Result<Vec<Pair>, StoreError> {
        self.check()?;
        let mut pairs: Vec<Pair> = self.state.read().await.pairs.values().cloned().collect();
        pairs.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(pairs)
    }

    async fn candle(&self, key: &CandleKey) -> Result<Option<Candle>, StoreError> {
        self.check()?;
        Ok(self.state.read().await.candles.get(key).cloned())
    }

    async fn latest_candles(
        &self,
        pair: &PairId,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, StoreError> {
        self.check()?;
        let from = CandleKey {
            pair: pair.clone(),
            interval,
            bucket_start: 0,
        };
        let to = CandleKey {
            pair: pair.clone(),
            interval,
            bucket_start: u64::MAX,
        };

        Ok(self
            .state
            .read()
            .await
            .candles
            .range(from..=to)
            .rev()
            .take(limit)
            .map(|(_, candle)| candle.clone())
            .collect())
    }

    async fn listing(
        &self,
        marketplace: &Address,
        id: &str,
    ) -> Result<Option<Listing>, StoreError> {
        self.check()?;
        Ok(self
            .state
            .read()
            .await
            .listings
            .get(&(marketplace.clone(), id.to_string()))
            .cloned())
    }

    async fn is_processed(&self, event: EventId) -> Result<bool, StoreError> {
        self.check()?;
        Ok(self.state.read().await.processed.contains(&event))
    }

    async fn cursor(&self) -> Result<Option<EventId>, StoreError> {
        self.check()?;
        Ok(self.state.read().await.cursor)
    }

    async fn commit(&self, changes: ChangeSet) -> Result<(), StoreError> {
        self.check()?;
        let mut state = self.state.write().await;

        for token in changes.tokens {
            state.tokens.entry(token.address.clone()).or_insert(token);
        }
        for pair in changes.pairs {
            state.pairs.entry(pair.id.clone()).or_insert(pair);
        }
        let candles = changes.candles.len();
        for candle in changes.candles {
            state.candles.insert(candle.key(), candle);
        }
        for listing in changes.listings {
            state
                .listings
                .insert((listing.marketplace.clone(), listing.id.clone()), listing);
        }
        if let Some(event) = changes.event {
            state.processed.insert(event);
            state.cursor = Some(state.cursor.map_or(event, |c| c.max(event)));
        }

        debug!(event = ?changes.event, candles, "Committed change set");
        Ok(())
    }
}
