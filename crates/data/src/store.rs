//! The store contract shared by the indexer and the query API.

use crate::error::StoreError;
use async_trait::async_trait;
use ohlcv_domain::{Address, Candle, CandleKey, EventId, Interval, Listing, Pair, PairId, Token};

/// Page size used when a caller does not ask for one.
pub const DEFAULT_CANDLE_LIMIT: usize = 100;
/// Largest page `latest_candles` callers should request.
pub const MAX_CANDLE_LIMIT: usize = 1_000;

/// Everything one event changes, committed as a unit.
///
/// Tokens and pairs are insert-only; candles and listings replace the stored
/// row with the same key. Committing a change set with `event` set marks that
/// event as processed and advances the cursor.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub event: Option<EventId>,
    pub tokens: Vec<Token>,
    pub pairs: Vec<Pair>,
    pub candles: Vec<Candle>,
    pub listings: Vec<Listing>,
}

impl ChangeSet {
    /// Empty change set for the given event.
    #[must_use]
    pub fn for_event(event: EventId) -> Self {
        Self {
            event: Some(event),
            ..Self::default()
        }
    }

    pub fn token(&self, address: &Address) -> Option<&Token> {
        self.tokens.iter().find(|t| &t.address == address)
    }

    pub fn pair(&self, id: &PairId) -> Option<&Pair> {
        self.pairs.iter().find(|p| &p.id == id)
    }

    pub fn candle_mut(&mut self, key: &CandleKey) -> Option<&mut Candle> {
        self.candles.iter_mut().find(|c| {
            c.pair == key.pair && c.interval == key.interval && c.bucket_start == key.bucket_start
        })
    }

    /// Stages a listing, replacing an earlier staged copy.
    pub fn put_listing(&mut self, listing: Listing) {
        self.listings
            .retain(|l| !(l.marketplace == listing.marketplace && l.id == listing.id));
        self.listings.push(listing);
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
            && self.pairs.is_empty()
            && self.candles.is_empty()
            && self.listings.is_empty()
    }
}

/// Durable storage of tokens, pairs, candles and listings.
///
/// Implementations must apply a [`ChangeSet`] atomically: after `commit`
/// returns an error, none of its rows are visible.
#[async_trait]
pub trait Store: Send + Sync {
    async fn token(&self, address: &Address) -> Result<Option<Token>, StoreError>;

    async fn pair(&self, id: &PairId) -> Result<Option<Pair>, StoreError>;

    /// All pairs, oldest first.
    async fn pairs(&self) -> Result<Vec<Pair>, StoreError>;

    async fn candle(&self, key: &CandleKey) -> Result<Option<Candle>, StoreError>;

    /// Up to `limit` candles of one pair and interval, newest bucket first.
    async fn latest_candles(
        &self,
        pair: &PairId,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, StoreError>;

    async fn listing(&self, marketplace: &Address, id: &str)
    -> Result<Option<Listing>, StoreError>;

    /// Whether an event has already been committed.
    async fn is_processed(&self, event: EventId) -> Result<bool, StoreError>;

    /// Highest event committed so far.
    async fn cursor(&self) -> Result<Option<EventId>, StoreError>;

    /// Applies a change set atomically.
    async fn commit(&self, changes: ChangeSet) -> Result<(), StoreError>;
}
