//! Event pipeline: filter, dedupe, normalize, aggregate, commit.

use crate::aggregator::Aggregator;
use crate::config::IndexerConfig;
use crate::error::{IndexerError, NormalizeError};
use crate::normalizer::{Normalized, Normalizer};
use crate::stats::{IndexerStats, StatsSnapshot};
use ohlcv_data::{ChangeSet, Store};
use ohlcv_domain::ChainEvent;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What happened to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Outside the configured block range or contract set.
    Ignored,
    /// Already committed earlier.
    Duplicate,
    /// Malformed; nothing was written.
    Skipped { reason: String },
    /// Trade committed into `candles` candles.
    Applied { candles: usize },
    /// Listing committed.
    ListingRecorded,
}

/// Turns a stream of chain events into candles.
///
/// Each event is committed as one change set, together with its processed
/// marker, so a redelivered event is detected and a failed one leaves no
/// trace.
pub struct Indexer {
    store: Arc<dyn Store>,
    config: IndexerConfig,
    normalizer: Normalizer,
    aggregator: Aggregator,
    stats: IndexerStats,
}

impl Indexer {
    /// Creates an indexer writing to `store`.
    ///
    /// # Errors
    /// Returns `IndexerError::Config` if the configuration is invalid.
    pub fn new(store: Arc<dyn Store>, config: IndexerConfig) -> Result<Self, IndexerError> {
        config.validate()?;

        info!(
            network = %config.network,
            start_block = config.start_block,
            contracts = config.contracts.len(),
            tokens = config.tokens.len(),
            intervals = ?config.intervals,
            pair_key = ?config.pair_key,
            "Indexer configured"
        );

        Ok(Self {
            normalizer: Normalizer::new(&config),
            aggregator: Aggregator::new(config.intervals.clone()),
            stats: IndexerStats::new(),
            store,
            config,
        })
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Counters so far.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Handles one event.
    ///
    /// Malformed events are skipped and reported as [`Outcome::Skipped`].
    ///
    /// # Errors
    /// Returns a fatal registry conflict, or a store error after which the
    /// same event can be handled again.
    pub async fn handle(&self, event: &ChainEvent) -> Result<Outcome, IndexerError> {
        let id = event.id();
        let kind = event.kind().as_str();

        if !self.config.accepts(event) {
            debug!(event = %id, kind, contract = %event.address(), "Ignoring event");
            self.stats.record_ignored();
            return Ok(Outcome::Ignored);
        }

        if self.store.is_processed(id).await? {
            debug!(event = %id, kind, "Event already processed");
            self.stats.record_duplicate();
            return Ok(Outcome::Duplicate);
        }

        if let Some(cursor) = self.store.cursor().await?
            && id < cursor
        {
            warn!(event = %id, kind, cursor = %cursor, "Late event, merging by event order");
            self.stats.record_late();
        }

        let normalized = match self.normalizer.normalize(event, self.store.as_ref()).await {
            Ok(normalized) => normalized,
            Err(NormalizeError::Store(e)) => {
                error!(event = %id, kind, error = %e, "Store read failed");
                return Err(e.into());
            }
            Err(e) => {
                warn!(event = %id, kind, reason = %e, "Skipping malformed event");
                self.stats.record_skipped();
                return Ok(Outcome::Skipped {
                    reason: e.to_string(),
                });
            }
        };

        let mut changes = ChangeSet::for_event(id);
        let outcome = match normalized {
            Normalized::Listing(listing) => {
                info!(
                    event = %id,
                    listing = %listing.id,
                    marketplace = %listing.marketplace,
                    asset = %listing.asset,
                    "Listing created"
                );
                changes.put_listing(listing);
                Outcome::ListingRecorded
            }
            Normalized::Trade { trade, listing } => {
                if let Some(listing) = listing {
                    if listing.is_sold_out() {
                        info!(
                            event = %id,
                            listing = %listing.id,
                            marketplace = %listing.marketplace,
                            "Listing sold out"
                        );
                    }
                    changes.put_listing(listing);
                }
                let candles = match self
                    .aggregator
                    .apply(&trade, self.store.as_ref(), &mut changes)
                    .await
                {
                    Ok(candles) => candles,
                    Err(IndexerError::Malformed(e)) => {
                        warn!(
                            event = %id,
                            kind,
                            pair = %trade.pair,
                            reason = %e,
                            "Skipping trade that overflows its candles"
                        );
                        self.stats.record_skipped();
                        return Ok(Outcome::Skipped {
                            reason: e.to_string(),
                        });
                    }
                    Err(e) => {
                        error!(event = %id, kind, error = %e, "Aggregation failed");
                        return Err(e);
                    }
                };
                debug!(
                    event = %id,
                    pair = %trade.pair,
                    price = %trade.price,
                    volume = %trade.volume,
                    side = ?trade.side,
                    "Trade aggregated"
                );
                Outcome::Applied { candles }
            }
        };

        self.store
            .commit(changes)
            .await
            .inspect_err(|e| error!(event = %id, kind, error = %e, "Commit failed"))?;

        match &outcome {
            Outcome::Applied { candles } => self.stats.record_applied(*candles),
            Outcome::ListingRecorded => self.stats.record_listing(),
            _ => {}
        }
        Ok(outcome)
    }

    /// Handles events in order.
    ///
    /// Skipped, ignored and duplicate events do not stop the run.
    ///
    /// # Errors
    /// Stops at the first error. Every event before it is committed; the
    /// failing one is not.
    pub async fn run<I>(&self, events: I) -> Result<StatsSnapshot, IndexerError>
    where
        I: IntoIterator<Item = ChainEvent>,
    {
        for event in events {
            self.handle(&event).await?;
        }

        let stats = self.stats();
        info!(
            applied = stats.applied,
            listings = stats.listings,
            duplicates = stats.duplicates,
            skipped = stats.skipped,
            ignored = stats.ignored,
            late = stats.late,
            "Run complete"
        );
        Ok(stats)
    }
}
