//! Chain event indexer producing OHLCV candles.
//!
//! This crate turns decoded chain events into candles:
//! - Configuration of network, contracts, token catalog and intervals
//! - Normalization of swaps and marketplace purchases into trade records
//! - Token and pair registration with conflict detection
//! - Multi-interval candle aggregation
//! - An event pipeline committing each event atomically, exactly once

/// Prelude module for convenient imports.
pub mod prelude;

/// Candle aggregation.
pub mod aggregator;
/// Indexer configuration.
pub mod config;
/// Error types.
pub mod error;
/// Event normalization.
pub mod normalizer;
/// Event pipeline.
pub mod pipeline;
/// Token and pair registry.
pub mod registry;
/// Pipeline counters.
pub mod stats;
