//! Domain model for the OHLCV candle indexer.
//!
//! This crate holds the pure, storage-agnostic parts of the pipeline:
//! - Contract addresses, tokens, pairs, listings and candles
//! - Fixed-point conversion of raw on-chain amounts into decimals
//! - Floor-aligned time bucketing over a fixed interval set
//! - Decoded chain events and the canonical trade record

/// Hex contract addresses.
pub mod address;
/// Persisted entities.
pub mod entities;
/// Error types.
pub mod error;
/// Decoded chain events and trade records.
pub mod events;
/// Decimal and bucketing helpers.
pub mod math;
/// Small value types shared across entities.
pub mod value_objects;

pub use address::Address;
pub use entities::{Candle, CandleKey, Listing, Pair, PairId, Token};
pub use error::DomainError;
pub use events::{ChainEvent, EventKind, TradeRecord, TradeSide};
pub use value_objects::{Amount, EventId, Interval};
