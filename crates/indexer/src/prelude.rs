//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use ohlcv_indexer::prelude::*;
//! ```

pub use crate::aggregator::Aggregator;
pub use crate::config::{ConfigError, IndexerConfig, PairKeyStrategy, TokenConfig};
pub use crate::error::{IndexerError, NormalizeError};
pub use crate::normalizer::{Normalized, Normalizer};
pub use crate::pipeline::{Indexer, Outcome};
pub use crate::registry::Registry;
pub use crate::stats::{IndexerStats, StatsSnapshot};
