//! Persistence and query façade for the candle indexer.
//!
//! The [`Store`] trait is the only way the pipeline touches state. Two
//! implementations are provided:
//! - [`MemoryStore`] for tests, dry runs and replays
//! - [`PgStore`] backed by PostgreSQL through sqlx

/// Error types.
pub mod error;
/// In-memory store.
pub mod memory;
/// PostgreSQL repositories and store.
pub mod repositories;
/// Store trait and change sets.
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use repositories::{Database, PgStore};
pub use store::{ChangeSet, DEFAULT_CANDLE_LIMIT, MAX_CANDLE_LIMIT, Store};
