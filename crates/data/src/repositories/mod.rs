//! Repository implementations for database persistence.
//!
//! This module provides repository patterns for storing and retrieving
//! tokens, pairs, candles, listings and processed events, and the
//! [`PgStore`] that composes them behind the [`Store`](crate::Store) trait.

mod candle_repository;
mod event_repository;
mod listing_repository;
mod pair_repository;
mod pg_store;

pub use candle_repository::CandleRepository;
pub use event_repository::EventRepository;
pub use listing_repository::ListingRepository;
pub use pair_repository::PairRepository;
pub use pg_store::PgStore;

use crate::error::StoreError;
use ohlcv_domain::Address;
use primitive_types::U256;
use sqlx::PgPool;
use std::sync::Arc;

/// Database connection wrapper for repositories.
#[derive(Clone)]
pub struct Database {
    pool: Arc<PgPool>,
}

impl Database {
    /// Creates a new Database wrapper from a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Creates a new database connection from a connection string.
    ///
    /// # Arguments
    /// * `database_url` - PostgreSQL connection string
    ///
    /// # Errors
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates a PairRepository instance.
    #[must_use]
    pub fn pairs(&self) -> PairRepository {
        PairRepository::new(self.pool.clone())
    }

    /// Creates a CandleRepository instance.
    #[must_use]
    pub fn candles(&self) -> CandleRepository {
        CandleRepository::new(self.pool.clone())
    }

    /// Creates a ListingRepository instance.
    #[must_use]
    pub fn listings(&self) -> ListingRepository {
        ListingRepository::new(self.pool.clone())
    }

    /// Creates an EventRepository instance.
    #[must_use]
    pub fn events(&self) -> EventRepository {
        EventRepository::new(self.pool.clone())
    }

    /// Creates a store over this database.
    #[must_use]
    pub fn store(&self) -> PgStore {
        PgStore::new(self.clone())
    }

    /// Runs database migrations.
    ///
    /// # Errors
    /// Returns an error if migrations fail.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(include_str!("../../migrations/001_initial_schema.sql"))
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}

pub(crate) fn to_db_int(value: u64, field: &str) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::Corrupt(format!("{field} {value} exceeds BIGINT")))
}

pub(crate) fn from_db_int(value: i64, field: &str) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Corrupt(format!("negative {field}: {value}")))
}

pub(crate) fn parse_address(value: &str) -> Result<Address, StoreError> {
    Address::parse(value).map_err(|e| StoreError::Corrupt(e.to_string()))
}

pub(crate) fn parse_u256(value: &str, field: &str) -> Result<U256, StoreError> {
    U256::from_dec_str(value).map_err(|_| StoreError::Corrupt(format!("{field}: {value}")))
}
