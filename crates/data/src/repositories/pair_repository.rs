//! Token and pair persistence.

use super::{from_db_int, parse_address, to_db_int};
use crate::error::StoreError;
use ohlcv_domain::{Address, Pair, PairId, Token};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use std::sync::Arc;

fn token_from_row(row: &PgRow) -> Result<Token, StoreError> {
    let address: String = row.try_get("address")?;
    let decimals: i16 = row.try_get("decimals")?;
    Ok(Token {
        address: parse_address(&address)?,
        decimals: u8::try_from(decimals)
            .map_err(|_| StoreError::Corrupt(format!("token {address} decimals {decimals}")))?,
        symbol: row.try_get("symbol")?,
    })
}

fn pair_from_row(row: &PgRow) -> Result<Pair, StoreError> {
    let id: String = row.try_get("id")?;
    let token0: String = row.try_get("token0")?;
    let token1: String = row.try_get("token1")?;
    Ok(Pair {
        id: PairId::from(id),
        token0: parse_address(&token0)?,
        token1: parse_address(&token1)?,
        created_at: from_db_int(row.try_get("created_at")?, "created_at")?,
        created_block: from_db_int(row.try_get("created_block")?, "created_block")?,
    })
}

/// Repository for tokens and pairs.
#[derive(Clone)]
pub struct PairRepository {
    pool: Arc<PgPool>,
}

impl PairRepository {
    /// Creates a new PairRepository.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Finds a token by address.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_token(&self, address: &Address) -> Result<Option<Token>, StoreError> {
        let row = sqlx::query("SELECT address, decimals, symbol FROM tokens WHERE address = $1")
            .bind(address.as_str())
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.as_ref().map(token_from_row).transpose()
    }

    /// Finds a pair by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_pair(&self, id: &PairId) -> Result<Option<Pair>, StoreError> {
        let row = sqlx::query("SELECT * FROM pairs WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.as_ref().map(pair_from_row).transpose()
    }

    /// Finds all pairs, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_all(&self) -> Result<Vec<Pair>, StoreError> {
        let rows = sqlx::query("SELECT * FROM pairs ORDER BY created_at ASC, id ASC")
            .fetch_all(self.pool.as_ref())
            .await?;
        rows.iter().map(pair_from_row).collect()
    }

    /// Inserts a token unless one with the same address exists.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn insert_token(conn: &mut PgConnection, token: &Token) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO tokens (address, decimals, symbol)
            VALUES ($1, $2, $3)
            ON CONFLICT (address) DO NOTHING
            "#,
        )
        .bind(token.address.as_str())
        .bind(i16::from(token.decimals))
        .bind(token.symbol.as_deref())
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Inserts a pair unless one with the same id exists.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn insert_pair(conn: &mut PgConnection, pair: &Pair) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO pairs (id, token0, token1, created_at, created_block)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(pair.id.as_str())
        .bind(pair.token0.as_str())
        .bind(pair.token1.as_str())
        .bind(to_db_int(pair.created_at, "created_at")?)
        .bind(to_db_int(pair.created_block, "created_block")?)
        .execute(conn)
        .await?;
        Ok(())
    }
}
