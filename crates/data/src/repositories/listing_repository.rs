//! Marketplace listing persistence.

use super::{from_db_int, parse_address, parse_u256, to_db_int};
use crate::error::StoreError;
use ohlcv_domain::{Address, Listing};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use std::sync::Arc;

fn listing_from_row(row: &PgRow) -> Result<Listing, StoreError> {
    let text = |column: &str| -> Result<String, StoreError> { Ok(row.try_get(column)?) };
    Ok(Listing {
        id: text("id")?,
        marketplace: parse_address(&text("marketplace")?)?,
        seller: parse_address(&text("seller")?)?,
        asset: parse_address(&text("asset")?)?,
        payment_token: parse_address(&text("payment_token")?)?,
        quantity: parse_u256(&text("quantity")?, "quantity")?,
        remaining: parse_u256(&text("remaining")?, "remaining")?,
        unit_price: parse_u256(&text("unit_price")?, "unit_price")?,
        created_at: from_db_int(row.try_get("created_at")?, "created_at")?,
        created_block: from_db_int(row.try_get("created_block")?, "created_block")?,
    })
}

/// Repository for marketplace listings.
#[derive(Clone)]
pub struct ListingRepository {
    pool: Arc<PgPool>,
}

impl ListingRepository {
    /// Creates a new ListingRepository.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Finds a listing by marketplace and listing id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find(&self, marketplace: &Address, id: &str) -> Result<Option<Listing>, StoreError> {
        let row = sqlx::query("SELECT * FROM listings WHERE marketplace = $1 AND id = $2")
            .bind(marketplace.as_str())
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.as_ref().map(listing_from_row).transpose()
    }

    /// Creates or replaces a listing.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn upsert(conn: &mut PgConnection, listing: &Listing) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO listings (marketplace, id, seller, asset, payment_token, quantity,
                                  remaining, unit_price, created_at, created_block)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (marketplace, id) DO UPDATE SET
                remaining = EXCLUDED.remaining
            "#,
        )
        .bind(listing.marketplace.as_str())
        .bind(&listing.id)
        .bind(listing.seller.as_str())
        .bind(listing.asset.as_str())
        .bind(listing.payment_token.as_str())
        .bind(listing.quantity.to_string())
        .bind(listing.remaining.to_string())
        .bind(listing.unit_price.to_string())
        .bind(to_db_int(listing.created_at, "created_at")?)
        .bind(to_db_int(listing.created_block, "created_block")?)
        .execute(conn)
        .await?;
        Ok(())
    }
}
