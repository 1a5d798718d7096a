//! Token and pair registry.
//!
//! Looks entities up in the pending change set first, then in the store, and
//! stages whatever is missing. Nothing reaches the store until the change set
//! is committed.

use crate::error::IndexerError;
use ohlcv_data::{ChangeSet, Store};
use ohlcv_domain::{Pair, PairId, Token};
use tracing::info;

/// Registry view over a store and one event's change set.
pub struct Registry<'a> {
    store: &'a dyn Store,
    changes: &'a mut ChangeSet,
}

impl<'a> Registry<'a> {
    pub fn new(store: &'a dyn Store, changes: &'a mut ChangeSet) -> Self {
        Self { store, changes }
    }

    /// Returns the registered token, registering it if unknown.
    ///
    /// # Errors
    /// Returns `IndexerError::DecimalConflict` when the token is registered
    /// with different decimals, or a store error.
    pub async fn get_or_create_token(&mut self, token: &Token) -> Result<Token, IndexerError> {
        let existing = match self.changes.token(&token.address) {
            Some(staged) => Some(staged.clone()),
            None => self.store.token(&token.address).await?,
        };

        match existing {
            Some(registered) if registered.decimals != token.decimals => {
                Err(IndexerError::DecimalConflict {
                    address: token.address.clone(),
                    registered: registered.decimals,
                    observed: token.decimals,
                })
            }
            Some(registered) => Ok(registered),
            None => {
                info!(
                    token = %token.address,
                    decimals = token.decimals,
                    symbol = token.symbol.as_deref().unwrap_or("-"),
                    "Registering token"
                );
                self.changes.tokens.push(token.clone());
                Ok(token.clone())
            }
        }
    }

    /// Returns the pair with `id`, registering it and both tokens if unknown.
    ///
    /// # Errors
    /// Returns `IndexerError::PairConflict` when `id` is registered for other
    /// tokens, a decimal conflict, or a store error.
    pub async fn get_or_create_pair(
        &mut self,
        id: &PairId,
        token_a: &Token,
        token_b: &Token,
        created_at: u64,
        created_block: u64,
    ) -> Result<Pair, IndexerError> {
        self.get_or_create_token(token_a).await?;
        self.get_or_create_token(token_b).await?;

        let existing = match self.changes.pair(id) {
            Some(staged) => Some(staged.clone()),
            None => self.store.pair(id).await?,
        };

        match existing {
            Some(pair) if !pair.has_tokens(&token_a.address, &token_b.address) => {
                Err(IndexerError::PairConflict {
                    pair: id.clone(),
                    token0: pair.token0,
                    token1: pair.token1,
                    token_a: token_a.address.clone(),
                    token_b: token_b.address.clone(),
                })
            }
            Some(pair) => Ok(pair),
            None => {
                let pair = Pair::new(
                    id.clone(),
                    &token_a.address,
                    &token_b.address,
                    created_at,
                    created_block,
                );
                info!(
                    pair = %pair.id,
                    token0 = %pair.token0,
                    token1 = %pair.token1,
                    block = created_block,
                    "Registering pair"
                );
                self.changes.pairs.push(pair.clone());
                Ok(pair)
            }
        }
    }
}
