//! Error types for the indexer.

use crate::config::ConfigError;
use ohlcv_data::StoreError;
use ohlcv_domain::{Address, DomainError, PairId};
use thiserror::Error;

/// Why an event could not be turned into a trade or listing.
///
/// Everything except `Store` describes a malformed event: it is logged and
/// skipped, the stream carries on.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Decimals unknown for token {0}")]
    MissingDecimals(Address),
    #[error("Zero amount on the {0} leg")]
    ZeroAmount(&'static str),
    #[error("Both legs trade token {0}")]
    SameToken(Address),
    #[error("Price rounds to zero")]
    DegeneratePrice,
    #[error("Listing {id} not found on {marketplace}")]
    UnknownListing { marketplace: Address, id: String },
    #[error("Listing {id} already exists on {marketplace}")]
    DuplicateListing { marketplace: Address, id: String },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl NormalizeError {
    /// Whether the event itself is at fault, as opposed to the store.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, NormalizeError::Store(_))
    }
}

/// Errors that stop the indexer.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Token {address} is registered with {registered} decimals, event implies {observed}")]
    DecimalConflict {
        address: Address,
        registered: u8,
        observed: u8,
    },
    #[error("Pair {pair} is registered as {token0}/{token1}, event trades {token_a}/{token_b}")]
    PairConflict {
        pair: PairId,
        token0: Address,
        token1: Address,
        token_a: Address,
        token_b: Address,
    },
    /// A trade that cannot be folded into its candles. The event is skipped.
    #[error("Cannot aggregate trade: {0}")]
    Malformed(#[from] DomainError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IndexerError {
    /// Whether the error is permanent. Store errors are transient: the
    /// failed event was not committed and can be delivered again. Malformed
    /// trades only cost their own event.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, IndexerError::Store(_) | IndexerError::Malformed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_are_retryable() {
        let err = IndexerError::from(StoreError::Unavailable("down".to_string()));
        assert!(!err.is_fatal());

        let err = NormalizeError::from(StoreError::Unavailable("down".to_string()));
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_conflicts_are_fatal() {
        let address = Address::parse("0x0000000000000000000000000000000000000001").unwrap();
        let err = IndexerError::DecimalConflict {
            address,
            registered: 18,
            observed: 6,
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("18 decimals"));
    }

    #[test]
    fn test_domain_errors_are_malformed() {
        let err = NormalizeError::from(DomainError::DivisionByZero);
        assert!(err.is_malformed());
        assert!(NormalizeError::DegeneratePrice.is_malformed());

        let err = IndexerError::from(DomainError::AmountOverflow("1 + 1".to_string()));
        assert!(!err.is_fatal());
    }
}
