use crate::address::Address;
use crate::error::DomainError;
use crate::value_objects::amount::raw_amount;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// A marketplace listing: `quantity` of `asset` offered for `payment_token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    /// Marketplace contract that emitted the listing.
    pub marketplace: Address,
    pub seller: Address,
    pub asset: Address,
    pub payment_token: Address,
    #[serde(with = "raw_amount")]
    pub quantity: U256,
    #[serde(with = "raw_amount")]
    pub remaining: U256,
    /// Asking price in raw payment units per whole asset unit.
    #[serde(with = "raw_amount")]
    pub unit_price: U256,
    pub created_at: u64,
    pub created_block: u64,
}

impl Listing {
    /// Takes `quantity` off the listing.
    ///
    /// # Errors
    /// Returns `DomainError::ListingExhausted` when less than `quantity` is left.
    pub fn fill(&mut self, quantity: U256) -> Result<(), DomainError> {
        if quantity > self.remaining {
            return Err(DomainError::ListingExhausted {
                listing: self.id.clone(),
                remaining: self.remaining.to_string(),
                requested: quantity.to_string(),
            });
        }
        self.remaining = self.remaining - quantity;
        Ok(())
    }

    pub fn is_sold_out(&self) -> bool {
        self.remaining.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(quantity: u64) -> Listing {
        let addr = |n: u8| Address::parse(&format!("0x{:040x}", n)).unwrap();
        Listing {
            id: "1".to_string(),
            marketplace: addr(1),
            seller: addr(2),
            asset: addr(3),
            payment_token: addr(4),
            quantity: U256::from(quantity),
            remaining: U256::from(quantity),
            unit_price: U256::from(5u8),
            created_at: 1_700_000_000,
            created_block: 10,
        }
    }

    #[test]
    fn test_fill_decrements_remaining() {
        let mut l = listing(10);
        l.fill(U256::from(4u8)).unwrap();
        assert_eq!(l.remaining, U256::from(6u8));
        l.fill(U256::from(6u8)).unwrap();
        assert!(l.is_sold_out());
    }

    #[test]
    fn test_fill_rejects_over_purchase() {
        let mut l = listing(3);
        let err = l.fill(U256::from(4u8)).unwrap_err();
        assert!(matches!(err, DomainError::ListingExhausted { .. }));
        assert_eq!(l.remaining, U256::from(3u8));
    }
}
