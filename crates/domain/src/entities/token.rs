use crate::address::Address;
use crate::value_objects::amount::Amount;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// A fungible token. Decimals never change once a token is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub decimals: u8,
    pub symbol: Option<String>,
}

impl Token {
    pub fn new(address: Address, decimals: u8) -> Self {
        Self {
            address,
            decimals,
            symbol: None,
        }
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Wraps a raw amount of this token.
    pub fn amount(&self, raw: U256) -> Amount {
        Amount::new(raw, self.decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_uses_token_decimals() {
        let usdc = Token::new(
            Address::parse("0x0000000000000000000000000000000000000002").unwrap(),
            6,
        )
        .with_symbol("USDC");

        assert_eq!(usdc.symbol.as_deref(), Some("USDC"));
        let amount = usdc.amount(U256::from(1_500_000u64));
        assert_eq!(amount.decimals, 6);
        assert_eq!(amount.to_decimal().unwrap(), dec!(1.5));
    }
}
