use crate::error::DomainError;
use crate::math::decimal;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A raw on-chain amount together with the decimals of its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    #[serde(with = "raw_amount")]
    pub raw: U256,
    pub decimals: u8,
}

impl Amount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn to_decimal(&self) -> Result<Decimal, DomainError> {
        decimal::to_decimal(self.raw, self.decimals)
    }
}

/// Parses a base-10 integer string into a raw amount.
///
/// # Errors
/// Returns `DomainError::InvalidAmount` for anything but ASCII digits.
pub fn parse_raw(input: &str) -> Result<U256, DomainError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::InvalidAmount(input.to_string()));
    }
    U256::from_dec_str(trimmed).map_err(|_| DomainError::InvalidAmount(input.to_string()))
}

/// Serde adapter encoding `U256` as a base-10 string.
///
/// Event payloads carry uint256 values as decimal strings; JSON numbers would
/// lose precision past 2^53.
pub mod raw_amount {
    use super::parse_raw;
    use primitive_types::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_raw(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_to_decimal() {
        let amount = Amount::new(U256::from(2_500_000u64), 6);
        assert_eq!(amount.to_decimal().unwrap(), dec!(2.5));
    }

    #[test]
    fn test_parse_raw() {
        assert_eq!(parse_raw("42").unwrap(), U256::from(42u8));
        assert!(parse_raw("-1").is_err());
        assert!(parse_raw("0x10").is_err());
        assert!(parse_raw("").is_err());
    }

    #[test]
    fn test_raw_amount_serde() {
        let amount = Amount::new(U256::exp10(24), 18);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, r#"{"raw":"1000000000000000000000000","decimals":18}"#);
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
