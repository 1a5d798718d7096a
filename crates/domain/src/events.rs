//! Decoded chain events and the canonical trade record.
//!
//! Each event kind carries its own argument struct; the normalizer maps all of
//! them onto [`TradeRecord`], the only shape the aggregator consumes.

use crate::address::Address;
use crate::entities::pair::PairId;
use crate::entities::token::Token;
use crate::value_objects::EventId;
use crate::value_objects::amount::raw_amount;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A decoded log, tagged by `kind`.
///
/// ```json
/// {"kind": "swap", "address": "0x..", "block_number": 10, "log_index": 0,
///  "timestamp": 1700000000, "args": {"token_in": "0x..", ...}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainEvent {
    /// Pool swap.
    Swap(LogEvent<SwapArgs>),
    /// Marketplace listing created.
    ListingCreated(LogEvent<ListingCreatedArgs>),
    /// Marketplace purchase against a listing.
    Purchase(LogEvent<PurchaseArgs>),
}

/// Log envelope shared by every event kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent<A> {
    /// Contract that emitted the log.
    pub address: Address,
    pub block_number: u64,
    pub log_index: u64,
    /// Block timestamp, unix seconds.
    pub timestamp: u64,
    pub args: A,
}

impl<A> LogEvent<A> {
    pub fn id(&self) -> EventId {
        EventId::new(self.block_number, self.log_index)
    }
}

/// Tokens and amounts of a swap, seen from the trader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapArgs {
    #[serde(default)]
    pub sender: Option<Address>,
    pub token_in: Address,
    pub token_out: Address,
    #[serde(with = "raw_amount")]
    pub amount_in: U256,
    #[serde(with = "raw_amount")]
    pub amount_out: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingCreatedArgs {
    pub listing_id: String,
    pub seller: Address,
    pub asset: Address,
    pub payment_token: Address,
    #[serde(with = "raw_amount")]
    pub quantity: U256,
    #[serde(with = "raw_amount")]
    pub unit_price: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseArgs {
    pub listing_id: String,
    pub buyer: Address,
    /// Raw amount of the listed asset bought.
    #[serde(with = "raw_amount")]
    pub quantity: U256,
    /// Raw amount of the payment token paid.
    #[serde(with = "raw_amount")]
    pub total_price: U256,
}

/// Kind of a chain event, for logging and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Swap,
    ListingCreated,
    Purchase,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Swap => "swap",
            EventKind::ListingCreated => "listing_created",
            EventKind::Purchase => "purchase",
        }
    }
}

impl ChainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ChainEvent::Swap(_) => EventKind::Swap,
            ChainEvent::ListingCreated(_) => EventKind::ListingCreated,
            ChainEvent::Purchase(_) => EventKind::Purchase,
        }
    }

    pub fn id(&self) -> EventId {
        match self {
            ChainEvent::Swap(e) => e.id(),
            ChainEvent::ListingCreated(e) => e.id(),
            ChainEvent::Purchase(e) => e.id(),
        }
    }

    pub fn address(&self) -> &Address {
        match self {
            ChainEvent::Swap(e) => &e.address,
            ChainEvent::ListingCreated(e) => &e.address,
            ChainEvent::Purchase(e) => &e.address,
        }
    }

    pub fn timestamp(&self) -> u64 {
        match self {
            ChainEvent::Swap(e) => e.timestamp,
            ChainEvent::ListingCreated(e) => e.timestamp,
            ChainEvent::Purchase(e) => e.timestamp,
        }
    }

    pub fn block_number(&self) -> u64 {
        self.id().block_number
    }
}

/// Direction of a trade relative to the pair's token0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    /// Trader received token0.
    Buy,
    /// Trader paid token0.
    Sell,
}

/// One trade, normalized from any event kind.
///
/// `price` is token1 per token0, `volume` is in token0 and `quote_volume` in
/// token1, where token0/token1 is the pair's canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub event: EventId,
    pub pair: PairId,
    /// token0 of the pair.
    pub base: Token,
    /// token1 of the pair.
    pub quote: Token,
    pub price: Decimal,
    pub volume: Decimal,
    pub quote_volume: Decimal,
    pub side: TradeSide,
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_swap() {
        let json = r#"{
            "kind": "swap",
            "address": "0x00000000000000000000000000000000000000aa",
            "block_number": 12,
            "log_index": 3,
            "timestamp": 1700000000,
            "args": {
                "token_in": "0x0000000000000000000000000000000000000001",
                "token_out": "0x0000000000000000000000000000000000000002",
                "amount_in": "1000000",
                "amount_out": "500000000000000000000"
            }
        }"#;

        let event: ChainEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind(), EventKind::Swap);
        assert_eq!(event.id(), EventId::new(12, 3));
        assert_eq!(event.timestamp(), 1_700_000_000);
        let ChainEvent::Swap(swap) = event else {
            panic!("expected swap");
        };
        assert!(swap.args.sender.is_none());
        assert_eq!(swap.args.amount_out, U256::exp10(20) * U256::from(5u8));
    }

    #[test]
    fn test_deserialize_purchase() {
        let json = r#"{
            "kind": "purchase",
            "address": "0x00000000000000000000000000000000000000bb",
            "block_number": 20,
            "log_index": 0,
            "timestamp": 1700000100,
            "args": {
                "listing_id": "7",
                "buyer": "0x0000000000000000000000000000000000000003",
                "quantity": "2",
                "total_price": "3000000"
            }
        }"#;

        let event: ChainEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind().as_str(), "purchase");
        assert_eq!(event.block_number(), 20);
    }

    #[test]
    fn test_rejects_numeric_amounts() {
        let json = r#"{
            "kind": "swap",
            "address": "0x00000000000000000000000000000000000000aa",
            "block_number": 1, "log_index": 0, "timestamp": 1,
            "args": {
                "token_in": "0x0000000000000000000000000000000000000001",
                "token_out": "0x0000000000000000000000000000000000000002",
                "amount_in": 10, "amount_out": "1"
            }
        }"#;
        assert!(serde_json::from_str::<ChainEvent>(json).is_err());
    }
}
