//! Turns decoded chain events into trade records.
//!
//! A trade is seen as two legs, what the trader paid and what they received.
//! The legs are oriented onto the pair's canonical token order: the lower
//! address is token0, prices are token1 per token0.

use crate::config::{IndexerConfig, PairKeyStrategy};
use crate::error::NormalizeError;
use ohlcv_data::Store;
use ohlcv_domain::events::{ListingCreatedArgs, LogEvent, PurchaseArgs, SwapArgs};
use ohlcv_domain::math::ratio;
use ohlcv_domain::{
    Address, ChainEvent, EventId, Listing, PairId, Token, TradeRecord, TradeSide,
};
use primitive_types::U256;
use std::collections::HashMap;
use tracing::trace;

/// Result of normalizing one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// A trade, with the listing it filled for marketplace purchases.
    Trade {
        trade: TradeRecord,
        listing: Option<Listing>,
    },
    /// A new marketplace listing. No trade happened yet.
    Listing(Listing),
}

/// One side of a trade.
#[derive(Debug, Clone)]
struct Leg {
    token: Token,
    amount: U256,
}

/// Event normalizer.
pub struct Normalizer {
    /// Token catalog from configuration.
    catalog: HashMap<Address, Token>,
    pair_key: PairKeyStrategy,
}

impl Normalizer {
    /// Creates a normalizer over the configured token catalog.
    pub fn new(config: &IndexerConfig) -> Self {
        Self {
            catalog: config
                .tokens
                .iter()
                .map(|t| (t.address.clone(), t.to_token()))
                .collect(),
            pair_key: config.pair_key,
        }
    }

    /// Normalizes an event.
    ///
    /// Reads the store for token decimals missing from the catalog and for
    /// the listing a purchase fills. Nothing is written.
    ///
    /// # Errors
    /// Returns a malformed-event error when the event cannot be priced, or
    /// `NormalizeError::Store` when a read fails.
    pub async fn normalize(
        &self,
        event: &ChainEvent,
        store: &dyn Store,
    ) -> Result<Normalized, NormalizeError> {
        match event {
            ChainEvent::Swap(swap) => self.swap(swap, store).await,
            ChainEvent::ListingCreated(created) => self.listing_created(created, store).await,
            ChainEvent::Purchase(purchase) => self.purchase(purchase, store).await,
        }
    }

    async fn swap(
        &self,
        event: &LogEvent<SwapArgs>,
        store: &dyn Store,
    ) -> Result<Normalized, NormalizeError> {
        let args = &event.args;
        let paid = Leg {
            token: self.resolve_token(&args.token_in, store).await?,
            amount: args.amount_in,
        };
        let received = Leg {
            token: self.resolve_token(&args.token_out, store).await?,
            amount: args.amount_out,
        };

        let pair = match self.pair_key {
            PairKeyStrategy::SortedTokens => {
                PairId::for_tokens(&args.token_in, &args.token_out)
            }
            PairKeyStrategy::Contract => PairId::for_contract(&event.address),
        };

        let trade = trade_from_legs(event.id(), pair, paid, received, event.timestamp)?;
        Ok(Normalized::Trade {
            trade,
            listing: None,
        })
    }

    async fn listing_created(
        &self,
        event: &LogEvent<ListingCreatedArgs>,
        store: &dyn Store,
    ) -> Result<Normalized, NormalizeError> {
        let args = &event.args;
        if args.quantity.is_zero() {
            return Err(NormalizeError::ZeroAmount("quantity"));
        }
        if args.asset == args.payment_token {
            return Err(NormalizeError::SameToken(args.asset.clone()));
        }
        if store.listing(&event.address, &args.listing_id).await?.is_some() {
            return Err(NormalizeError::DuplicateListing {
                marketplace: event.address.clone(),
                id: args.listing_id.clone(),
            });
        }

        Ok(Normalized::Listing(Listing {
            id: args.listing_id.clone(),
            marketplace: event.address.clone(),
            seller: args.seller.clone(),
            asset: args.asset.clone(),
            payment_token: args.payment_token.clone(),
            quantity: args.quantity,
            remaining: args.quantity,
            unit_price: args.unit_price,
            created_at: event.timestamp,
            created_block: event.block_number,
        }))
    }

    async fn purchase(
        &self,
        event: &LogEvent<PurchaseArgs>,
        store: &dyn Store,
    ) -> Result<Normalized, NormalizeError> {
        let args = &event.args;
        let mut listing = store
            .listing(&event.address, &args.listing_id)
            .await?
            .ok_or_else(|| NormalizeError::UnknownListing {
                marketplace: event.address.clone(),
                id: args.listing_id.clone(),
            })?;

        let paid = Leg {
            token: self.resolve_token(&listing.payment_token, store).await?,
            amount: args.total_price,
        };
        let received = Leg {
            token: self.resolve_token(&listing.asset, store).await?,
            amount: args.quantity,
        };
        let pair = PairId::for_tokens(&listing.payment_token, &listing.asset);
        let trade = trade_from_legs(event.id(), pair, paid, received, event.timestamp)?;

        listing.fill(args.quantity)?;
        Ok(Normalized::Trade {
            trade,
            listing: Some(listing),
        })
    }

    /// Token with known decimals: the catalog first, then the registry.
    async fn resolve_token(
        &self,
        address: &Address,
        store: &dyn Store,
    ) -> Result<Token, NormalizeError> {
        if let Some(token) = self.catalog.get(address) {
            return Ok(token.clone());
        }
        store
            .token(address)
            .await?
            .ok_or_else(|| NormalizeError::MissingDecimals(address.clone()))
    }
}

/// Builds a trade record from the trader's two legs.
fn trade_from_legs(
    event: EventId,
    pair: PairId,
    paid: Leg,
    received: Leg,
    timestamp: u64,
) -> Result<TradeRecord, NormalizeError> {
    if paid.token.address == received.token.address {
        return Err(NormalizeError::SameToken(paid.token.address));
    }
    if paid.amount.is_zero() {
        return Err(NormalizeError::ZeroAmount("paid"));
    }
    if received.amount.is_zero() {
        return Err(NormalizeError::ZeroAmount("received"));
    }

    let (base, quote, side) = if received.token.address < paid.token.address {
        (received, paid, TradeSide::Buy)
    } else {
        (paid, received, TradeSide::Sell)
    };

    let volume = base.token.amount(base.amount).to_decimal()?;
    let quote_volume = quote.token.amount(quote.amount).to_decimal()?;
    let price = ratio(quote_volume, volume)?;
    if price.is_zero() {
        return Err(NormalizeError::DegeneratePrice);
    }

    trace!(event = %event, pair = %pair, price = %price, "Normalized trade");

    Ok(TradeRecord {
        event,
        pair,
        base: base.token,
        quote: quote.token,
        price,
        volume,
        quote_volume,
        side,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use ohlcv_data::{ChangeSet, MemoryStore};
    use rust_decimal_macros::dec;

    fn addr(n: u64) -> Address {
        Address::parse(&format!("0x{n:040x}")).unwrap()
    }

    const WETH: u64 = 0x01;
    const USDC: u64 = 0x02;
    const POOL: u64 = 0xaa;
    const MARKET: u64 = 0xbb;

    fn config(pair_key: PairKeyStrategy) -> IndexerConfig {
        IndexerConfig {
            tokens: vec![
                TokenConfig {
                    address: addr(WETH),
                    decimals: 18,
                    symbol: Some("WETH".to_string()),
                },
                TokenConfig {
                    address: addr(USDC),
                    decimals: 6,
                    symbol: Some("USDC".to_string()),
                },
            ],
            pair_key,
            ..IndexerConfig::default()
        }
    }

    fn swap(token_in: u64, token_out: u64, amount_in: &str, amount_out: &str) -> ChainEvent {
        ChainEvent::Swap(LogEvent {
            address: addr(POOL),
            block_number: 10,
            log_index: 1,
            timestamp: 1_700_000_000,
            args: SwapArgs {
                sender: None,
                token_in: addr(token_in),
                token_out: addr(token_out),
                amount_in: U256::from_dec_str(amount_in).unwrap(),
                amount_out: U256::from_dec_str(amount_out).unwrap(),
            },
        })
    }

    fn trade(normalized: Normalized) -> TradeRecord {
        match normalized {
            Normalized::Trade { trade, .. } => trade,
            other => panic!("expected trade, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_swap_orients_onto_token0() {
        let normalizer = Normalizer::new(&config(PairKeyStrategy::SortedTokens));
        let store = MemoryStore::new();

        // Pay 3000 USDC, receive 1.5 WETH: a buy of token0 at 2000.
        let buy = swap(USDC, WETH, "3000000000", "1500000000000000000");
        let t = trade(normalizer.normalize(&buy, &store).await.unwrap());
        assert_eq!(t.base.address, addr(WETH));
        assert_eq!(t.quote.address, addr(USDC));
        assert_eq!(t.price, dec!(2000));
        assert_eq!(t.volume, dec!(1.5));
        assert_eq!(t.quote_volume, dec!(3000));
        assert_eq!(t.side, TradeSide::Buy);
        assert_eq!(t.event, EventId::new(10, 1));

        // Opposite direction, same pair and same price.
        let sell = swap(WETH, USDC, "1500000000000000000", "3000000000");
        let s = trade(normalizer.normalize(&sell, &store).await.unwrap());
        assert_eq!(s.pair, t.pair);
        assert_eq!(s.price, dec!(2000));
        assert_eq!(s.side, TradeSide::Sell);
    }

    #[tokio::test]
    async fn test_contract_pair_key() {
        let normalizer = Normalizer::new(&config(PairKeyStrategy::Contract));
        let store = MemoryStore::new();
        let event = swap(USDC, WETH, "3000000000", "1500000000000000000");

        let t = trade(normalizer.normalize(&event, &store).await.unwrap());
        assert_eq!(t.pair, PairId::for_contract(&addr(POOL)));
    }

    #[tokio::test]
    async fn test_malformed_swaps() {
        let normalizer = Normalizer::new(&config(PairKeyStrategy::SortedTokens));
        let store = MemoryStore::new();

        let zero = swap(USDC, WETH, "0", "1500000000000000000");
        assert!(matches!(
            normalizer.normalize(&zero, &store).await,
            Err(NormalizeError::ZeroAmount("paid"))
        ));

        let same = swap(WETH, WETH, "1", "1");
        assert!(matches!(
            normalizer.normalize(&same, &store).await,
            Err(NormalizeError::SameToken(_))
        ));

        let unknown = swap(USDC, 0x99, "1", "1");
        let err = normalizer.normalize(&unknown, &store).await.unwrap_err();
        assert!(matches!(err, NormalizeError::MissingDecimals(ref a) if *a == addr(0x99)));
        assert!(err.is_malformed());
    }

    #[tokio::test]
    async fn test_decimals_fall_back_to_registry() {
        let normalizer = Normalizer::new(&config(PairKeyStrategy::SortedTokens));
        let store = MemoryStore::new();
        let mut changes = ChangeSet::default();
        changes.tokens.push(Token::new(addr(0x03), 8));
        store.commit(changes).await.unwrap();

        // 1 unit of an 8-decimals token for 50 USDC.
        let event = swap(USDC, 0x03, "50000000", "100000000");
        let t = trade(normalizer.normalize(&event, &store).await.unwrap());
        assert_eq!(t.base.address, addr(USDC));
        assert_eq!(t.quote.decimals, 8);
        assert_eq!(t.price, dec!(0.02));
    }

    #[tokio::test]
    async fn test_store_failure_is_not_malformed() {
        let normalizer = Normalizer::new(&config(PairKeyStrategy::SortedTokens));
        let store = MemoryStore::new();
        store.set_available(false);

        let event = swap(USDC, 0x03, "1", "1");
        let err = normalizer.normalize(&event, &store).await.unwrap_err();
        assert!(!err.is_malformed());
    }

    fn listing_created(id: &str, quantity: &str) -> ChainEvent {
        ChainEvent::ListingCreated(LogEvent {
            address: addr(MARKET),
            block_number: 20,
            log_index: 0,
            timestamp: 1_700_000_000,
            args: ListingCreatedArgs {
                listing_id: id.to_string(),
                seller: addr(0x50),
                asset: addr(WETH),
                payment_token: addr(USDC),
                quantity: U256::from_dec_str(quantity).unwrap(),
                unit_price: U256::from(2_000_000_000u64),
            },
        })
    }

    fn purchase(id: &str, quantity: &str, total_price: &str) -> ChainEvent {
        ChainEvent::Purchase(LogEvent {
            address: addr(MARKET),
            block_number: 21,
            log_index: 4,
            timestamp: 1_700_000_100,
            args: PurchaseArgs {
                listing_id: id.to_string(),
                buyer: addr(0x60),
                quantity: U256::from_dec_str(quantity).unwrap(),
                total_price: U256::from_dec_str(total_price).unwrap(),
            },
        })
    }

    #[tokio::test]
    async fn test_listing_then_purchase() {
        let normalizer = Normalizer::new(&config(PairKeyStrategy::Contract));
        let store = MemoryStore::new();

        let created = normalizer
            .normalize(&listing_created("7", "2000000000000000000"), &store)
            .await
            .unwrap();
        let Normalized::Listing(listing) = created else {
            panic!("expected listing");
        };
        assert_eq!(listing.remaining, listing.quantity);
        let mut changes = ChangeSet::default();
        changes.put_listing(listing);
        store.commit(changes).await.unwrap();

        // Buy 0.5 WETH for 1000 USDC.
        let bought = normalizer
            .normalize(&purchase("7", "500000000000000000", "1000000000"), &store)
            .await
            .unwrap();
        let Normalized::Trade { trade, listing } = bought else {
            panic!("expected trade");
        };
        assert_eq!(trade.pair, PairId::for_tokens(&addr(WETH), &addr(USDC)));
        assert_eq!(trade.price, dec!(2000));
        assert_eq!(trade.volume, dec!(0.5));
        assert_eq!(trade.side, TradeSide::Buy);
        let listing = listing.unwrap();
        assert_eq!(
            listing.remaining,
            U256::from_dec_str("1500000000000000000").unwrap()
        );
    }

    #[tokio::test]
    async fn test_invalid_purchases() {
        let normalizer = Normalizer::new(&config(PairKeyStrategy::SortedTokens));
        let store = MemoryStore::new();

        let unknown = normalizer
            .normalize(&purchase("missing", "1", "1"), &store)
            .await;
        assert!(matches!(unknown, Err(NormalizeError::UnknownListing { .. })));

        let Normalized::Listing(listing) = normalizer
            .normalize(&listing_created("8", "1000"), &store)
            .await
            .unwrap()
        else {
            panic!("expected listing");
        };
        let mut changes = ChangeSet::default();
        changes.put_listing(listing);
        store.commit(changes).await.unwrap();

        let over = normalizer
            .normalize(&purchase("8", "1001", "1"), &store)
            .await;
        assert!(matches!(over, Err(NormalizeError::Domain(_))));

        let again = normalizer
            .normalize(&listing_created("8", "1000"), &store)
            .await;
        assert!(matches!(again, Err(NormalizeError::DuplicateListing { .. })));

        let empty = normalizer
            .normalize(&listing_created("9", "0"), &store)
            .await;
        assert!(matches!(empty, Err(NormalizeError::ZeroAmount("quantity"))));
    }
}
