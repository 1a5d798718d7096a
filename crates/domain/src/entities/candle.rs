use crate::entities::pair::PairId;
use crate::events::TradeRecord;
use crate::error::DomainError;
use crate::math::{bucket_end, bucket_start, decimal};
use crate::value_objects::{EventId, Interval};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Composite identity of a candle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandleKey {
    pub pair: PairId,
    pub interval: Interval,
    pub bucket_start: u64,
}

impl CandleKey {
    /// Key of the bucket that contains `timestamp`.
    pub fn containing(pair: PairId, interval: Interval, timestamp: u64) -> Self {
        Self {
            pair,
            interval,
            bucket_start: bucket_start(timestamp, interval),
        }
    }

    /// Flat identifier: `{pair}-{interval_secs}-{bucket_start}`.
    pub fn id(&self) -> String {
        format!(
            "{}-{}-{}",
            self.pair,
            self.interval.as_secs(),
            self.bucket_start
        )
    }
}

/// OHLCV aggregate over one bucket of one pair at one interval.
///
/// `open_event` and `close_event` record which trades set the open and close
/// prices, so a trade delivered late still lands in the position its
/// `(block_number, log_index)` gives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub pair: PairId,
    pub interval: Interval,
    pub bucket_start: u64,

    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,

    /// Traded amount of token0.
    pub volume: Decimal,
    /// Traded amount of token1.
    pub quote_volume: Decimal,
    pub trades: u64,

    pub open_event: EventId,
    pub close_event: EventId,
}

impl Candle {
    /// Opens a candle from the first trade seen in its bucket.
    pub fn first(key: CandleKey, trade: &TradeRecord) -> Self {
        Self {
            pair: key.pair,
            interval: key.interval,
            bucket_start: key.bucket_start,
            open: trade.price,
            high: trade.price,
            low: trade.price,
            close: trade.price,
            volume: trade.volume,
            quote_volume: trade.quote_volume,
            trades: 1,
            open_event: trade.event,
            close_event: trade.event,
        }
    }

    /// Folds another trade from the same bucket into the candle.
    ///
    /// # Errors
    /// Returns `DomainError::AmountOverflow` when a volume sum leaves the
    /// decimal range. The candle is left untouched.
    pub fn merge(&mut self, trade: &TradeRecord) -> Result<(), DomainError> {
        debug_assert!(self.contains(trade.timestamp));

        let volume = self.volume.checked_add(trade.volume).ok_or_else(|| {
            DomainError::AmountOverflow(format!("{} + {}", self.volume, trade.volume))
        })?;
        let quote_volume = self
            .quote_volume
            .checked_add(trade.quote_volume)
            .ok_or_else(|| {
                DomainError::AmountOverflow(format!(
                    "{} + {}",
                    self.quote_volume, trade.quote_volume
                ))
            })?;

        self.high = decimal::max(self.high, trade.price);
        self.low = decimal::min(self.low, trade.price);
        self.volume = volume;
        self.quote_volume = quote_volume;
        self.trades += 1;

        if trade.event > self.close_event {
            self.close = trade.price;
            self.close_event = trade.event;
        }
        if trade.event < self.open_event {
            self.open = trade.price;
            self.open_event = trade.event;
        }
        Ok(())
    }

    pub fn key(&self) -> CandleKey {
        CandleKey {
            pair: self.pair.clone(),
            interval: self.interval,
            bucket_start: self.bucket_start,
        }
    }

    pub fn id(&self) -> String {
        self.key().id()
    }

    /// Whether `timestamp` falls inside this candle's bucket.
    pub fn contains(&self, timestamp: u64) -> bool {
        timestamp >= self.bucket_start
            && timestamp < bucket_end(self.bucket_start, self.interval)
    }

    /// Checks the OHLC ordering and bucket alignment.
    pub fn is_consistent(&self) -> bool {
        self.bucket_start % self.interval.as_secs() == 0
            && self.trades >= 1
            && self.low <= self.high
            && self.low <= self.open
            && self.open <= self.high
            && self.low <= self.close
            && self.close <= self.high
            && self.open_event <= self.close_event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::entities::token::Token;
    use crate::events::TradeSide;
    use rust_decimal_macros::dec;

    fn trade(block: u64, log_index: u64, timestamp: u64, price: Decimal) -> TradeRecord {
        let base = Token::new(Address::parse(&format!("0x{:040x}", 1)).unwrap(), 18);
        let quote = Token::new(Address::parse(&format!("0x{:040x}", 2)).unwrap(), 6);
        TradeRecord {
            event: EventId::new(block, log_index),
            pair: PairId::for_tokens(&base.address, &quote.address),
            base,
            quote,
            price,
            volume: dec!(2),
            quote_volume: price * dec!(2),
            side: TradeSide::Buy,
            timestamp,
        }
    }

    fn key(timestamp: u64) -> CandleKey {
        let t = trade(1, 0, timestamp, dec!(1));
        CandleKey::containing(t.pair, Interval::OneMinute, timestamp)
    }

    #[test]
    fn test_first_trade_opens_candle() {
        let t = trade(1, 0, 1_700_000_030, dec!(10));
        let candle = Candle::first(key(t.timestamp), &t);

        assert_eq!(candle.bucket_start, 1_699_999_980);
        assert_eq!(candle.open, dec!(10));
        assert_eq!(candle.high, dec!(10));
        assert_eq!(candle.low, dec!(10));
        assert_eq!(candle.close, dec!(10));
        assert_eq!(candle.volume, dec!(2));
        assert_eq!(candle.trades, 1);
        assert!(candle.is_consistent());
    }

    #[test]
    fn test_accumulates_in_order() {
        let prices = [dec!(10), dec!(15), dec!(8), dec!(12)];
        let ts = 1_700_000_000;
        let mut candle = Candle::first(key(ts), &trade(1, 0, ts, prices[0]));
        for (i, price) in prices.iter().enumerate().skip(1) {
            candle.merge(&trade(1, i as u64, ts + i as u64, *price)).unwrap();
            assert!(candle.is_consistent());
        }

        assert_eq!(candle.open, dec!(10));
        assert_eq!(candle.high, dec!(15));
        assert_eq!(candle.low, dec!(8));
        assert_eq!(candle.close, dec!(12));
        assert_eq!(candle.volume, dec!(8));
        assert_eq!(candle.trades, 4);
    }

    #[test]
    fn test_late_trade_matches_in_order_result() {
        let ts = 1_700_000_000;
        let early = trade(5, 0, ts, dec!(7));
        let middle = trade(5, 1, ts + 1, dec!(9));
        let late = trade(6, 0, ts + 2, dec!(11));

        let mut in_order = Candle::first(key(ts), &early);
        in_order.merge(&middle).unwrap();
        in_order.merge(&late).unwrap();

        let mut shuffled = Candle::first(key(ts), &late);
        shuffled.merge(&early).unwrap();
        shuffled.merge(&middle).unwrap();

        assert_eq!(in_order, shuffled);
        assert_eq!(shuffled.open, dec!(7));
        assert_eq!(shuffled.close, dec!(11));
    }

    #[test]
    fn test_contains_and_id() {
        let t = trade(1, 0, 1_700_000_030, dec!(10));
        let candle = Candle::first(key(t.timestamp), &t);
        assert!(candle.contains(1_699_999_980));
        assert!(candle.contains(1_700_000_039));
        assert!(!candle.contains(1_700_000_040));
        assert!(candle.id().ends_with("-60-1699999980"));
    }

    #[test]
    fn test_volume_overflow_leaves_candle_untouched() {
        let ts = 1_700_000_000;
        let mut huge = trade(1, 0, ts, dec!(1));
        huge.volume = Decimal::MAX - dec!(1);
        let mut candle = Candle::first(key(ts), &huge);
        let before = candle.clone();

        huge.event = EventId::new(1, 1);
        huge.price = dec!(2);
        let err = candle.merge(&huge).unwrap_err();

        assert!(matches!(err, DomainError::AmountOverflow(_)));
        assert_eq!(candle, before);
    }
}
