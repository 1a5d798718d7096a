//! Request and response bodies.

use ohlcv_domain::{Candle, EventId, Interval, Pair, PairId};
use serde::{Deserialize, Serialize};

/// Query string of the candles endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct CandleQuery {
    /// Interval label or seconds, `1h` when absent.
    pub interval: Option<String>,
    /// Page size, `DEFAULT_CANDLE_LIMIT` when absent.
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Highest committed event.
    pub cursor: Option<EventId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListPairsResponse {
    pub pairs: Vec<Pair>,
    pub total: usize,
}

/// Candles of one pair and interval, newest bucket first.
#[derive(Debug, Serialize, Deserialize)]
pub struct CandlesResponse {
    pub pair: PairId,
    pub interval: Interval,
    pub candles: Vec<Candle>,
}
