//! Route definitions.

use crate::handlers;
use crate::state::AppState;
use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the HTTP router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/pairs", get(handlers::list_pairs))
        .route("/pairs/{id}/candles", get(handlers::get_candles))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use ohlcv_data::{ChangeSet, MAX_CANDLE_LIMIT, MemoryStore, Store};
    use ohlcv_domain::events::TradeSide;
    use ohlcv_domain::{
        Address, Candle, CandleKey, EventId, Interval, Pair, PairId, Token, TradeRecord,
    };
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tower::ServiceExt;

    const T0: u64 = 1_700_000_000;

    fn token(n: u64, decimals: u8) -> Token {
        Token::new(Address::parse(&format!("0x{n:040x}")).unwrap(), decimals)
    }

    /// Store holding one pair with `buckets` hourly candles.
    async fn seeded(buckets: u64) -> (Arc<MemoryStore>, PairId) {
        let store = Arc::new(MemoryStore::new());
        let (base, quote) = (token(1, 18), token(2, 6));
        let pair = PairId::for_tokens(&base.address, &quote.address);

        let mut changes = ChangeSet::for_event(EventId::new(buckets, 0));
        changes.pairs.push(Pair::new(pair.clone(), &base.address, &quote.address, T0, 1));
        for i in 0..buckets {
            let timestamp = T0 + i * 3_600;
            let trade = TradeRecord {
                event: EventId::new(i + 1, 0),
                pair: pair.clone(),
                base: base.clone(),
                quote: quote.clone(),
                price: dec!(100) + rust_decimal::Decimal::from(i),
                volume: dec!(1),
                quote_volume: dec!(100),
                side: TradeSide::Buy,
                timestamp,
            };
            let key = CandleKey::containing(pair.clone(), Interval::OneHour, timestamp);
            changes.candles.push(Candle::first(key, &trade));
        }
        changes.tokens.extend([base, quote]);
        store.commit(changes).await.unwrap();
        (store, pair)
    }

    async fn get(store: Arc<MemoryStore>, uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(AppState::new(store));
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (store, _) = seeded(1).await;
        let (status, body) = get(store, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cursor"]["block_number"], 1);
    }

    #[tokio::test]
    async fn test_list_pairs() {
        let (store, pair) = seeded(1).await;
        let (status, body) = get(store, "/pairs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["pairs"][0]["id"], pair.as_str());
    }

    #[tokio::test]
    async fn test_candles_newest_first_with_limit() {
        let (store, pair) = seeded(5).await;
        let uri = format!("/pairs/{pair}/candles?interval=1h&limit=3");
        let (status, body) = get(store, &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["interval"], "1h");
        let candles = body["candles"].as_array().unwrap();
        assert_eq!(candles.len(), 3);
        let starts: Vec<u64> = candles
            .iter()
            .map(|c| c["bucket_start"].as_u64().unwrap())
            .collect();
        assert!(starts.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(starts[0], 1_699_999_200 + 4 * 3_600);
    }

    #[tokio::test]
    async fn test_candles_defaults_to_hourly() {
        let (store, pair) = seeded(2).await;
        let (status, body) = get(store, &format!("/pairs/{pair}/candles")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["candles"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_candles_limit_is_clamped() {
        let (store, pair) = seeded(MAX_CANDLE_LIMIT as u64 + 5).await;
        let (status, body) = get(store, &format!("/pairs/{pair}/candles?limit=5000")).await;

        assert_eq!(status, StatusCode::OK);
        let candles = body["candles"].as_array().unwrap();
        assert_eq!(candles.len(), MAX_CANDLE_LIMIT);
        assert_eq!(
            candles[0]["bucket_start"].as_u64().unwrap(),
            1_699_999_200 + (MAX_CANDLE_LIMIT as u64 + 4) * 3_600
        );
    }

    #[tokio::test]
    async fn test_candles_errors() {
        let (store, pair) = seeded(1).await;

        let (status, body) = get(store.clone(), &format!("/pairs/{pair}/candles?interval=2m")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);

        let (status, _) = get(store.clone(), &format!("/pairs/{pair}/candles?limit=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = get(store.clone(), "/pairs/unknown/candles").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);

        store.set_available(false);
        let (status, _) = get(store, "/pairs").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
