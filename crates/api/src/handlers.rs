//! Request handlers.

use crate::error::ApiError;
use crate::models::{CandleQuery, CandlesResponse, HealthResponse, ListPairsResponse};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use ohlcv_data::{DEFAULT_CANDLE_LIMIT, MAX_CANDLE_LIMIT};
use ohlcv_domain::{Interval, PairId};
use tracing::debug;

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let cursor = state.store.cursor().await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        cursor,
    }))
}

/// `GET /pairs`
pub async fn list_pairs(State(state): State<AppState>) -> Result<Json<ListPairsResponse>, ApiError> {
    let pairs = state.store.pairs().await?;
    Ok(Json(ListPairsResponse {
        total: pairs.len(),
        pairs,
    }))
}

/// `GET /pairs/{id}/candles?interval=1h&limit=100`
///
/// Limits above `MAX_CANDLE_LIMIT` are clamped.
pub async fn get_candles(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<CandleQuery>,
) -> Result<Json<CandlesResponse>, ApiError> {
    let interval = match query.interval.as_deref() {
        Some(raw) => raw
            .parse::<Interval>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => Interval::OneHour,
    };
    let limit = query.limit.unwrap_or(DEFAULT_CANDLE_LIMIT);
    if limit == 0 {
        return Err(ApiError::BadRequest("limit must be positive".to_string()));
    }
    let limit = limit.min(MAX_CANDLE_LIMIT);

    let pair = PairId::from(id);
    if state.store.pair(&pair).await?.is_none() {
        return Err(ApiError::NotFound(format!("pair {pair}")));
    }

    let candles = state.store.latest_candles(&pair, interval, limit).await?;
    debug!(pair = %pair, interval = %interval, limit, returned = candles.len(), "Serving candles");

    Ok(Json(CandlesResponse {
        pair,
        interval,
        candles,
    }))
}
