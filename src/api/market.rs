// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::Query, Json};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::ApiError,
    models::{Candle, MarketHistoryResponse},
};

const MAX_CANDLES: usize = 500;
const DEFAULT_CANDLES: usize = 30;

#[derive(Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Market symbol, e.g. `BTCUSDT`.
    // Defaults to empty rather than failing deserialization: a missing
    // symbol must get the handler's JSON rejection, not the extractor's
    // plain-text one.
    #[serde(default)]
    pub symbol: String,
    /// Candle interval: `1m`, `5m`, `15m`, `1h`, `4h`, `1d`, `1w`.
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Number of candles, capped at 500.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_limit() -> usize {
    DEFAULT_CANDLES
}

/// Synthetic OHLC history for charting.
///
/// The series is generated, not fetched: a given symbol always produces the
/// same shape, so the frontend can render stable demo charts without a
/// market-data subscription.
#[utoipa::path(
    get,
    path = "/api/market/history",
    params(HistoryQuery),
    tag = "Market",
    responses(
        (status = 200, description = "Synthetic OHLC series", body = MarketHistoryResponse),
        (status = 400, description = "Missing symbol or unsupported interval")
    )
)]
pub async fn get_market_history(
    Query(query): Query<HistoryQuery>,
) -> Result<Json<MarketHistoryResponse>, ApiError> {
    if query.symbol.is_empty() {
        return Err(ApiError::bad_request("Missing required parameters"));
    }
    let step_ms = interval_ms(&query.interval)
        .ok_or_else(|| ApiError::bad_request("Unsupported interval"))?;
    let limit = query.limit.clamp(1, MAX_CANDLES);

    let data = synthetic_history(&query.symbol, step_ms, limit, Utc::now().timestamp_millis());

    Ok(Json(MarketHistoryResponse {
        success: true,
        symbol: query.symbol,
        interval: query.interval,
        data,
    }))
}

fn interval_ms(interval: &str) -> Option<i64> {
    match interval {
        "1m" => Some(60_000),
        "5m" => Some(300_000),
        "15m" => Some(900_000),
        "1h" => Some(3_600_000),
        "4h" => Some(14_400_000),
        "1d" => Some(86_400_000),
        "1w" => Some(604_800_000),
        _ => None,
    }
}

/// FNV-1a over the symbol; stable across runs so a symbol always charts the
/// same.
fn symbol_seed(symbol: &str) -> u64 {
    symbol.bytes().fold(0xcbf2_9ce4_8422_2325, |acc, b| {
        (acc ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Random-walk OHLC series seeded by the symbol and aligned so the last
/// candle opens one step before `end_ms`.
fn synthetic_history(symbol: &str, step_ms: i64, limit: usize, end_ms: i64) -> Vec<Candle> {
    let mut rng = StdRng::seed_from_u64(symbol_seed(symbol));
    let mut close: f64 = rng.gen_range(50.0..1000.0);
    let start = end_ms - step_ms * limit as i64;

    let mut candles = Vec::with_capacity(limit);
    for i in 0..limit {
        let open = close;
        let drift: f64 = rng.gen_range(-0.03..0.03);
        close = open * (1.0 + drift);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(1_000.0..100_000.0);

        candles.push(Candle {
            timestamp: start + step_ms * i as i64,
            open,
            high,
            low,
            close,
            volume,
        });
    }
    candles
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    const END_MS: i64 = 1_700_000_000_000;

    #[test]
    fn series_is_deterministic_per_symbol() {
        let first = synthetic_history("BTCUSDT", 86_400_000, 30, END_MS);
        let second = synthetic_history("BTCUSDT", 86_400_000, 30, END_MS);

        assert_eq!(first, second);
    }

    #[test]
    fn different_symbols_chart_differently() {
        let btc = synthetic_history("BTCUSDT", 86_400_000, 5, END_MS);
        let eth = synthetic_history("ETHUSDT", 86_400_000, 5, END_MS);

        assert_ne!(btc[0].open, eth[0].open);
    }

    #[test]
    fn candles_are_well_formed_and_evenly_spaced() {
        let step = 3_600_000;
        let candles = synthetic_history("SOLUSDT", step, 48, END_MS);

        assert_eq!(candles.len(), 48);
        for pair in candles.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, step);
            // Consecutive candles chain: next opens at previous close.
            assert_eq!(pair[1].open, pair[0].close);
        }
        for candle in &candles {
            assert!(candle.low <= candle.open && candle.open <= candle.high);
            assert!(candle.low <= candle.close && candle.close <= candle.high);
            assert!(candle.volume > 0.0);
        }
    }

    #[tokio::test]
    async fn handler_rejects_unknown_interval() {
        let query = HistoryQuery {
            symbol: "BTCUSDT".to_string(),
            interval: "3s".to_string(),
            limit: 10,
        };

        let err = get_market_history(Query(query)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Unsupported interval");
    }

    #[tokio::test]
    async fn handler_requires_a_symbol() {
        let query = HistoryQuery {
            symbol: String::new(),
            interval: "1h".to_string(),
            limit: 10,
        };

        let err = get_market_history(Query(query)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Missing required parameters");
    }

    #[tokio::test]
    async fn handler_echoes_symbol_and_interval() {
        let query = HistoryQuery {
            symbol: "BTCUSDT".to_string(),
            interval: "1h".to_string(),
            limit: 10,
        };

        let Json(response) = get_market_history(Query(query)).await.unwrap();
        assert!(response.success);
        assert_eq!(response.symbol, "BTCUSDT");
        assert_eq!(response.interval, "1h");
        assert_eq!(response.data.len(), 10);
    }
}
