// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Binance Adapter
//!
//! Spot-account read adapter. Authenticated calls sign a canonical query
//! string with the account secret (HMAC-SHA256, lowercase hex, appended as
//! the `signature` parameter) and present the API key in the `X-MBX-APIKEY`
//! header.
//!
//! ## Read Surface
//!
//! - `/api/v3/account` (signed): asset balances; backs both `verify` and
//!   `fetch_balances`.
//! - `/api/v3/ticker/price` (public): full spot price table; backs
//!   portfolio valuation.
//!
//! The venue is spot-only on this surface, so `fetch_positions` reports an
//! empty set with a note instead of calling upstream.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::models::{
    AccountSnapshot, AssetBalance, ExchangeCredentials, ExchangeId, Portfolio, PositionReport,
};

use super::error::{classify_status, classify_transport, ExchangeError};
use super::signer::{timestamp_ms, RequestSigner};
use super::{build_portfolio, retain_positive, ExchangeAdapter};

const BINANCE_API_URL: &str = "https://api.binance.com";
const API_KEY_HEADER: &str = "X-MBX-APIKEY";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Venue error payload, e.g. `{"code": -2014, "msg": "API-key format invalid."}`.
#[derive(Debug, Deserialize)]
struct VenueError {
    code: i64,
    msg: String,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    balances: Vec<AssetBalance>,
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    symbol: String,
    price: String,
}

/// Read adapter for Binance spot accounts.
pub struct BinanceAdapter {
    http: reqwest::Client,
    base_url: Url,
}

impl BinanceAdapter {
    pub fn new() -> Result<Self, ExchangeError> {
        let base_url = Url::parse(BINANCE_API_URL)
            .map_err(|e| ExchangeError::Protocol(format!("invalid Binance base URL: {e}")))?;
        Self::with_base_url(base_url)
    }

    /// Point the adapter at a different host, e.g. a local mock server.
    pub fn with_base_url(base_url: Url) -> Result<Self, ExchangeError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ExchangeError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, base_url })
    }

    /// Signed read of `/api/v3/account`.
    async fn query_account(
        &self,
        credentials: &ExchangeCredentials,
    ) -> Result<AccountResponse, ExchangeError> {
        let signer = RequestSigner::new(credentials.secret_key.as_str());
        let timestamp = timestamp_ms().to_string();
        let query = signer.signed_query(&[("timestamp", timestamp.as_str())]);

        let mut url = self.base_url.clone();
        url.set_path("/api/v3/account");
        url.set_query(Some(&query));

        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, credentials.api_key.as_str())
            .send()
            .await
            .map_err(classify_transport)?;
        let response = check_response(response).await?;

        response
            .json::<AccountResponse>()
            .await
            .map_err(|e| ExchangeError::Protocol(format!("malformed account response: {e}")))
    }

    /// Public read of the full spot price table, keyed by symbol.
    async fn query_prices(&self) -> Result<HashMap<String, f64>, ExchangeError> {
        let mut url = self.base_url.clone();
        url.set_path("/api/v3/ticker/price");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(classify_transport)?;
        let response = check_response(response).await?;

        let tickers: Vec<TickerPrice> = response
            .json()
            .await
            .map_err(|e| ExchangeError::Protocol(format!("malformed ticker response: {e}")))?;

        Ok(tickers
            .into_iter()
            .filter_map(|t| t.price.parse::<f64>().ok().map(|price| (t.symbol, price)))
            .collect())
    }
}

/// Pass success responses through; classify everything else from the body.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ExchangeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify_body(status, &body))
}

/// Venue-specific error mapping.
///
/// Binance error bodies carry `{code, msg}` codes that disambiguate beyond
/// the HTTP status: -1002/-1022/-2014/-2015 are credential or signature
/// rejections, -1003/-1015 are throttling even when the status is not 429.
/// Anything else falls back to the shared status rules.
fn classify_body(status: StatusCode, body: &str) -> ExchangeError {
    if let Ok(venue) = serde_json::from_str::<VenueError>(body) {
        return match venue.code {
            -1002 | -1022 | -2014 | -2015 => ExchangeError::Auth(venue.msg),
            -1003 | -1015 => ExchangeError::RateLimited(venue.msg),
            _ => classify_status(status, &venue.msg),
        };
    }
    classify_status(status, body)
}

#[async_trait]
impl ExchangeAdapter for BinanceAdapter {
    fn id(&self) -> ExchangeId {
        ExchangeId::Binance
    }

    async fn verify(
        &self,
        credentials: &ExchangeCredentials,
    ) -> Result<AccountSnapshot, ExchangeError> {
        let account = self.query_account(credentials).await?;
        Ok(AccountSnapshot {
            exchange: ExchangeId::Binance,
            assets: account.balances.len(),
        })
    }

    async fn fetch_balances(
        &self,
        credentials: &ExchangeCredentials,
    ) -> Result<Vec<AssetBalance>, ExchangeError> {
        let account = self.query_account(credentials).await?;
        Ok(retain_positive(account.balances))
    }

    async fn fetch_portfolio_value(
        &self,
        credentials: &ExchangeCredentials,
    ) -> Result<Portfolio, ExchangeError> {
        let balances = self.fetch_balances(credentials).await?;
        let prices = self.query_prices().await?;
        Ok(build_portfolio(balances, |base, quote| {
            prices.get(&format!("{base}{quote}")).copied()
        }))
    }

    async fn fetch_positions(
        &self,
        _credentials: &ExchangeCredentials,
    ) -> Result<PositionReport, ExchangeError> {
        // Spot-only venue: nothing to ask upstream.
        Ok(PositionReport::empty(
            "Binance spot accounts carry no derivative positions",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn credentials() -> ExchangeCredentials {
        ExchangeCredentials {
            exchange: ExchangeId::Binance,
            api_key: "test-api-key".to_string(),
            secret_key: "test-secret".to_string(),
        }
    }

    fn adapter_for(server: &mockito::Server) -> BinanceAdapter {
        let base_url = Url::parse(&server.url()).unwrap();
        BinanceAdapter::with_base_url(base_url).unwrap()
    }

    #[tokio::test]
    async fn verify_sends_signed_query_and_api_key_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v3/account")
            .match_query(Matcher::Regex(
                r"^timestamp=\d+&signature=[0-9a-f]{64}$".to_string(),
            ))
            .match_header("x-mbx-apikey", "test-api-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"balances":[{"asset":"BTC","free":"0.5","locked":"0"},{"asset":"ETH","free":"0","locked":"0"}]}"#,
            )
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let snapshot = adapter.verify(&credentials()).await.unwrap();

        assert_eq!(snapshot.exchange, ExchangeId::Binance);
        assert_eq!(snapshot.assets, 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_balances_drops_zero_entries() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/account")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"balances":[{"asset":"BTC","free":"0","locked":"0"},{"asset":"ETH","free":"1.5","locked":"0"}]}"#,
            )
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let balances = adapter.fetch_balances(&credentials()).await.unwrap();

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].asset, "ETH");
        assert_eq!(balances[0].free, "1.5");
    }

    #[tokio::test]
    async fn portfolio_values_stable_balance_at_face_amount() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/account")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"balances":[{"asset":"USDT","free":"100","locked":"0"}]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/v3/ticker/price")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"symbol":"BTCUSDT","price":"50000"}]"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let portfolio = adapter.fetch_portfolio_value(&credentials()).await.unwrap();

        assert_eq!(portfolio.total_value_usdt, 100.0);
        assert_eq!(portfolio.assets.len(), 1);
        assert_eq!(portfolio.assets[0].asset, "USDT");
        assert_eq!(portfolio.assets[0].value_usdt, 100.0);
    }

    #[tokio::test]
    async fn portfolio_bridges_via_btc_when_no_direct_market_exists() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/account")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"balances":[{"asset":"RARE","free":"2","locked":"0"}]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/v3/ticker/price")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"symbol":"RAREBTC","price":"0.001"},{"symbol":"BTCUSDT","price":"50000"}]"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let portfolio = adapter.fetch_portfolio_value(&credentials()).await.unwrap();

        // 2 * 0.001 BTC * 50000 USDT/BTC
        assert_eq!(portfolio.total_value_usdt, 100.0);
        assert_eq!(portfolio.assets[0].value_usdt, 100.0);
    }

    #[tokio::test]
    async fn rejected_api_key_classifies_as_auth() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/account")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":-2014,"msg":"API-key format invalid."}"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let err = adapter.verify(&credentials()).await.unwrap_err();

        match err {
            ExchangeError::Auth(msg) => assert_eq!(msg, "API-key format invalid."),
            other => panic!("expected Auth, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_permissions_classify_as_auth() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/account")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"code":-2015,"msg":"Invalid API-key, IP, or permissions for action."}"#,
            )
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let err = adapter.verify(&credentials()).await.unwrap_err();

        assert!(matches!(err, ExchangeError::Auth(_)));
    }

    #[tokio::test]
    async fn throttling_code_classifies_as_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/account")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":-1003,"msg":"Too many requests."}"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let err = adapter.fetch_balances(&credentials()).await.unwrap_err();

        assert!(matches!(err, ExchangeError::RateLimited(_)));
    }

    #[tokio::test]
    async fn server_failure_classifies_as_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/account")
            .match_query(Matcher::Any)
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let err = adapter.verify(&credentials()).await.unwrap_err();

        assert!(matches!(err, ExchangeError::Unavailable(_)));
    }

    #[tokio::test]
    async fn unreachable_host_classifies_as_unavailable() {
        // Port 1 is never listening on loopback.
        let base_url = Url::parse("http://127.0.0.1:1").unwrap();
        let adapter = BinanceAdapter::with_base_url(base_url).unwrap();

        let err = adapter.verify(&credentials()).await.unwrap_err();

        assert!(matches!(err, ExchangeError::Unavailable(_)));
    }

    #[tokio::test]
    async fn malformed_success_body_classifies_as_protocol() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/account")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let err = adapter.verify(&credentials()).await.unwrap_err();

        assert!(matches!(err, ExchangeError::Protocol(_)));
    }

    #[tokio::test]
    async fn positions_report_empty_with_note_without_calling_upstream() {
        // No mock server at all: the call must not go out.
        let base_url = Url::parse("http://127.0.0.1:1").unwrap();
        let adapter = BinanceAdapter::with_base_url(base_url).unwrap();

        let report = adapter.fetch_positions(&credentials()).await.unwrap();

        assert!(report.positions.is_empty());
        assert!(report.note.is_some());
    }
}
