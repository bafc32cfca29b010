// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Hyperliquid Adapter
//!
//! Read adapter for Hyperliquid accounts. The venue keys reads by wallet
//! address: the credential pair's API-key field is treated as the address and
//! every call is an unsigned `POST /info` with a typed JSON body. The secret
//! key is accepted for contract symmetry with signing venues but is never
//! transmitted.
//!
//! ## Read Surface
//!
//! - `{"type":"userState","user":<address>}`: account state; backs
//!   `verify`, `fetch_balances` and `fetch_positions`.
//! - `{"type":"allMids"}`: mid prices keyed by coin; backs portfolio
//!   valuation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::models::{
    AccountSnapshot, AssetBalance, ExchangeCredentials, ExchangeId, Portfolio, PositionRecord,
    PositionReport,
};

use super::error::{classify_status, classify_transport, ExchangeError};
use super::{build_portfolio, retain_positive, ExchangeAdapter};

const HYPERLIQUID_API_URL: &str = "https://api.hyperliquid.xyz";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Typed `/info` request body. The wire shape is `{"type": "<variant>", ...}`.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum InfoRequest<'a> {
    UserState { user: &'a str },
    AllMids,
}

/// Venue error payload, e.g. `{"error": "Invalid address"}`.
#[derive(Debug, Deserialize)]
struct VenueError {
    error: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserStateResponse {
    #[serde(default)]
    asset_positions: Vec<AssetPositionEntry>,
}

/// One `assetPositions` entry.
///
/// Two shapes appear in the wild: a flat balance-like record (`coin`, `free`,
/// `locked`) and the standard perp payload nested under `position`. All
/// fields are optional so either shape parses; each read path picks the
/// fields it understands.
#[derive(Debug, Deserialize)]
struct AssetPositionEntry {
    #[serde(default)]
    coin: Option<String>,
    #[serde(default)]
    free: Option<String>,
    #[serde(default)]
    locked: Option<String>,
    #[serde(default)]
    position: Option<PerpPosition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PerpPosition {
    coin: String,
    /// Signed size as a decimal string; zero means flat.
    szi: String,
    #[serde(default)]
    entry_px: Option<String>,
    #[serde(default)]
    unrealized_pnl: Option<String>,
    #[serde(default)]
    leverage: Option<LeverageInfo>,
}

#[derive(Debug, Deserialize)]
struct LeverageInfo {
    value: f64,
}

/// Read adapter for Hyperliquid accounts.
pub struct HyperliquidAdapter {
    http: reqwest::Client,
    base_url: Url,
}

impl HyperliquidAdapter {
    pub fn new() -> Result<Self, ExchangeError> {
        let base_url = Url::parse(HYPERLIQUID_API_URL)
            .map_err(|e| ExchangeError::Protocol(format!("invalid Hyperliquid base URL: {e}")))?;
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

    async fn post_info(&self, request: &InfoRequest<'_>) -> Result<reqwest::Response, ExchangeError> {
        let mut url = self.base_url.clone();
        url.set_path("/info");

        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(classify_transport)?;
        check_response(response).await
    }

    async fn query_user_state(
        &self,
        credentials: &ExchangeCredentials,
    ) -> Result<UserStateResponse, ExchangeError> {
        let request = InfoRequest::UserState {
            user: credentials.api_key.as_str(),
        };
        let response = self.post_info(&request).await?;

        response
            .json::<UserStateResponse>()
            .await
            .map_err(|e| ExchangeError::Protocol(format!("malformed user state response: {e}")))
    }

    /// Mid prices keyed by coin, e.g. `{"BTC": "60000.5"}`.
    async fn query_mids(&self) -> Result<HashMap<String, f64>, ExchangeError> {
        let response = self.post_info(&InfoRequest::AllMids).await?;

        let mids: HashMap<String, String> = response
            .json()
            .await
            .map_err(|e| ExchangeError::Protocol(format!("malformed mids response: {e}")))?;

        Ok(mids
            .into_iter()
            .filter_map(|(coin, mid)| mid.parse::<f64>().ok().map(|price| (coin, price)))
            .collect())
    }
}

/// Pass success responses through; classify everything else from the body.
///
/// The venue has no error-code table; its bodies carry `{"error": "..."}` at
/// most, so classification extracts that message and applies the shared
/// status rules.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ExchangeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify_body(status, &body))
}

fn classify_body(status: StatusCode, body: &str) -> ExchangeError {
    let detail = serde_json::from_str::<VenueError>(body)
        .map(|venue| venue.error)
        .unwrap_or_else(|_| body.to_string());
    classify_status(status, &detail)
}

/// Flat balance read of an entry; entries without the flat fields are skipped.
fn flat_balance(entry: AssetPositionEntry) -> Option<AssetBalance> {
    let coin = entry.coin?;
    Some(AssetBalance {
        asset: coin,
        free: entry.free.unwrap_or_else(|| "0".to_string()),
        locked: entry.locked.unwrap_or_else(|| "0".to_string()),
    })
}

/// Nested perp read of an entry; flat entries and zero-size positions are
/// skipped.
fn position_record(position: PerpPosition) -> Option<PositionRecord> {
    let size = position.szi.parse::<f64>().ok()?;
    if size == 0.0 {
        return None;
    }
    Some(PositionRecord {
        asset: position.coin,
        size,
        entry_price: position.entry_px.and_then(|v| v.parse().ok()),
        unrealized_pnl: position.unrealized_pnl.and_then(|v| v.parse().ok()),
        leverage: position.leverage.map(|l| l.value),
    })
}

#[async_trait]
impl ExchangeAdapter for HyperliquidAdapter {
    fn id(&self) -> ExchangeId {
        ExchangeId::Hyperliquid
    }

    async fn verify(
        &self,
        credentials: &ExchangeCredentials,
    ) -> Result<AccountSnapshot, ExchangeError> {
        let state = self.query_user_state(credentials).await?;
        Ok(AccountSnapshot {
            exchange: ExchangeId::Hyperliquid,
            assets: state.asset_positions.len(),
        })
    }

    async fn fetch_balances(
        &self,
        credentials: &ExchangeCredentials,
    ) -> Result<Vec<AssetBalance>, ExchangeError> {
        let state = self.query_user_state(credentials).await?;
        let balances = state
            .asset_positions
            .into_iter()
            .filter_map(flat_balance)
            .collect();
        Ok(retain_positive(balances))
    }

    async fn fetch_portfolio_value(
        &self,
        credentials: &ExchangeCredentials,
    ) -> Result<Portfolio, ExchangeError> {
        let balances = self.fetch_balances(credentials).await?;
        let mids = self.query_mids().await?;
        // Mids are USD-denominated, so they stand in for the stable quote;
        // there are no cross markets to bridge through.
        Ok(build_portfolio(balances, |base, quote| {
            if quote == "USDT" {
                mids.get(base).copied()
            } else {
                None
            }
        }))
    }

    async fn fetch_positions(
        &self,
        credentials: &ExchangeCredentials,
    ) -> Result<PositionReport, ExchangeError> {
        match self.query_user_state(credentials).await {
            Ok(state) => {
                let positions = state
                    .asset_positions
                    .into_iter()
                    .filter_map(|entry| entry.position)
                    .filter_map(position_record)
                    .collect();
                Ok(PositionReport {
                    positions,
                    note: None,
                })
            }
            Err(err) => {
                warn!(error = %err, "positions read failed, reporting empty set");
                Ok(PositionReport::empty(format!("positions unavailable: {err}")))
            }
        }
    }
}
