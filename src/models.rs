// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API, plus the small set of domain types shared between the
//! session vault and the exchange adapters. All wire types derive
//! `Serialize`, `Deserialize`, and `ToSchema` for automatic JSON handling
//! and OpenAPI documentation.
//!
//! ## Exchange Identifier Type
//!
//! The [`ExchangeId`] enum is the closed set of supported venues. Request
//! bodies carry the identifier as a plain string so that unsupported values
//! can be rejected with a clear client error before any adapter is invoked.
//!
//! ## Model Categories
//!
//! - **Credentials**: Ephemeral API key material (never stored in plaintext)
//! - **Connect**: Session issuance request/response
//! - **Reads**: Balances, portfolio valuation, positions
//! - **Market**: Synthetic chart data

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Exchange Identifier
// =============================================================================

/// Identifier for a supported exchange venue.
///
/// This is a closed enumeration: any identifier outside this set is rejected
/// at the HTTP boundary. Serialized in lowercase (`"binance"`,
/// `"hyperliquid"`), matching the identifiers the frontend sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeId {
    Binance,
    Hyperliquid,
}

impl ExchangeId {
    /// All supported venues, in catalogue order.
    pub const ALL: [ExchangeId; 2] = [ExchangeId::Binance, ExchangeId::Hyperliquid];

    /// Lowercase wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeId::Binance => "binance",
            ExchangeId::Hyperliquid => "hyperliquid",
        }
    }

    /// Human-readable venue name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ExchangeId::Binance => "Binance",
            ExchangeId::Hyperliquid => "Hyperliquid",
        }
    }

    /// Frontend asset path for the venue logo.
    pub fn logo_path(&self) -> &'static str {
        match self {
            ExchangeId::Binance => "/exchanges/binance.svg",
            ExchangeId::Hyperliquid => "/exchanges/hyperliquid.svg",
        }
    }

    /// Parse a wire identifier. Returns `None` for anything outside the
    /// supported set; callers turn that into a validation error.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "binance" => Some(ExchangeId::Binance),
            "hyperliquid" => Some(ExchangeId::Hyperliquid),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Catalogue entry describing a supported venue.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExchangeInfo {
    /// Wire identifier (`binance`, `hyperliquid`).
    pub id: ExchangeId,
    /// Human-readable name.
    pub name: String,
    /// Frontend logo asset path.
    pub logo: String,
}

impl From<ExchangeId> for ExchangeInfo {
    fn from(id: ExchangeId) -> Self {
        ExchangeInfo {
            id,
            name: id.display_name().to_string(),
            logo: id.logo_path().to_string(),
        }
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// An exchange credential pair, held only in memory during verification and
/// during a single decrypt-use-discard cycle per request.
///
/// Deliberately does not implement `Debug` or `Serialize`: the raw key
/// material must never end up in logs or response bodies. At-rest storage
/// goes through the session vault, which encrypts each field independently.
#[derive(Clone)]
pub struct ExchangeCredentials {
    pub exchange: ExchangeId,
    pub api_key: String,
    /// Secret used for request signing. Hyperliquid accepts but does not use
    /// it; its reads are keyed by wallet address alone.
    pub secret_key: String,
}

/// Minimal proof that a credential pair was accepted by the venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub exchange: ExchangeId,
    /// Number of asset entries visible on the account at verification time.
    pub assets: usize,
}

// =============================================================================
// Connect / Disconnect
// =============================================================================

/// Request body for `POST /api/exchange/connect`.
///
/// Fields default to empty strings so that missing parameters surface as a
/// 400 with a stable message rather than a serde rejection.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub secret_key: String,
}

/// Session material returned from a successful connect.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectData {
    /// Opaque bearer token for subsequent reads.
    pub token: String,
    /// Absolute session expiry, epoch milliseconds.
    pub expires_at: i64,
    pub exchange: ExchangeId,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConnectResponse {
    pub success: bool,
    pub message: String,
    pub data: ConnectData,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DisconnectResponse {
    pub success: bool,
    /// Whether a live session was actually removed. False when the token had
    /// already been revoked or expired; the call is idempotent.
    pub revoked: bool,
}

// =============================================================================
// Balances
// =============================================================================

/// A single asset balance as reported by the venue.
///
/// Amounts are kept as the venue's decimal strings; parsing happens only
/// where arithmetic is needed (positivity filter, valuation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AssetBalance {
    pub asset: String,
    pub free: String,
    pub locked: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BalancesResponse {
    pub success: bool,
    pub data: Vec<AssetBalance>,
}

// =============================================================================
// Portfolio Valuation
// =============================================================================

/// One asset line in a portfolio valuation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PortfolioAsset {
    pub asset: String,
    pub free: f64,
    pub locked: f64,
    pub total: f64,
    /// Approximate value in USDT. Zero when no pricing path resolved.
    #[serde(rename = "valueUSDT")]
    pub value_usdt: f64,
}

/// Portfolio valuation: per-asset USDT values plus their sum, sorted by
/// value descending. The numbers are a display heuristic, not an accounting
/// statement.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Portfolio {
    #[serde(rename = "totalValueUSDT")]
    pub total_value_usdt: f64,
    pub assets: Vec<PortfolioAsset>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PortfolioResponse {
    pub success: bool,
    pub data: Portfolio,
}

// =============================================================================
// Positions
// =============================================================================

/// An open derivatives position, normalized across venues.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    /// Underlying coin or contract symbol.
    pub asset: String,
    /// Signed position size; negative for shorts. Never zero (zero-size
    /// entries are filtered out).
    pub size: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unrealized_pnl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leverage: Option<f64>,
}

/// Result of a positions read. A venue without a derivatives surface (or one
/// whose endpoint errored) yields an empty list plus a note instead of a
/// failed call.
#[derive(Debug, Clone)]
pub struct PositionReport {
    pub positions: Vec<PositionRecord>,
    pub note: Option<String>,
}

impl PositionReport {
    pub fn empty(note: impl Into<String>) -> Self {
        PositionReport {
            positions: Vec::new(),
            note: Some(note.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PositionsResponse {
    pub success: bool,
    pub data: Vec<PositionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// =============================================================================
// Market History (synthetic chart data)
// =============================================================================

/// One OHLC candle of synthetic chart data.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Candle {
    /// Candle open time, epoch milliseconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MarketHistoryResponse {
    pub success: bool,
    pub symbol: String,
    pub interval: String,
    pub data: Vec<Candle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_id_parses_known_identifiers_only() {
        assert_eq!(ExchangeId::parse("binance"), Some(ExchangeId::Binance));
        assert_eq!(ExchangeId::parse("hyperliquid"), Some(ExchangeId::Hyperliquid));
        assert_eq!(ExchangeId::parse("kraken"), None);
        assert_eq!(ExchangeId::parse("BINANCE"), None);
        assert_eq!(ExchangeId::parse(""), None);
    }

    #[test]
    fn exchange_id_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ExchangeId::Binance).unwrap(),
            r#""binance""#
        );
        assert_eq!(
            serde_json::to_string(&ExchangeId::Hyperliquid).unwrap(),
            r#""hyperliquid""#
        );
    }

    #[test]
    fn connect_request_defaults_missing_fields_to_empty() {
        let req: ConnectRequest = serde_json::from_str(r#"{"exchange":"binance"}"#).unwrap();
        assert_eq!(req.exchange, "binance");
        assert!(req.api_key.is_empty());
        assert!(req.secret_key.is_empty());
    }

    #[test]
    fn portfolio_asset_serializes_usdt_field_names() {
        let asset = PortfolioAsset {
            asset: "BTC".to_string(),
            free: 1.0,
            locked: 0.0,
            total: 1.0,
            value_usdt: 50000.0,
        };
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["valueUSDT"], 50000.0);

        let portfolio = Portfolio {
            total_value_usdt: 50000.0,
            assets: vec![asset],
        };
        let json = serde_json::to_value(&portfolio).unwrap();
        assert_eq!(json["totalValueUSDT"], 50000.0);
    }

    #[test]
    fn position_record_omits_absent_optionals() {
        let record = PositionRecord {
            asset: "ETH".to_string(),
            size: -2.5,
            entry_price: None,
            unrealized_pnl: None,
            leverage: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("entryPrice").is_none());
        assert_eq!(json["size"], -2.5);
    }
}
