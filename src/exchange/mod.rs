// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Exchange Adapters
//!
//! Normalized read access to heterogeneous exchange APIs. Each venue
//! implements [`ExchangeAdapter`], a capability set of four reads; how a
//! venue authenticates is its own business. Binance signs a canonical query
//! string per request, Hyperliquid keys reads by wallet address with no
//! signing step at all, so the trait deliberately has no "sign" method that
//! every venue would be forced through.
//!
//! ## Normalized Contract
//!
//! - `verify`: prove the credentials work; returns a small account snapshot.
//! - `fetch_balances`: positive balances only, venue ordering.
//! - `fetch_portfolio_value`: balances valued in USDT, sorted largest first.
//! - `fetch_positions`: open derivative positions; venues without a
//!   derivatives surface report an empty set with a note.
//!
//! All failures surface as [`ExchangeError`]; raw transport errors never
//! cross this boundary.

use async_trait::async_trait;

use crate::models::{
    AccountSnapshot, AssetBalance, ExchangeCredentials, ExchangeId, Portfolio, PortfolioAsset,
    PositionReport,
};

pub mod binance;
pub mod error;
pub mod hyperliquid;
pub mod signer;

pub use binance::BinanceAdapter;
pub use error::ExchangeError;
pub use hyperliquid::HyperliquidAdapter;
pub use signer::RequestSigner;

/// USD-pegged assets valued at face amount, no market lookup.
pub(crate) const STABLE_ASSETS: [&str; 4] = ["USDT", "USDC", "BUSD", "DAI"];

/// Normalized read capability set implemented by every supported venue.
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    /// Venue this adapter talks to.
    fn id(&self) -> ExchangeId;

    /// Round-trip to the venue to prove the credentials are usable.
    async fn verify(
        &self,
        credentials: &ExchangeCredentials,
    ) -> Result<AccountSnapshot, ExchangeError>;

    /// Balances with a positive free or locked amount, in venue order.
    async fn fetch_balances(
        &self,
        credentials: &ExchangeCredentials,
    ) -> Result<Vec<AssetBalance>, ExchangeError>;

    /// Holdings valued in USDT, sorted by value descending.
    async fn fetch_portfolio_value(
        &self,
        credentials: &ExchangeCredentials,
    ) -> Result<Portfolio, ExchangeError>;

    /// Open derivative positions, zero-size entries removed.
    async fn fetch_positions(
        &self,
        credentials: &ExchangeCredentials,
    ) -> Result<PositionReport, ExchangeError>;
}

/// One adapter per supported venue, constructed at startup and shared.
pub struct ExchangeRegistry {
    binance: BinanceAdapter,
    hyperliquid: HyperliquidAdapter,
}

impl ExchangeRegistry {
    pub fn new() -> Result<Self, ExchangeError> {
        Ok(Self {
            binance: BinanceAdapter::new()?,
            hyperliquid: HyperliquidAdapter::new()?,
        })
    }

    /// Assemble a registry from pre-built adapters, e.g. ones pointed at
    /// testnet hosts or a local mock.
    pub fn with_adapters(binance: BinanceAdapter, hyperliquid: HyperliquidAdapter) -> Self {
        Self {
            binance,
            hyperliquid,
        }
    }

    pub fn get(&self, exchange: ExchangeId) -> &dyn ExchangeAdapter {
        match exchange {
            ExchangeId::Binance => &self.binance,
            ExchangeId::Hyperliquid => &self.hyperliquid,
        }
    }
}

fn parse_amount(value: &str) -> f64 {
    value.parse().unwrap_or(0.0)
}

/// Keep balances with any positive amount, free or locked. Unparsable
/// amounts count as zero.
pub(crate) fn retain_positive(balances: Vec<AssetBalance>) -> Vec<AssetBalance> {
    balances
        .into_iter()
        .filter(|b| parse_amount(&b.free) > 0.0 || parse_amount(&b.locked) > 0.0)
        .collect()
}

/// Value balances in USDT and sort them largest first.
///
/// `quote` answers "price of one `base` in `quote` units" from the venue's
/// market table, or `None` when no such market exists. Stables are valued at
/// face; everything else resolves through a direct USDT quote first, then a
/// BTC bridge, then falls back to zero.
pub(crate) fn build_portfolio<F>(balances: Vec<AssetBalance>, quote: F) -> Portfolio
where
    F: Fn(&str, &str) -> Option<f64>,
{
    let mut assets: Vec<PortfolioAsset> = balances
        .into_iter()
        .map(|balance| {
            let free = parse_amount(&balance.free);
            let locked = parse_amount(&balance.locked);
            let total = free + locked;
            let value_usdt = if STABLE_ASSETS.contains(&balance.asset.as_str()) {
                total
            } else {
                usdt_rate(&balance.asset, &quote).map_or(0.0, |rate| total * rate)
            };
            PortfolioAsset {
                asset: balance.asset,
                free,
                locked,
                total,
                value_usdt,
            }
        })
        .collect();

    assets.sort_by(|a, b| b.value_usdt.total_cmp(&a.value_usdt));
    let total_value_usdt = assets.iter().map(|a| a.value_usdt).sum();

    Portfolio {
        total_value_usdt,
        assets,
    }
}

fn usdt_rate<F>(asset: &str, quote: &F) -> Option<f64>
where
    F: Fn(&str, &str) -> Option<f64>,
{
    if let Some(direct) = quote(asset, "USDT") {
        return Some(direct);
    }
    let in_btc = quote(asset, "BTC")?;
    let btc_usdt = quote("BTC", "USDT")?;
    Some(in_btc * btc_usdt)
}
