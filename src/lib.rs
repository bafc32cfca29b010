// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Exchange Gateway - Session-Scoped Credential Vault and Venue Adapters
//!
//! This crate verifies exchange API credentials against their venue, stores
//! them encrypted under an opaque session token, and serves normalized
//! account reads (balances, portfolio valuation, positions) over HTTP.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Bearer-token session authentication
//! - `exchange` - Venue adapters (Binance, Hyperliquid) and request signing
//! - `session` - Encrypted credential vault with TTL expiry

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod exchange;
pub mod models;
pub mod session;
pub mod state;
