// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

mod api;
mod auth;
mod config;
mod error;
mod exchange;
mod models;
mod session;
mod state;

#[cfg(not(test))]
use std::net::SocketAddr;

#[cfg(not(test))]
use tokio_util::sync::CancellationToken;
#[cfg(not(test))]
use tracing::{error, info};

#[cfg(not(test))]
use api::router;
#[cfg(not(test))]
use config::Config;
#[cfg(not(test))]
use exchange::ExchangeRegistry;
#[cfg(not(test))]
use session::{CredentialCipher, ExpirySweeper, SessionStore};
#[cfg(not(test))]
use state::AppState;

#[cfg(not(test))]
#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    // Refuse to start without a usable encryption key (there is no fallback).
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            std::process::exit(1);
        }
    };

    let registry = match ExchangeRegistry::new() {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("Failed to initialise exchange adapters: {err}");
            std::process::exit(1);
        }
    };

    let store = SessionStore::new(CredentialCipher::new(config.encryption_key));
    let state = AppState::new(store, registry);

    // Background expiry sweep; cancelled on shutdown.
    let shutdown = CancellationToken::new();
    tokio::spawn(ExpirySweeper::new(state.sessions.clone()).run(shutdown.clone()));

    let app = router(state);

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(err) => {
            eprintln!(
                "Invalid listen address {}:{}: {err}",
                config.host, config.port
            );
            std::process::exit(1);
        }
    };

    println!("Exchange gateway listening on http://{addr} (docs at /docs)");
    info!(%addr, "exchange gateway started");

    tokio::select! {
        result = axum_server::bind(addr).serve(app.into_make_service()) => {
            if let Err(err) = result {
                error!(error = %err, "server exited unexpectedly");
                shutdown.cancel();
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, stopping background sweep");
            shutdown.cancel();
        }
    }
}

#[cfg(not(test))]
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug"));

    let json = std::env::var(config::LOG_FORMAT_ENV)
        .map(|value| value.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
