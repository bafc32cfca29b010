// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        AssetBalance, BalancesResponse, Candle, ConnectData, ConnectRequest, ConnectResponse,
        DisconnectResponse, ExchangeId, ExchangeInfo, MarketHistoryResponse, Portfolio,
        PortfolioAsset, PortfolioResponse, PositionRecord, PositionsResponse,
    },
    state::AppState,
};

pub mod balances;
pub mod connect;
pub mod exchanges;
pub mod health;
pub mod market;
pub mod portfolio;
pub mod positions;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health))
        .route("/exchanges", get(exchanges::list_exchanges))
        .route("/exchange/connect", post(connect::connect_exchange))
        .route("/exchange/disconnect", delete(connect::disconnect_exchange))
        .route("/exchange/balances", get(balances::get_balances))
        .route("/exchange/portfolio", get(portfolio::get_portfolio))
        .route("/exchange/positions", get(positions::get_positions))
        .route("/market/history", get(market::get_market_history))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        exchanges::list_exchanges,
        connect::connect_exchange,
        connect::disconnect_exchange,
        balances::get_balances,
        portfolio::get_portfolio,
        positions::get_positions,
        market::get_market_history
    ),
    components(
        schemas(
            ExchangeId,
            ExchangeInfo,
            ConnectRequest,
            ConnectResponse,
            ConnectData,
            DisconnectResponse,
            AssetBalance,
            BalancesResponse,
            PortfolioAsset,
            Portfolio,
            PortfolioResponse,
            PositionRecord,
            PositionsResponse,
            Candle,
            MarketHistoryResponse,
            health::HealthResponse,
            exchanges::ExchangesResponse
        )
    ),
    tags(
        (name = "Health", description = "Service liveness"),
        (name = "Exchanges", description = "Supported venue catalogue"),
        (name = "Sessions", description = "Credential verification and session lifecycle"),
        (name = "Reads", description = "Authenticated account reads"),
        (name = "Market", description = "Synthetic chart data")
    )
)]
struct ApiDoc;
