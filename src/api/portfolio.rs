// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    auth::SessionAuth,
    error::ApiError,
    models::PortfolioResponse,
    state::AppState,
};

/// Portfolio valuation for the session's exchange account.
///
/// Values are a pricing heuristic: stables at face, everything else through
/// the venue's market table, unknown assets at zero.
#[utoipa::path(
    get,
    path = "/api/exchange/portfolio",
    tag = "Reads",
    responses(
        (status = 200, description = "Holdings valued in USDT, largest first", body = PortfolioResponse),
        (status = 401, description = "Missing, invalid, or expired token"),
        (status = 429, description = "Venue is rate limiting"),
        (status = 502, description = "Venue answered unintelligibly"),
        (status = 503, description = "Venue unreachable")
    )
)]
pub async fn get_portfolio(
    SessionAuth(session): SessionAuth,
    State(state): State<AppState>,
) -> Result<Json<PortfolioResponse>, ApiError> {
    let credentials = {
        let mut sessions = state.sessions.write().await;
        sessions.get_api_keys(&session.token)?
    }
    .ok_or_else(|| ApiError::unauthorized("Session not found or expired"))?;

    let portfolio = state
        .exchanges
        .get(session.exchange)
        .fetch_portfolio_value(&credentials)
        .await?;

    Ok(Json(PortfolioResponse {
        success: true,
        data: portfolio,
    }))
}
