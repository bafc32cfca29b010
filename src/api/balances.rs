// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    auth::SessionAuth,
    error::ApiError,
    models::BalancesResponse,
    state::AppState,
};

/// Positive balances for the session's exchange account.
#[utoipa::path(
    get,
    path = "/api/exchange/balances",
    tag = "Reads",
    responses(
        (status = 200, description = "Positive balances, venue order", body = BalancesResponse),
        (status = 401, description = "Missing, invalid, or expired token"),
        (status = 429, description = "Venue is rate limiting"),
        (status = 502, description = "Venue answered unintelligibly"),
        (status = 503, description = "Venue unreachable")
    )
)]
pub async fn get_balances(
    SessionAuth(session): SessionAuth,
    State(state): State<AppState>,
) -> Result<Json<BalancesResponse>, ApiError> {
    // The store lock is released before the upstream call.
    let credentials = {
        let mut sessions = state.sessions.write().await;
        sessions.get_api_keys(&session.token)?
    }
    .ok_or_else(|| ApiError::unauthorized("Session not found or expired"))?;

    let balances = state
        .exchanges
        .get(session.exchange)
        .fetch_balances(&credentials)
        .await?;

    Ok(Json(BalancesResponse {
        success: true,
        data: balances,
    }))
}
