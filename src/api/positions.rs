// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    auth::SessionAuth,
    error::ApiError,
    models::PositionsResponse,
    state::AppState,
};

/// Open derivative positions for the session's exchange account.
///
/// Venues without a derivatives surface answer with an empty list and a
/// note; this is a successful read, not an error.
#[utoipa::path(
    get,
    path = "/api/exchange/positions",
    tag = "Reads",
    responses(
        (status = 200, description = "Open positions, zero-size entries removed", body = PositionsResponse),
        (status = 401, description = "Missing, invalid, or expired token"),
        (status = 429, description = "Venue is rate limiting"),
        (status = 502, description = "Venue answered unintelligibly"),
        (status = 503, description = "Venue unreachable")
    )
)]
pub async fn get_positions(
    SessionAuth(session): SessionAuth,
    State(state): State<AppState>,
) -> Result<Json<PositionsResponse>, ApiError> {
    let credentials = {
        let mut sessions = state.sessions.write().await;
        sessions.get_api_keys(&session.token)?
    }
    .ok_or_else(|| ApiError::unauthorized("Session not found or expired"))?;

    let report = state
        .exchanges
        .get(session.exchange)
        .fetch_positions(&credentials)
        .await?;

    Ok(Json(PositionsResponse {
        success: true,
        data: report.positions,
        note: report.note,
    }))
}
