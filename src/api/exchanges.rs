// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{ExchangeId, ExchangeInfo};

/// Catalogue of supported venues.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExchangesResponse {
    pub exchanges: Vec<ExchangeInfo>,
}

/// List the exchanges this gateway can connect to.
#[utoipa::path(
    get,
    path = "/api/exchanges",
    tag = "Exchanges",
    responses(
        (status = 200, description = "Supported exchanges", body = ExchangesResponse)
    )
)]
pub async fn list_exchanges() -> Json<ExchangesResponse> {
    Json(ExchangesResponse {
        exchanges: ExchangeId::ALL.into_iter().map(ExchangeInfo::from).collect(),
    })
}
