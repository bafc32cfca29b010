// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::exchange::ExchangeError;
use crate::session::SessionError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

/// Classified upstream failures map onto transport statuses in one place:
/// credential rejections are the client's fault, throttling and outages are
/// the venue's, and anything unintelligible is a bad gateway.
impl From<ExchangeError> for ApiError {
    fn from(err: ExchangeError) -> Self {
        tracing::warn!(error = %err, "upstream exchange call failed");
        let status = match err {
            ExchangeError::Auth(_) => StatusCode::BAD_REQUEST,
            ExchangeError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ExchangeError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ExchangeError::Protocol(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        // Root cause goes to the log; the client only learns the session is
        // unusable.
        tracing::error!(error = %err, "session credential read failed");
        Self::internal("Stored session credentials are unreadable")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
