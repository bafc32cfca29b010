// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for session-authenticated requests.
//!
//! Use the `SessionAuth` extractor in handlers to require a live session:
//!
//! ```rust,ignore
//! async fn my_handler(SessionAuth(session): SessionAuth) -> impl IntoResponse {
//!     // session is ActiveSession
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::AuthError;
use crate::models::ExchangeId;
use crate::state::AppState;

/// Resolved session identity attached to a request.
///
/// Carries no credential material; handlers that need the decrypted keys go
/// back to the store with the token.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub token: String,
    pub user_id: String,
    pub exchange: ExchangeId,
}

/// Extractor for session-authenticated requests.
///
/// Validates the bearer token from the Authorization header against the
/// session store. Expired sessions are evicted during the lookup, so a stale
/// token rejects the same way an unknown one does.
///
/// # Example
///
/// ```rust,ignore
/// async fn get_balances(
///     SessionAuth(session): SessionAuth,
///     State(state): State<AppState>,
/// ) -> Result<Json<BalancesResponse>, ApiError> {
///     // session.exchange names the venue this token is bound to
/// }
/// ```
pub struct SessionAuth(pub ActiveSession);

impl FromRequestParts<AppState> for SessionAuth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if an earlier extractor already resolved the session
        if let Some(session) = parts.extensions.get::<ActiveSession>().cloned() {
            return Ok(SessionAuth(session));
        }

        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        // Extract Bearer token
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;
        if token.is_empty() {
            return Err(AuthError::InvalidAuthHeader);
        }

        // The lookup takes the write lock because expired records are
        // evicted in place; it is held only for the map access.
        let metadata = state
            .sessions
            .write()
            .await
            .get_session(token)
            .ok_or(AuthError::SessionNotFound)?;

        Ok(SessionAuth(ActiveSession {
            token: token.to_string(),
            user_id: metadata.user_id,
            exchange: metadata.exchange,
        }))
    }
}
