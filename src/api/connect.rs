// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use tracing::info;

use crate::{
    auth::SessionAuth,
    config::DEFAULT_USER_ID,
    error::ApiError,
    models::{
        ConnectData, ConnectRequest, ConnectResponse, DisconnectResponse, ExchangeCredentials,
        ExchangeId,
    },
    state::AppState,
};

/// Verify exchange credentials and issue a session token.
///
/// The credentials are round-tripped to the venue first; only a successful
/// verification mints a session. The raw keys are encrypted into the store
/// and do not appear in the response or the logs.
#[utoipa::path(
    post,
    path = "/api/exchange/connect",
    request_body = ConnectRequest,
    tag = "Sessions",
    responses(
        (status = 200, description = "Credentials verified, session issued", body = ConnectResponse),
        (status = 400, description = "Missing parameters, unsupported exchange, or rejected credentials"),
        (status = 429, description = "Venue is rate limiting"),
        (status = 503, description = "Venue unreachable")
    )
)]
pub async fn connect_exchange(
    State(state): State<AppState>,
    Json(request): Json<ConnectRequest>,
) -> Result<Json<ConnectResponse>, ApiError> {
    if request.exchange.is_empty() || request.api_key.is_empty() || request.secret_key.is_empty() {
        return Err(ApiError::bad_request("Missing required parameters"));
    }

    let exchange = ExchangeId::parse(&request.exchange)
        .ok_or_else(|| ApiError::bad_request("Unsupported exchange"))?;

    let credentials = ExchangeCredentials {
        exchange,
        api_key: request.api_key,
        secret_key: request.secret_key,
    };

    let snapshot = state.exchanges.get(exchange).verify(&credentials).await?;

    let issued = state
        .sessions
        .write()
        .await
        .create_session(DEFAULT_USER_ID, &credentials);

    info!(
        exchange = %exchange,
        assets = snapshot.assets,
        "credentials verified, session issued"
    );

    Ok(Json(ConnectResponse {
        success: true,
        message: format!("Successfully connected to {}", exchange.display_name()),
        data: ConnectData {
            token: issued.token,
            expires_at: issued.expires_at,
            exchange,
        },
    }))
}

/// Revoke the presented session.
///
/// Idempotent from the client's point of view: revoking an already-gone
/// session still succeeds, with `revoked: false`.
#[utoipa::path(
    delete,
    path = "/api/exchange/disconnect",
    tag = "Sessions",
    responses(
        (status = 200, description = "Session revoked", body = DisconnectResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn disconnect_exchange(
    SessionAuth(session): SessionAuth,
    State(state): State<AppState>,
) -> Json<DisconnectResponse> {
    let revoked = state.sessions.write().await.delete_session(&session.token);

    info!(exchange = %session.exchange, "session revoked");

    Json(DisconnectResponse {
        success: true,
        revoked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ActiveSession;
    use crate::exchange::{BinanceAdapter, ExchangeRegistry, HyperliquidAdapter};
    use crate::session::{CredentialCipher, SessionStore, SESSION_TTL_MS};
    use axum::http::StatusCode;
    use chrono::Utc;
    use url::Url;

    fn test_state() -> AppState {
        let store = SessionStore::new(CredentialCipher::new([9u8; 32]));
        AppState::new(store, ExchangeRegistry::new().unwrap())
    }

    fn state_with_mock_venues(server: &mockito::Server) -> AppState {
        let base_url = Url::parse(&server.url()).unwrap();
        let binance = BinanceAdapter::with_base_url(base_url.clone()).unwrap();
        let hyperliquid = HyperliquidAdapter::with_base_url(base_url).unwrap();
        let store = SessionStore::new(CredentialCipher::new([9u8; 32]));
        AppState::new(store, ExchangeRegistry::with_adapters(binance, hyperliquid))
    }

    fn connect_request(exchange: &str) -> ConnectRequest {
        ConnectRequest {
            exchange: exchange.to_string(),
            api_key: "key".to_string(),
            secret_key: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn connect_rejects_missing_parameters() {
        let state = test_state();
        let request = ConnectRequest {
            exchange: "binance".to_string(),
            api_key: String::new(),
            secret_key: "secret".to_string(),
        };

        let err = connect_exchange(State(state), Json(request))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Missing required parameters");
    }

    #[tokio::test]
    async fn connect_rejects_unknown_exchange() {
        let state = test_state();

        let err = connect_exchange(State(state), Json(connect_request("kraken")))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Unsupported exchange");
    }

    #[tokio::test]
    async fn successful_verification_issues_a_week_long_session() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/account")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"balances":[{"asset":"BTC","free":"1","locked":"0"}]}"#)
            .create_async()
            .await;

        let state = state_with_mock_venues(&server);
        let before = Utc::now().timestamp_millis();

        let Json(response) = connect_exchange(State(state.clone()), Json(connect_request("binance")))
            .await
            .expect("connect succeeds");

        assert!(response.success);
        assert_eq!(response.message, "Successfully connected to Binance");
        assert_eq!(response.data.exchange, ExchangeId::Binance);
        assert_eq!(response.data.token.len(), 64);

        let ttl = response.data.expires_at - before;
        assert!(ttl >= SESSION_TTL_MS - 5_000 && ttl <= SESSION_TTL_MS + 5_000);

        let metadata = state
            .sessions
            .write()
            .await
            .get_session(&response.data.token)
            .expect("session resolvable after connect");
        assert_eq!(metadata.user_id, DEFAULT_USER_ID);
        assert_eq!(metadata.exchange, ExchangeId::Binance);
    }

    #[tokio::test]
    async fn rejected_credentials_do_not_mint_a_session() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v3/account")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":-2014,"msg":"API-key format invalid."}"#)
            .create_async()
            .await;

        let state = state_with_mock_venues(&server);

        let err = connect_exchange(State(state.clone()), Json(connect_request("binance")))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(state.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn hyperliquid_connect_uses_the_address_keyed_flow() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/info")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"assetPositions":[{"coin":"BTC","free":"1","locked":"0"}]}"#)
            .create_async()
            .await;

        let state = state_with_mock_venues(&server);

        let Json(response) =
            connect_exchange(State(state), Json(connect_request("hyperliquid")))
                .await
                .expect("connect succeeds");

        assert_eq!(response.message, "Successfully connected to Hyperliquid");
        assert_eq!(response.data.exchange, ExchangeId::Hyperliquid);
    }

    #[tokio::test]
    async fn disconnect_revokes_once_then_reports_already_gone() {
        let state = test_state();
        let credentials = ExchangeCredentials {
            exchange: ExchangeId::Binance,
            api_key: "key".to_string(),
            secret_key: "secret".to_string(),
        };
        let issued = state
            .sessions
            .write()
            .await
            .create_session(DEFAULT_USER_ID, &credentials);

        let session = ActiveSession {
            token: issued.token.clone(),
            user_id: DEFAULT_USER_ID.to_string(),
            exchange: ExchangeId::Binance,
        };

        let Json(first) =
            disconnect_exchange(SessionAuth(session.clone()), State(state.clone())).await;
        assert!(first.success);
        assert!(first.revoked);

        let Json(second) = disconnect_exchange(SessionAuth(session), State(state.clone())).await;
        assert!(second.success);
        assert!(!second.revoked);

        assert!(state.sessions.read().await.is_empty());
    }
}
