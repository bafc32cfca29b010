// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Store
//!
//! In-memory vault mapping opaque bearer tokens to encrypted exchange
//! credentials. A session is minted after upstream verification succeeds and
//! lives for a fixed seven days; plaintext keys exist only inside a single
//! decrypt-use-discard cycle per request.
//!
//! Expiry is lazy: any read that encounters an expired record evicts it and
//! reports absence. The optional [`ExpirySweeper`](super::ExpirySweeper)
//! additionally removes abandoned records in the background so the table
//! cannot grow without bound.
//!
//! The store is a plain struct; `AppState` wraps it in `Arc<RwLock<…>>` so
//! request handlers share one table. Lock hold times stay short: map access
//! plus constant-time crypto, never upstream I/O.

use std::collections::HashMap;

use chrono::Utc;
use rand::{rngs::OsRng, RngCore};

use crate::models::{ExchangeCredentials, ExchangeId};

use super::cipher::{CipherError, CredentialCipher};

/// Fixed session lifetime: 7 days, in milliseconds.
pub const SESSION_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Random bytes per token; encoded to twice as many hex characters.
const TOKEN_BYTES: usize = 32;

/// Store-level failures. Absence (unknown or expired token) is not an error;
/// reads report it as `None`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Stored ciphertext could not be read back with the process key. The
    /// record is left in place; the session is unusable, not the store.
    #[error("stored credentials could not be read: {0}")]
    Decryption(#[from] CipherError),
}

/// One authenticated binding between a token and an encrypted credential
/// pair. Plaintext credentials are never part of this record.
#[derive(Clone)]
struct Session {
    user_id: String,
    exchange: ExchangeId,
    encrypted_api_key: String,
    encrypted_secret_key: String,
    created_at: i64,
    expires_at: i64,
}

/// Token and absolute expiry handed back at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    pub token: String,
    /// Epoch milliseconds.
    pub expires_at: i64,
}

/// Session metadata, readable without touching the encrypted fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMetadata {
    pub user_id: String,
    pub exchange: ExchangeId,
    pub created_at: i64,
    pub expires_at: i64,
}

/// Enumeration entry for one of a user's sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub token: String,
    pub exchange: ExchangeId,
    pub expires_at: i64,
}

pub struct SessionStore {
    sessions: HashMap<String, Session>,
    cipher: CredentialCipher,
}

impl SessionStore {
    pub fn new(cipher: CredentialCipher) -> Self {
        Self {
            sessions: HashMap::new(),
            cipher,
        }
    }

    /// Mint a session bound to `credentials`. Both key fields are encrypted
    /// independently; the returned token is 64 lowercase hex characters of
    /// CSPRNG output, making collisions negligible.
    pub fn create_session(
        &mut self,
        user_id: &str,
        credentials: &ExchangeCredentials,
    ) -> IssuedSession {
        self.create_session_at(Utc::now().timestamp_millis(), user_id, credentials)
    }

    /// Look up session metadata without decrypting anything. Evicts and
    /// reports `None` if the record has expired.
    pub fn get_session(&mut self, token: &str) -> Option<SessionMetadata> {
        self.get_session_at(Utc::now().timestamp_millis(), token)
    }

    /// Decrypt and return the credentials bound to `token`. Evicts and
    /// reports `Ok(None)` if the record has expired or never existed.
    pub fn get_api_keys(
        &mut self,
        token: &str,
    ) -> Result<Option<ExchangeCredentials>, SessionError> {
        self.get_api_keys_at(Utc::now().timestamp_millis(), token)
    }

    /// Remove a session. Idempotent: `true` only when a record was present.
    pub fn delete_session(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Enumerate `user_id`'s live sessions. Skips expired records without
    /// evicting them; eviction belongs to reads and the sweeper.
    pub fn user_sessions(&self, user_id: &str) -> Vec<SessionSummary> {
        self.user_sessions_at(Utc::now().timestamp_millis(), user_id)
    }

    /// Remove every expired record; returns how many were evicted.
    pub fn sweep_expired(&mut self) -> usize {
        self.sweep_expired_at(Utc::now().timestamp_millis())
    }

    /// Number of records currently held, including not-yet-evicted expired
    /// ones.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn create_session_at(
        &mut self,
        now_ms: i64,
        user_id: &str,
        credentials: &ExchangeCredentials,
    ) -> IssuedSession {
        let token = generate_token();
        let expires_at = now_ms + SESSION_TTL_MS;

        let session = Session {
            user_id: user_id.to_string(),
            exchange: credentials.exchange,
            encrypted_api_key: self.cipher.encrypt(credentials.api_key.as_bytes()),
            encrypted_secret_key: self.cipher.encrypt(credentials.secret_key.as_bytes()),
            created_at: now_ms,
            expires_at,
        };
        self.sessions.insert(token.clone(), session);

        IssuedSession { token, expires_at }
    }

    fn get_session_at(&mut self, now_ms: i64, token: &str) -> Option<SessionMetadata> {
        let session = self.live_session(now_ms, token)?;
        Some(SessionMetadata {
            user_id: session.user_id.clone(),
            exchange: session.exchange,
            created_at: session.created_at,
            expires_at: session.expires_at,
        })
    }

    fn get_api_keys_at(
        &mut self,
        now_ms: i64,
        token: &str,
    ) -> Result<Option<ExchangeCredentials>, SessionError> {
        let (exchange, encrypted_api_key, encrypted_secret_key) =
            match self.live_session(now_ms, token) {
                Some(session) => (
                    session.exchange,
                    session.encrypted_api_key.clone(),
                    session.encrypted_secret_key.clone(),
                ),
                None => return Ok(None),
            };

        let api_key = decrypt_utf8(&self.cipher, &encrypted_api_key)?;
        let secret_key = decrypt_utf8(&self.cipher, &encrypted_secret_key)?;

        Ok(Some(ExchangeCredentials {
            exchange,
            api_key,
            secret_key,
        }))
    }

    fn user_sessions_at(&self, now_ms: i64, user_id: &str) -> Vec<SessionSummary> {
        self.sessions
            .iter()
            .filter(|(_, session)| session.user_id == user_id && now_ms <= session.expires_at)
            .map(|(token, session)| SessionSummary {
                token: token.clone(),
                exchange: session.exchange,
                expires_at: session.expires_at,
            })
            .collect()
    }

    fn sweep_expired_at(&mut self, now_ms: i64) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| now_ms <= session.expires_at);
        before - self.sessions.len()
    }

    /// Fetch a session if it is still live; an expired record is evicted on
    /// the spot. A record is live while `now <= expires_at`.
    fn live_session(&mut self, now_ms: i64, token: &str) -> Option<&Session> {
        let expired = match self.sessions.get(token) {
            Some(session) => now_ms > session.expires_at,
            None => return None,
        };

        if expired {
            self.sessions.remove(token);
            return None;
        }

        self.sessions.get(token)
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn decrypt_utf8(cipher: &CredentialCipher, blob: &str) -> Result<String, SessionError> {
    let bytes = cipher.decrypt(blob)?;
    // Credentials went in as UTF-8; anything else means the key changed
    // underneath us and unpadding succeeded by chance.
    String::from_utf8(bytes).map_err(|_| SessionError::Decryption(CipherError::Decrypt))
}
