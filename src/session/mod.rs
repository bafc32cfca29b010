// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Vault
//!
//! Token-bound, encrypted-at-rest storage for exchange credentials.
//!
//! ## Session Flow
//!
//! 1. Client posts raw credentials to `/api/exchange/connect`
//! 2. The matching exchange adapter verifies them against the venue
//! 3. [`SessionStore::create_session`] encrypts both key fields
//!    (AES-256-CBC, fresh IV each) and mints an opaque bearer token with a
//!    fixed 7-day expiry
//! 4. Later reads present the token; [`SessionStore::get_api_keys`] decrypts
//!    for the duration of one upstream call and the plaintext is discarded
//! 5. Expired records are evicted lazily on read and in bulk by the
//!    [`ExpirySweeper`]
//!
//! ## Security
//!
//! - Plaintext credentials never enter the session table
//! - Tokens are 32 bytes of CSPRNG output, hex encoded, carrying no claims
//! - A missing encryption key halts startup; there is no fallback key

pub mod cipher;
pub mod store;
pub mod sweeper;

pub use cipher::{CipherError, CredentialCipher};
pub use store::{
    IssuedSession, SessionError, SessionMetadata, SessionStore, SessionSummary, SESSION_TTL_MS,
};
pub use sweeper::ExpirySweeper;
