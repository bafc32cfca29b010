// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token session authentication for the gateway API.
//!
//! ## Auth Flow
//!
//! 1. Client connects once with raw exchange credentials
//! 2. The connect handler verifies them against the venue and mints an
//!    opaque session token
//! 3. Client sends `Authorization: Bearer <token>` on every subsequent read
//! 4. The extractor resolves the token against the session store:
//!    - expired records are evicted during the lookup
//!    - the resolved session names the owning user and the bound venue
//!
//! ## Security
//!
//! - Tokens are 256 bits of CSPRNG output; they carry no embedded claims
//! - Credential material never rides on the request; handlers that need it
//!   decrypt from the store per call and discard it after use
//! - A revoked or expired token fails closed with a 401

pub mod error;
pub mod extractor;

pub use error::AuthError;
pub use extractor::{ActiveSession, SessionAuth};
