// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Request Signer
//!
//! HMAC-SHA256 request signing for venues with signed-query authentication.
//!
//! The canonical string is the query parameters joined `key=value&…` in the
//! exact order the caller supplies; parameter order is part of the signed
//! contract, not an implementation detail. The hex digest is appended as the
//! `signature` parameter. Signing is deterministic for a fixed
//! `(secret, canonical string)` pair; live requests differ only because they
//! embed the current timestamp.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs canonical query strings with an account secret.
pub struct RequestSigner {
    secret: String,
}

impl RequestSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Build the canonical query string: `key=value` pairs joined with `&`
    /// in the exact order given.
    pub fn canonical_query(params: &[(&str, &str)]) -> String {
        params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// HMAC-SHA256 over `message`, returned as lowercase hex.
    pub fn sign(&self, message: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Canonical query string with `&signature=<hex>` appended, ready to be
    /// attached to an authenticated request.
    pub fn signed_query(&self, params: &[(&str, &str)]) -> String {
        let canonical = Self::canonical_query(params);
        let signature = self.sign(&canonical);
        format!("{canonical}&signature={signature}")
    }
}

/// Current epoch time in milliseconds, the timestamp unit signed requests
/// carry.
pub fn timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_query_preserves_parameter_order() {
        let query = RequestSigner::canonical_query(&[
            ("timestamp", "1000000"),
            ("recvWindow", "5000"),
        ]);
        assert_eq!(query, "timestamp=1000000&recvWindow=5000");

        assert_eq!(RequestSigner::canonical_query(&[]), "");
        assert_eq!(
            RequestSigner::canonical_query(&[("timestamp", "42")]),
            "timestamp=42"
        );
    }

    #[test]
    fn signature_matches_fixed_vectors() {
        // RFC-style sanity vector.
        let signer = RequestSigner::new("secret");
        assert_eq!(
            signer.sign("message"),
            "8b5f48702995c1598c573db1e21866a9b825d4a794d169d7060a03605796360b"
        );

        // Timestamp-only canonical string, the shape every account read signs.
        let signer = RequestSigner::new("s3cr3t");
        assert_eq!(
            signer.sign("timestamp=1000000"),
            "e514633446e09e9048b2e084ede2157e2b950692638a423fd8e052a6973a8202"
        );
    }

    #[test]
    fn signature_matches_binance_documentation_vector() {
        let signer =
            RequestSigner::new("NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j");
        let canonical = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";

        assert_eq!(
            signer.sign(canonical),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn signing_is_deterministic_across_instances() {
        let first = RequestSigner::new("s3cr3t").sign("timestamp=1000000");
        let second = RequestSigner::new("s3cr3t").sign("timestamp=1000000");

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn signed_query_appends_signature_over_canonical_string() {
        let signer = RequestSigner::new("s3cr3t");
        let query = signer.signed_query(&[("timestamp", "1000000")]);

        assert_eq!(
            query,
            "timestamp=1000000&signature=e514633446e09e9048b2e084ede2157e2b950692638a423fd8e052a6973a8202"
        );
    }
}
