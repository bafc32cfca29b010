// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Upstream Error Classification
//!
//! Every adapter call reports failures through [`ExchangeError`], never as a
//! raw transport error. Classification happens in exactly two shared places
//! ([`classify_transport`] for reqwest-level failures, [`classify_status`]
//! for HTTP statuses) plus one venue-specific response mapper per adapter
//! that extracts the venue's error message (and error code, where the venue
//! has them) before falling back to the status rules here.

use reqwest::StatusCode;

/// Classified upstream failure.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// The venue rejected the credentials (bad key, bad signature, missing
    /// permission).
    #[error("exchange rejected the credentials: {0}")]
    Auth(String),

    /// The venue is throttling us.
    #[error("exchange rate limit exceeded: {0}")]
    RateLimited(String),

    /// The venue could not be reached or answered with a server failure:
    /// timeout, DNS, refused connection, 5xx.
    #[error("exchange unreachable: {0}")]
    Unavailable(String),

    /// The venue answered with something we cannot interpret.
    #[error("unexpected exchange response: {0}")]
    Protocol(String),
}

/// Classify a reqwest failure that prevented a response from arriving.
///
/// Timeouts and connection failures (DNS, refused) are distinct conditions
/// upstream but the same class here; the message keeps them apart for
/// diagnostics.
pub(crate) fn classify_transport(err: reqwest::Error) -> ExchangeError {
    if err.is_timeout() {
        ExchangeError::Unavailable(format!("request timed out: {err}"))
    } else if err.is_connect() {
        ExchangeError::Unavailable(format!("connection failed: {err}"))
    } else if err.is_decode() {
        ExchangeError::Protocol(format!("response body could not be read: {err}"))
    } else {
        ExchangeError::Unavailable(format!("transport error: {err}"))
    }
}

/// Fallback classification for a non-success HTTP status once venue-specific
/// interpretation has not matched. `detail` is the best message available,
/// usually extracted from the venue's error body.
pub(crate) fn classify_status(status: StatusCode, detail: &str) -> ExchangeError {
    let detail = if detail.trim().is_empty() {
        status.canonical_reason().unwrap_or("upstream error")
    } else {
        detail
    };

    match status.as_u16() {
        401 | 403 => ExchangeError::Auth(detail.to_string()),
        // Binance uses 418 for auto-banned IPs, a harder form of 429.
        418 | 429 => ExchangeError::RateLimited(detail.to_string()),
        s if s >= 500 => ExchangeError::Unavailable(detail.to_string()),
        _ => ExchangeError::Protocol(format!("HTTP {}: {detail}", status.as_u16())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification_is_stable() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "bad key"),
            ExchangeError::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "denied"),
            ExchangeError::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            ExchangeError::RateLimited(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::IM_A_TEAPOT, "banned"),
            ExchangeError::RateLimited(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ExchangeError::Unavailable(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE, "maintenance"),
            ExchangeError::Unavailable(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "gone"),
            ExchangeError::Protocol(_)
        ));
    }

    #[test]
    fn empty_detail_falls_back_to_canonical_reason() {
        let err = classify_status(StatusCode::FORBIDDEN, "");
        assert_eq!(
            err.to_string(),
            "exchange rejected the credentials: Forbidden"
        );
    }
}
