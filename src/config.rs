// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! startup configuration loader. Configuration is loaded from the
//! environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ENCRYPTION_KEY` | 32-byte key for credential encryption at rest | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! There is no fallback for `ENCRYPTION_KEY`: an unset or wrong-length key
//! stops the process at startup instead of silently encrypting with a
//! well-known value.

use crate::session::cipher::KEY_SIZE;

/// Environment variable name for the credential encryption key.
///
/// The value must be exactly [`KEY_SIZE`] bytes; it is used verbatim as the
/// AES-256 key for credentials at rest.
pub const ENCRYPTION_KEY_ENV: &str = "ENCRYPTION_KEY";

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "3000";

/// Fixed session owner until real user authentication exists upstream.
///
/// The session data model carries a `user_id` so that multi-user auth can
/// be added without a migration; every session today belongs to this
/// placeholder identity.
pub const DEFAULT_USER_ID: &str = "user123";

/// Startup configuration error. Any of these aborts the boot.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {name} is required and not set")]
    MissingKey { name: &'static str },

    #[error("encryption key must be exactly {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("PORT is not a valid port number: {0}")]
    InvalidPort(String),
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub encryption_key: [u8; KEY_SIZE],
}

impl Config {
    /// Load and validate configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or_default(HOST_ENV, DEFAULT_HOST);

        let port_raw = env_or_default(PORT_ENV, DEFAULT_PORT);
        let port = port_raw
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(port_raw))?;

        let key_raw = env_required(ENCRYPTION_KEY_ENV)?;
        let encryption_key = parse_encryption_key(&key_raw)?;

        Ok(Self {
            host,
            port,
            encryption_key,
        })
    }
}

/// Validate the raw key material: exactly [`KEY_SIZE`] bytes, used verbatim.
pub fn parse_encryption_key(raw: &str) -> Result<[u8; KEY_SIZE], ConfigError> {
    let bytes = raw.as_bytes();
    bytes
        .try_into()
        .map_err(|_| ConfigError::InvalidKeyLength {
            expected: KEY_SIZE,
            got: bytes.len(),
        })
}

fn env_required(name: &'static str) -> Result<String, ConfigError> {
    env_optional(name).ok_or(ConfigError::MissingKey { name })
}

fn env_optional(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
