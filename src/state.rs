// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::exchange::ExchangeRegistry;
use crate::session::SessionStore;

/// Shared application state.
///
/// The session store sits behind a write lock; handlers take it only for the
/// store call itself and release it before any upstream I/O. Adapters are
/// immutable after startup and shared without locking.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<SessionStore>>,
    pub exchanges: Arc<ExchangeRegistry>,
}

impl AppState {
    pub fn new(sessions: SessionStore, exchanges: ExchangeRegistry) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(sessions)),
            exchanges: Arc::new(exchanges),
        }
    }
}
