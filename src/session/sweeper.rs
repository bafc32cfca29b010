// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Expiry Sweeper
//!
//! Background task that periodically evicts expired sessions from the store.
//! Correctness never depends on it (every read path evicts lazily), but
//! without a sweep the table grows unbounded with abandoned sessions. The
//! sweeper runs independently of the request path and takes the table lock
//! only for the duration of one `sweep_expired` call.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown, the
//! same pattern the rest of the service uses for background work.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::SessionStore;

/// Default interval between eviction sweeps.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Background task evicting expired sessions on a fixed interval.
pub struct ExpirySweeper {
    sessions: Arc<RwLock<SessionStore>>,
    sweep_interval: Duration,
}

impl ExpirySweeper {
    pub fn new(sessions: Arc<RwLock<SessionStore>>) -> Self {
        Self {
            sessions,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    /// Override the sweep interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.sweep_interval.as_secs(),
            "Session expiry sweeper starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Session expiry sweeper shutting down");
                return;
            }

            self.sweep_step().await;

            tokio::select! {
                _ = tokio::time::sleep(self.sweep_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Session expiry sweeper shutting down");
                    return;
                }
            }
        }
    }

    /// Execute one sweep: evict everything whose expiry has passed.
    async fn sweep_step(&self) {
        let removed = self.sessions.write().await.sweep_expired();
        if removed > 0 {
            info!(removed, "Session sweeper: evicted expired sessions");
        }
    }
}
