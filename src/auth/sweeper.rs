// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Nonce Sweeper
//!
//! Background task that periodically drops expired sign-in challenges.
//! Redemption already rejects expired entries on lookup; the sweep only
//! bounds memory for challenges that are never redeemed.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::ChallengeAuthenticator;

/// Default interval between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Background sweeper for the pending-challenge store.
pub struct NonceSweeper {
    challenges: Arc<ChallengeAuthenticator>,
    interval: Duration,
}

impl NonceSweeper {
    pub fn new(challenges: Arc<ChallengeAuthenticator>) -> Self {
        Self {
            challenges,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
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
            interval_secs = self.interval.as_secs(),
            "Nonce sweeper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Nonce sweeper shutting down");
                    return;
                }
            }

            self.sweep_step();
        }
    }

    /// Drop every expired challenge once.
    pub fn sweep_step(&self) -> usize {
        let now = self.challenges.clock().now();
        let purged = self.challenges.store().purge_expired(now);
        if purged > 0 {
            debug!(
                purged,
                remaining = self.challenges.store().len(),
                "Purged expired sign-in challenges"
            );
        }
        purged
    }
}
