// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Background refresh of the signing key set.
//!
//! Refreshes the cache before its TTL lapses so request paths rarely pay
//! for a fetch. A failed refresh is logged and retried on the next tick;
//! requests still surface `KeySetUnavailable` on their own.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::jwks::KeySetCache;

/// Floor on the refresh interval.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

pub struct KeySetRefresher {
    keys: Arc<KeySetCache>,
    interval: Duration,
}

impl KeySetRefresher {
    /// Refresh at 80% of the cache TTL.
    pub fn new(keys: Arc<KeySetCache>) -> Self {
        let interval = (keys.cache_ttl() * 4 / 5).max(MIN_INTERVAL);
        Self { keys, interval }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until the cancellation token is triggered. The first refresh
    /// happens immediately.
    ///
    /// ```rust,ignore
    /// tokio::spawn(refresher.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            location = self.keys.location(),
            "JWKS refresher starting"
        );

        loop {
            tokio::select! {
                result = self.keys.refresh() => {
                    if let Err(e) = result {
                        warn!(error = %e, "Scheduled JWKS refresh failed");
                    }
                }
                _ = shutdown.cancelled() => break,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => break,
            }
        }

        info!("JWKS refresher shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::{self, StaticKeySource};

    #[test]
    fn interval_tracks_cache_ttl() {
        let source = StaticKeySource::new(testing::jwk_set(&[]));
        let keys = Arc::new(KeySetCache::new(source).with_cache_ttl(Duration::from_secs(300)));
        assert_eq!(KeySetRefresher::new(keys.clone()).interval(), Duration::from_secs(240));

        let zero_ttl = Arc::new(
            KeySetCache::new(StaticKeySource::new(testing::jwk_set(&[])))
                .with_cache_ttl(Duration::ZERO),
        );
        assert_eq!(KeySetRefresher::new(zero_ttl).interval(), MIN_INTERVAL);
    }

    #[tokio::test]
    async fn warms_cache_and_stops_on_cancel() {
        let source = StaticKeySource::new(testing::jwk_set(&[testing::primary_jwk()]));
        let keys = Arc::new(KeySetCache::new(source.clone()));
        let shutdown = CancellationToken::new();

        let task = tokio::spawn(KeySetRefresher::new(keys.clone()).run(shutdown.clone()));
        for _ in 0..50 {
            if keys.is_cached().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(keys.is_cached().await);

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("refresher stops promptly")
            .unwrap();
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test]
    async fn survives_failed_refresh() {
        let source = StaticKeySource::failing();
        let keys = Arc::new(KeySetCache::new(source.clone()));
        let shutdown = CancellationToken::new();

        let task = tokio::spawn(KeySetRefresher::new(keys.clone()).run(shutdown.clone()));
        for _ in 0..50 {
            if source.fetches() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!task.is_finished());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("refresher stops promptly")
            .unwrap();
        assert!(!keys.is_cached().await);
    }
}
