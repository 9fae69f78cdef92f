// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Caching
//!
//! - The fetched key set is cached with a TTL
//! - A `kid` missing from the cached set forces a refetch (key rotation),
//!   unless the set was fetched less than `min_refresh_interval` ago
//! - Refills are single-flight: concurrent callers wait on the fetch already
//!   in progress instead of issuing their own
//! - A failed refill is reported as `KeySetUnavailable`; the stale set is
//!   never served in its place

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use url::Url;

use super::error::AuthError;

/// Default JWKS cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default upper bound on a single fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(3);

/// Default minimum age of the cached set before a `kid` miss refetches.
pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Where signing keys come from.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Fetch the current key set.
    async fn fetch(&self) -> Result<JwkSet, AuthError>;

    /// Human-readable location, for logs.
    fn location(&self) -> &str;
}

/// Fetches the key set from the identity provider's discovery endpoint.
pub struct HttpKeySource {
    url: Url,
    client: reqwest::Client,
}

impl HttpKeySource {
    /// Create a source for `url` (e.g. `https://tenant.auth0.com/.well-known/jwks.json`).
    ///
    /// `timeout` bounds the whole request at the HTTP client level.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::KeySetUnavailable(format!("HTTP client setup failed: {e}")))?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::KeySetUnavailable(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(format!("malformed JWKS document: {e}")))
    }

    fn location(&self) -> &str {
        self.url.as_str()
    }
}

/// Public signing keys, in the order the provider published them, indexed
/// by key identifier.
#[derive(Debug, Clone, Default)]
pub struct SigningKeySet {
    keys: Vec<Jwk>,
    by_kid: HashMap<String, usize>,
}

impl SigningKeySet {
    pub fn new(keys: Vec<Jwk>) -> Self {
        let mut by_kid = HashMap::with_capacity(keys.len());
        for (position, key) in keys.iter().enumerate() {
            if let Some(kid) = &key.common.key_id {
                // first record with a given kid wins
                by_kid.entry(kid.clone()).or_insert(position);
            }
        }
        Self { keys, by_kid }
    }

    /// Key record with the given `kid`, if published.
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.by_kid.get(kid).map(|&position| &self.keys[position])
    }

    pub fn key_ids(&self) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .filter_map(|key| key.common.key_id.as_deref())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<JwkSet> for SigningKeySet {
    fn from(set: JwkSet) -> Self {
        Self::new(set.keys)
    }
}

/// JWKS cache entry.
#[derive(Clone)]
struct CacheEntry {
    keys: Arc<SigningKeySet>,
    fetched_at: Instant,
    generation: u64,
}

impl CacheEntry {
    fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }
}

/// Shared, concurrency-safe cache in front of a [`KeySource`].
pub struct KeySetCache {
    source: Arc<dyn KeySource>,
    cache_ttl: Duration,
    fetch_timeout: Duration,
    min_refresh_interval: Duration,
    entry: RwLock<Option<CacheEntry>>,
    /// Held for the duration of a refill; holds the outcome of the last one.
    refill: Mutex<Option<Result<CacheEntry, AuthError>>>,
    /// Completed refill attempts, successful or not. Bumped under `refill`.
    attempts: AtomicU64,
    generations: AtomicU64,
}

impl KeySetCache {
    pub fn new(source: Arc<dyn KeySource>) -> Self {
        Self {
            source,
            cache_ttl: DEFAULT_CACHE_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            entry: RwLock::new(None),
            refill: Mutex::new(None),
            attempts: AtomicU64::new(0),
            generations: AtomicU64::new(0),
        }
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    pub fn location(&self) -> &str {
        self.source.location()
    }

    /// Current key set, fetched only if nothing fresh is cached.
    pub async fn fetch_keys(&self) -> Result<Arc<SigningKeySet>, AuthError> {
        let cached = self.current().await;
        if let Some(entry) = &cached {
            if entry.age() < self.cache_ttl {
                return Ok(entry.keys.clone());
            }
        }
        let seen = cached.map(|entry| entry.generation);
        Ok(self.refill(seen).await?.keys)
    }

    /// Key set to verify a token signed with `kid`.
    ///
    /// A fresh cached set containing `kid` is returned as is. Otherwise the
    /// set is refetched, so a newly rotated key becomes usable without
    /// waiting for the TTL. The returned set may still lack `kid`; the
    /// verifier reports that.
    pub async fn keys_for(&self, kid: &str) -> Result<Arc<SigningKeySet>, AuthError> {
        let cached = self.current().await;
        if let Some(entry) = &cached {
            let age = entry.age();
            if age < self.cache_ttl {
                if entry.keys.find(kid).is_some() {
                    return Ok(entry.keys.clone());
                }
                if age < self.min_refresh_interval {
                    debug!(kid, "Key id not in recently fetched key set, not refetching");
                    return Ok(entry.keys.clone());
                }
                debug!(kid, "Key id not in cached key set, refetching");
            }
        }
        let seen = cached.map(|entry| entry.generation);
        Ok(self.refill(seen).await?.keys)
    }

    /// Force refresh the JWKS cache.
    pub async fn refresh(&self) -> Result<Arc<SigningKeySet>, AuthError> {
        let seen = self.current().await.map(|entry| entry.generation);
        Ok(self.refill(seen).await?.keys)
    }

    /// Drop the cached set; the next lookup fetches.
    pub async fn invalidate(&self) {
        *self.entry.write().await = None;
    }

    /// Check if JWKS is currently cached and valid.
    pub async fn is_cached(&self) -> bool {
        self.current()
            .await
            .is_some_and(|entry| entry.age() < self.cache_ttl)
    }

    async fn current(&self) -> Option<CacheEntry> {
        self.entry.read().await.clone()
    }

    /// Fetch and install a new key set.
    ///
    /// A caller that waited on the lock while another refill ran takes that
    /// refill's outcome, failure included, instead of fetching again.
    async fn refill(&self, seen: Option<u64>) -> Result<CacheEntry, AuthError> {
        let ticket = self.attempts.load(Ordering::Acquire);
        let mut last = self.refill.lock().await;

        if self.attempts.load(Ordering::Acquire) != ticket {
            if let Some(outcome) = last.as_ref() {
                debug!("Joining outcome of concurrent JWKS refill");
                return outcome.clone();
            }
        }

        if let Some(entry) = self.current().await {
            if Some(entry.generation) != seen {
                return Ok(entry);
            }
        }

        let outcome = self.fetch_entry().await;
        *last = Some(outcome.clone());
        self.attempts.fetch_add(1, Ordering::Release);
        outcome
    }

    async fn fetch_entry(&self) -> Result<CacheEntry, AuthError> {
        let fetched = tokio::time::timeout(self.fetch_timeout, self.source.fetch())
            .await
            .map_err(|_| {
                AuthError::KeySetUnavailable(format!(
                    "JWKS fetch timed out after {}ms",
                    self.fetch_timeout.as_millis()
                ))
            })
            .and_then(|result| result);

        let set = match fetched {
            Ok(set) => set,
            Err(e) => {
                warn!(location = self.source.location(), error = %e, "JWKS fetch failed");
                return Err(e);
            }
        };

        let entry = CacheEntry {
            keys: Arc::new(SigningKeySet::from(set)),
            fetched_at: Instant::now(),
            generation: self.generations.fetch_add(1, Ordering::Relaxed) + 1,
        };
        info!(
            location = self.source.location(),
            keys = entry.keys.len(),
            generation = entry.generation,
            "JWKS refreshed"
        );
        *self.entry.write().await = Some(entry.clone());
        Ok(entry)
    }
}
