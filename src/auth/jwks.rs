// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching, caching, and rate limiting.
//!
//! ## Behavior
//!
//! - JWKS is fetched via HTTPS only
//! - The decoded key set is cached with a configurable TTL
//! - Endpoint fetches are capped per rolling minute; once the budget is
//!   spent, verification fails closed until the window moves on
//! - A fresh cache that lacks the requested key id triggers one refresh
//!   (signing keys rotate)
//! - Stale cache is used when a refresh fails (fail-open for availability)

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet};
use jsonwebtoken::DecodingKey;
use tokio::sync::RwLock;

use super::error::AuthError;

/// Default JWKS cache TTL (5 minutes).
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Maximum JWKS endpoint fetches per rolling minute.
const FETCHES_PER_MINUTE: usize = 5;

/// Width of the fetch rate-limit window.
const FETCH_WINDOW: Duration = Duration::from_secs(60);

/// JWKS cache entry.
struct CacheEntry {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// JWKS manager with caching and fetch rate limiting.
///
/// Fetches and caches the identity provider's key set for JWT verification.
/// Shared process-wide; concurrent requests may refresh concurrently, with
/// the fetch budget bounding a miss stampede.
#[derive(Clone)]
pub struct JwksManager {
    /// JWKS URL (`https://{domain}/.well-known/jwks.json`)
    jwks_url: String,
    /// Cache TTL
    cache_ttl: Duration,
    /// Cached key set
    cache: Arc<RwLock<Option<CacheEntry>>>,
    /// Timestamps of recent endpoint fetches, oldest first
    fetch_log: Arc<Mutex<VecDeque<Instant>>>,
    /// HTTP client
    client: reqwest::Client,
}

impl JwksManager {
    /// Create a new JWKS manager.
    ///
    /// # Arguments
    /// - `jwks_url`: The JWKS endpoint URL
    ///   (e.g., `https://your-tenant.auth0.com/.well-known/jwks.json`)
    pub fn new(jwks_url: impl Into<String>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Arc::new(RwLock::new(None)),
            fetch_log: Arc::new(Mutex::new(VecDeque::with_capacity(FETCHES_PER_MINUTE))),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Resolve an RS256 decoding key, preferring the cached key set.
    ///
    /// `kid` is the key id from the token header; without one, the first
    /// usable RSA key is returned. A fresh cache that lacks the requested
    /// `kid` triggers one refresh before giving up with `NoMatchingKey`.
    pub async fn get_decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AuthError> {
        if let Some(jwks) = self.cached().await {
            if let Some(jwk) = find_key(&jwks, kid) {
                return jwk_to_decoding_key(jwk);
            }
            // Key id not in the cached set: the provider may have rotated keys.
        }

        match self.fetch_jwks().await {
            Ok(jwks) => {
                let jwk = find_key(&jwks, kid).ok_or(AuthError::NoMatchingKey)?;
                jwk_to_decoding_key(jwk)
            }
            Err(fetch_err) => {
                // Fall back to a stale cache when it can still serve the key.
                if let Some(stale) = self.any_cached().await {
                    if let Some(jwk) = find_key(&stale, kid) {
                        return jwk_to_decoding_key(jwk);
                    }
                }
                Err(fetch_err)
            }
        }
    }

    /// Check if a fresh key set is currently cached.
    pub async fn is_cached(&self) -> bool {
        self.cached().await.is_some()
    }

    /// Cached key set, only while within TTL.
    async fn cached(&self) -> Option<JwkSet> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < self.cache_ttl)
            .map(|entry| entry.jwks.clone())
    }

    /// Cached key set regardless of age.
    async fn any_cached(&self) -> Option<JwkSet> {
        let cache = self.cache.read().await;
        cache.as_ref().map(|entry| entry.jwks.clone())
    }

    /// Fetch the key set from the endpoint and update the cache.
    ///
    /// Consumes one unit of the per-minute fetch budget; refuses outright
    /// when the budget is spent.
    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        if !self.try_acquire_fetch(Instant::now()) {
            return Err(AuthError::JwksRateLimited);
        }

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::JwksFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::JwksFetch(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| AuthError::JwksFetch(e.to_string()))?;

        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            jwks: jwks.clone(),
            fetched_at: Instant::now(),
        });

        Ok(jwks)
    }

    /// Record a fetch attempt; false when the window budget is spent.
    fn try_acquire_fetch(&self, now: Instant) -> bool {
        let mut log = self.fetch_log.lock().expect("fetch log lock poisoned");
        while let Some(oldest) = log.front() {
            if now.duration_since(*oldest) >= FETCH_WINDOW {
                log.pop_front();
            } else {
                break;
            }
        }
        if log.len() >= FETCHES_PER_MINUTE {
            return false;
        }
        log.push_back(now);
        true
    }
}

/// Find the key matching `kid`, or the first RSA key when the token header
/// carries no key id.
fn find_key<'a>(jwks: &'a JwkSet, kid: Option<&str>) -> Option<&'a Jwk> {
    match kid {
        Some(kid) => jwks
            .keys
            .iter()
            .find(|k| k.common.key_id.as_deref() == Some(kid)),
        None => jwks
            .keys
            .iter()
            .find(|k| matches!(k.algorithm, AlgorithmParameters::RSA(_))),
    }
}

/// Convert a JWK to an RS256 decoding key.
///
/// Only RSA keys are accepted; tokens are pinned to RS256 at validation.
fn jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
            .map_err(|e| AuthError::KeyRejected(e.to_string())),
        _ => Err(AuthError::KeyRejected(
            "unsupported key type in JWKS".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_jwks() -> JwkSet {
        // RSA modulus/exponent are base64url; the values here only need to
        // parse, signature checks are out of scope for these tests.
        serde_json::from_value(serde_json::json!({
            "keys": [
                {
                    "kty": "RSA",
                    "use": "sig",
                    "alg": "RS256",
                    "kid": "key-2026-01",
                    "n": "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw",
                    "e": "AQAB"
                }
            ]
        }))
        .expect("jwks fixture parses")
    }

    #[test]
    fn jwks_manager_creation() {
        let manager = JwksManager::new("https://tenant.auth0.com/.well-known/jwks.json");
        assert_eq!(
            manager.jwks_url(),
            "https://tenant.auth0.com/.well-known/jwks.json"
        );
    }

    #[test]
    fn custom_cache_ttl() {
        let manager = JwksManager::new("https://tenant.auth0.com/.well-known/jwks.json")
            .with_cache_ttl(Duration::from_secs(60));
        assert_eq!(manager.cache_ttl, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn cache_initially_empty() {
        let manager = JwksManager::new("https://tenant.auth0.com/.well-known/jwks.json");
        assert!(!manager.is_cached().await);
    }

    #[test]
    fn fetch_budget_caps_per_window() {
        let manager = JwksManager::new("https://tenant.auth0.com/.well-known/jwks.json");
        let start = Instant::now();
        for _ in 0..FETCHES_PER_MINUTE {
            assert!(manager.try_acquire_fetch(start));
        }
        // Sixth fetch inside the window is refused.
        assert!(!manager.try_acquire_fetch(start + Duration::from_secs(1)));
        // Budget frees up once the window moves past the earliest fetches.
        assert!(manager.try_acquire_fetch(start + FETCH_WINDOW));
    }

    #[test]
    fn find_key_by_kid() {
        let jwks = sample_jwks();
        assert!(find_key(&jwks, Some("key-2026-01")).is_some());
        assert!(find_key(&jwks, Some("unknown-kid")).is_none());
        // Without a kid, any RSA key will do.
        assert!(find_key(&jwks, None).is_some());
    }

    #[test]
    fn rsa_jwk_converts_to_decoding_key() {
        let jwks = sample_jwks();
        let jwk = find_key(&jwks, Some("key-2026-01")).expect("key present");
        assert!(jwk_to_decoding_key(jwk).is_ok());
    }
}
