//! Cache manager.

use super::backend::{CacheStore, MemoryCache};
use super::key::CacheKey;
use crate::types::{HttpRequest, HttpResponse};
use serde::Serialize;
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub key_prefix: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key_prefix: None,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `AWG_HTTP_CACHE_ENABLED` and `AWG_HTTP_CACHE_PREFIX`.
    pub fn from_env() -> Self {
        let enabled = env::var("AWG_HTTP_CACHE_ENABLED")
            .ok()
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "off"))
            .unwrap_or(true);
        let key_prefix = env::var("AWG_HTTP_CACHE_PREFIX")
            .ok()
            .filter(|p| !p.trim().is_empty());
        Self {
            enabled,
            key_prefix,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub clears: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    clears: AtomicU64,
}

impl AtomicStats {
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
        }
    }
}

/// A store plus its configuration and counters.
///
/// Constructed explicitly and shared via `Arc`; there is no process-global cache.
pub struct CacheManager {
    config: CacheConfig,
    store: Arc<dyn CacheStore>,
    stats: AtomicStats,
}

impl CacheManager {
    pub fn new(config: CacheConfig, store: Arc<dyn CacheStore>) -> Self {
        Self {
            config,
            store,
            stats: AtomicStats::default(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(CacheConfig::default(), Arc::new(MemoryCache::new()))
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Fingerprint for `request`, namespaced by the configured prefix.
    pub fn key_for(&self, request: &HttpRequest) -> CacheKey {
        let key = CacheKey::from_request(request);
        match self.config.key_prefix {
            Some(ref p) => key.with_prefix(p),
            None => key,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<HttpResponse> {
        if !self.config.enabled {
            return None;
        }
        match self.store.get(key) {
            Some(resp) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(resp)
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn put(&self, key: CacheKey, response: HttpResponse) {
        if !self.config.enabled {
            return;
        }
        self.store.put(key, response);
        self.stats.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn remove(&self, key: &CacheKey) -> bool {
        self.store.remove(key)
    }

    /// Drop every entry. Callers needing fresh data reset the cache this way.
    pub fn clear(&self) {
        self.store.clear();
        self.stats.clears.fetch_add(1, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.name()
    }
}
