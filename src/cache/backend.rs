//! Cache store implementations.

use super::key::CacheKey;
use crate::types::HttpResponse;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Mapping from fingerprint to stored response.
///
/// Operations are synchronous: a lookup never waits on I/O, so the cache-hit
/// path of the interceptor completes without suspending.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<HttpResponse>;
    /// Insert or overwrite the entry for `key`.
    fn put(&self, key: CacheKey, response: HttpResponse);
    fn remove(&self, key: &CacheKey) -> bool;
    fn clear(&self);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn name(&self) -> &'static str;
}

/// In-memory store. No expiry and no size bound: entries live until removed
/// or cleared.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<CacheKey, HttpResponse>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    // The map only ever holds complete values, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, HttpResponse>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, HttpResponse>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<HttpResponse> {
        self.read().get(key).cloned()
    }

    fn put(&self, key: CacheKey, response: HttpResponse) {
        self.write().insert(key, response);
    }

    fn remove(&self, key: &CacheKey) -> bool {
        self.write().remove(key).is_some()
    }

    fn clear(&self) {
        self.write().clear();
    }

    fn len(&self) -> usize {
        self.read().len()
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Store that keeps nothing; every lookup misses.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for NullCache {
    fn get(&self, _: &CacheKey) -> Option<HttpResponse> {
        None
    }

    fn put(&self, _: CacheKey, _: HttpResponse) {}

    fn remove(&self, _: &CacheKey) -> bool {
        false
    }

    fn clear(&self) {}

    fn len(&self) -> usize {
        0
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
