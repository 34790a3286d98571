//! 响应缓存模块：按请求指纹保存成功的 GET 响应。
//!
//! # Response Caching Module
//!
//! Storage side of the caching interceptor: a fingerprint derived from each
//! request addresses a store of fully received responses.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheKey`] | Fingerprint of method + URL (with query) |
//! | [`CacheStore`] | Trait for store implementations |
//! | [`MemoryCache`] | In-memory store behind a single lock |
//! | [`NullCache`] | No-op store for disabling caching |
//! | [`CacheManager`] | Store + configuration + hit/miss statistics |
//! | [`CacheConfig`] | Enable switch and key prefix |
//!
//! There is no expiry and no size bound. An entry stays visible until
//! [`CacheManager::clear`] or [`CacheManager::remove`] is called.
//!
//! ## Example
//!
//! ```rust
//! use awg_http_cache::cache::{CacheConfig, CacheManager, MemoryCache};
//! use std::sync::Arc;
//!
//! let cache = CacheManager::new(CacheConfig::default(), Arc::new(MemoryCache::new()));
//! assert!(cache.is_empty());
//! ```

mod backend;
mod key;
mod manager;

pub use backend::{CacheStore, MemoryCache, NullCache};
pub use key::CacheKey;
pub use manager::{CacheConfig, CacheManager, CacheStats};
