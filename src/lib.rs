//! # awg-http-cache
//!
//! 为 AWG 在线版 API 提供的 HTTP 响应缓存拦截层。
//!
//! Response-caching HTTP layer for the AWG online edition API.
//!
//! ## Overview
//!
//! Every outbound request passes through an interceptor pipeline in front of
//! the transport. The [`CachingInterceptor`](interceptors::CachingInterceptor)
//! decides per request whether to serve a stored response or forward the call
//! and record its outcome:
//!
//! - non-GET requests bypass the cache entirely
//! - a repeated GET is answered from the cache without a network exchange
//! - a successful GET miss is stored once fully received
//! - failures are never stored; protocol errors are logged once and every
//!   failure is re-raised unchanged
//!
//! Entries do not expire. Callers that need fresh data clear the cache.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use awg_http_cache::cache::CacheManager;
//! use awg_http_cache::HttpClient;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> awg_http_cache::Result<()> {
//!     let cache = Arc::new(CacheManager::in_memory());
//!     let client = HttpClient::builder()
//!         .base_url("https://example.org/api")?
//!         .with_cache(cache.clone())
//!         .build()?;
//!
//!     let first = client.get("search/Test").await?;
//!     let second = client.get("search/Test").await?; // served from cache
//!     assert_eq!(first, second);
//!     assert_eq!(cache.stats().hits, 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Fingerprints, stores and the cache manager |
//! | [`interceptors`] | Middleware chain and the caching interceptor |
//! | [`transport`] | Downstream exchange trait and the `reqwest` transport |
//! | [`client`] | Client facade, builder, failure classification, cancellation |
//! | [`telemetry`] | Diagnostic reporting of protocol errors |
//! | [`types`] | Request and response values |

pub mod cache;
pub mod client;
pub mod interceptors;
pub mod telemetry;
pub mod transport;
pub mod types;

pub use client::{CancelHandle, HttpClient, HttpClientBuilder};
pub use types::{HttpRequest, HttpResponse};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, ProtocolError};
