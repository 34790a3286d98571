use super::{Interceptor, Next};
use crate::cache::CacheManager;
use crate::client::error_classification::{classify, FailureClass};
use crate::telemetry::{default_reporter, ErrorReporter};
use crate::types::{HttpRequest, HttpResponse};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use tracing::debug;

/// Serves repeated GET requests from a [`CacheManager`].
///
/// - Non-GET requests bypass the cache entirely: no lookup, no write.
/// - GET hit: the stored response is returned without calling `next`.
/// - GET miss: the request is forwarded once. A fully received 2xx response
///   is stored before being returned; a failure is classified, protocol
///   errors are reported, and the error is re-raised unchanged.
///
/// No retries and no coalescing of identical in-flight requests: two
/// concurrent misses both forward, and whichever finishes last owns the entry.
pub struct CachingInterceptor {
    cache: Arc<CacheManager>,
    reporter: Arc<dyn ErrorReporter>,
}

impl CachingInterceptor {
    pub fn new(cache: Arc<CacheManager>) -> Self {
        Self {
            cache,
            reporter: default_reporter(),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    fn is_cacheable(method: &Method) -> bool {
        *method == Method::GET
    }

    fn handle_error(&self, err: &Error) {
        // Transport failures are the caller's concern and are not reported here.
        if classify(err) != FailureClass::Protocol {
            return;
        }
        if let Some(protocol) = err.as_protocol() {
            self.reporter.report(protocol);
        }
    }
}

#[async_trait]
impl Interceptor for CachingInterceptor {
    async fn intercept(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse> {
        if !Self::is_cacheable(request.method()) {
            debug!(method = %request.method(), url = %request.url(), "cache bypass");
            return next.run(request).await;
        }

        let key = self.cache.key_for(&request);
        if let Some(cached) = self.cache.get(&key) {
            debug!(key = %key, backend = self.cache.backend_name(), "cache hit");
            return Ok(cached);
        }
        debug!(key = %key, "cache miss");

        match next.run(request).await {
            Ok(response) => {
                if response.is_success() {
                    debug!(key = %key, status = response.status().as_u16(), "cache store");
                    self.cache.put(key, response.clone());
                }
                Ok(response)
            }
            Err(err) => {
                self.handle_error(&err);
                Err(err)
            }
        }
    }
}
