//! 拦截器模块：将请求依次交给拦截器链，最后交给传输层。
//!
//! Middleware chain in front of the transport.
//!
//! Each [`Interceptor`] receives the request together with a [`Next`]
//! continuation ("forward to whatever would normally handle this") and returns
//! the same result shape the continuation would. An interceptor may answer on
//! its own (e.g. from a cache) without ever calling `next`.
//!
//! Interceptors run in insertion order: the first one added is the outermost.

mod caching;

pub use caching::CachingInterceptor;

use crate::transport::Transport;
use crate::types::{HttpRequest, HttpResponse};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn intercept(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse>;
}

/// The rest of the chain after the current interceptor.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    interceptors: &'a [Arc<dyn Interceptor>],
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    pub fn new(interceptors: &'a [Arc<dyn Interceptor>], transport: &'a dyn Transport) -> Self {
        Self {
            interceptors,
            transport,
        }
    }

    /// Hand the request to the next interceptor, or to the transport when the
    /// chain is exhausted.
    pub async fn run(self, request: HttpRequest) -> Result<HttpResponse> {
        match self.interceptors.split_first() {
            Some((head, rest)) => head.intercept(request, Next::new(rest, self.transport)).await,
            None => self.transport.send(request).await,
        }
    }
}

/// Interceptors composed around a transport.
pub struct InterceptorPipeline {
    interceptors: Vec<Arc<dyn Interceptor>>,
    transport: Arc<dyn Transport>,
}

impl InterceptorPipeline {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            interceptors: Vec::new(),
            transport,
        }
    }

    pub fn with<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn push(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        Next::new(&self.interceptors, self.transport.as_ref())
            .run(request)
            .await
    }
}
