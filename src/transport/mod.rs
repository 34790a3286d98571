//! Downstream exchange mechanism wrapped by the interceptor pipeline.

mod http;

pub use http::{HttpTransport, TransportConfig};

use crate::types::{HttpRequest, HttpResponse};
use crate::Result;
use async_trait::async_trait;
use std::future::Future;

/// Performs one request/response exchange.
///
/// Implementations report a completed exchange with a non-success status as
/// [`crate::Error::Protocol`] and anything that did not yield a response as
/// [`crate::Error::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Http(e) if e.is_timeout())
    }
}

/// Transport backed by an async closure.
pub struct FnTransport<F> {
    f: F,
}

/// Wrap `f` as a [`Transport`].
pub fn transport_fn<F, Fut>(f: F) -> FnTransport<F>
where
    F: Fn(HttpRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HttpResponse>> + Send,
{
    FnTransport { f }
}

#[async_trait]
impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(HttpRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HttpResponse>> + Send,
{
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        (self.f)(request).await
    }
}
