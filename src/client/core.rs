use crate::cache::CacheManager;
use crate::client::types::CancelHandle;
use crate::interceptors::InterceptorPipeline;
use crate::types::{HttpRequest, HttpResponse};
use crate::{Error, ErrorContext, Result};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// HTTP client whose every request passes through an [`InterceptorPipeline`].
pub struct HttpClient {
    pub(crate) pipeline: InterceptorPipeline,
    pub(crate) base_url: Option<Url>,
    pub(crate) cache: Option<Arc<CacheManager>>,
}

impl HttpClient {
    pub fn builder() -> crate::client::HttpClientBuilder {
        crate::client::HttpClientBuilder::new()
    }

    /// The cache installed via the builder, if any.
    pub fn cache(&self) -> Option<&Arc<CacheManager>> {
        self.cache.as_ref()
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Resolve `path` against the base URL. Absolute URLs pass through.
    pub fn url(&self, path: &str) -> Result<Url> {
        if let Ok(url) = Url::parse(path) {
            return Ok(url);
        }
        let base = self.base_url.as_ref().ok_or_else(|| {
            Error::configuration_with_context(
                "relative path requires a base url",
                ErrorContext::new()
                    .with_field_path("AWG_API_ENDPOINT")
                    .with_details(path)
                    .with_source("http_client"),
            )
        })?;
        base.join(path).map_err(|e| {
            Error::validation_with_context(
                format!("cannot resolve url: {e}"),
                ErrorContext::new().with_details(path).with_source("http_client"),
            )
        })
    }

    pub fn request(&self, method: Method, path: &str) -> Result<HttpRequest> {
        Ok(HttpRequest::new(method, self.url(path)?))
    }

    /// Run `request` through the pipeline.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let span = info_span!(
            "http_request",
            request_id = %Uuid::new_v4(),
            method = %request.method(),
            url = %request.url(),
        );
        self.pipeline.execute(request).instrument(span).await
    }

    /// Like [`send`](Self::send), but resolves to [`Error::Cancelled`] as soon
    /// as `handle` is cancelled. The abandoned exchange is dropped before it can
    /// reach the cache.
    pub async fn send_with_cancel(
        &self,
        request: HttpRequest,
        handle: &CancelHandle,
    ) -> Result<HttpResponse> {
        tokio::select! {
            biased;
            _ = handle.cancelled() => Err(Error::Cancelled),
            res = self.send(request) => res,
        }
    }

    pub async fn get(&self, path: &str) -> Result<HttpResponse> {
        self.send(self.request(Method::GET, path)?).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get(path).await?.json()
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<HttpResponse> {
        let request = self.request(Method::POST, path)?.with_json(body)?;
        self.send(request).await
    }

    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<HttpResponse> {
        let request = self.request(Method::PUT, path)?.with_json(body)?;
        self.send(request).await
    }

    pub async fn delete(&self, path: &str) -> Result<HttpResponse> {
        self.send(self.request(Method::DELETE, path)?).await
    }
}
