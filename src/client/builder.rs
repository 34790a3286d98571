use crate::cache::{CacheConfig, CacheManager, MemoryCache};
use crate::client::core::HttpClient;
use crate::interceptors::{CachingInterceptor, Interceptor, InterceptorPipeline};
use crate::telemetry::ErrorReporter;
use crate::transport::{HttpTransport, Transport, TransportConfig};
use crate::{Error, ErrorContext, Result};
use reqwest::Url;
use std::sync::Arc;

// Position of the caching interceptor relative to user-supplied ones.
enum Layer {
    Custom(Arc<dyn Interceptor>),
    Cache(Arc<CacheManager>),
}

/// Builder for [`HttpClient`].
///
/// Interceptors (including the cache) are layered in the order they are added;
/// the first one added sees the request first.
pub struct HttpClientBuilder {
    base_url: Option<Url>,
    transport: Option<Arc<dyn Transport>>,
    transport_config: Option<TransportConfig>,
    layers: Vec<Layer>,
    reporter: Option<Arc<dyn ErrorReporter>>,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            transport: None,
            transport_config: None,
            layers: Vec::new(),
            reporter: None,
        }
    }

    /// Builder preconfigured from the environment:
    /// - `AWG_API_ENDPOINT`: base URL for relative paths
    /// - `AWG_HTTP_CACHE_ENABLED` / `AWG_HTTP_CACHE_PREFIX`: in-memory cache settings
    /// - transport settings, see [`TransportConfig::from_env`]
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_cache(CacheConfig::from_env())
    }

    /// Like [`from_env`](Self::from_env), with the cache settings supplied by
    /// the caller instead of read from the environment.
    pub fn from_env_with_cache(cache_config: CacheConfig) -> Result<Self> {
        let mut builder = Self::new().transport_config(TransportConfig::from_env());
        if let Ok(endpoint) = std::env::var("AWG_API_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                builder = builder.base_url(endpoint.trim())?;
            }
        }
        let cache = CacheManager::new(cache_config, Arc::new(MemoryCache::new()));
        Ok(builder.with_cache(Arc::new(cache)))
    }

    /// Base URL for relative request paths. A trailing `/` is added to the
    /// path if missing so that `search/Test` resolves below it. A URL with a
    /// query or fragment is a configuration error.
    pub fn base_url(mut self, base_url: &str) -> Result<Self> {
        let invalid = |message: String| {
            Error::configuration_with_context(
                message,
                ErrorContext::new()
                    .with_field_path("AWG_API_ENDPOINT")
                    .with_details(base_url)
                    .with_source("client_builder"),
            )
        };

        let mut url =
            Url::parse(base_url).map_err(|e| invalid(format!("invalid base url: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(invalid("base url cannot carry relative paths".to_string()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid(
                "base url must not contain a query or fragment".to_string(),
            ));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        self.base_url = Some(url);
        Ok(self)
    }

    /// Use a custom transport instead of the default `reqwest` one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Settings for the default transport. Ignored when a custom transport is set.
    pub fn transport_config(mut self, config: TransportConfig) -> Self {
        self.transport_config = Some(config);
        self
    }

    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.layers.push(Layer::Custom(interceptor));
        self
    }

    /// Serve repeated GET requests from `cache`.
    pub fn with_cache(mut self, cache: Arc<CacheManager>) -> Self {
        self.layers.push(Layer::Cache(cache));
        self
    }

    /// Destination for protocol-error diagnostics of the caching layer.
    /// Defaults to [`crate::telemetry::TracingErrorReporter`].
    pub fn error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(
                self.transport_config.unwrap_or_default(),
            )?),
        };

        let mut pipeline = InterceptorPipeline::new(transport);
        let mut cache = None;
        for layer in self.layers {
            match layer {
                Layer::Custom(i) => pipeline.push(i),
                Layer::Cache(manager) => {
                    let mut caching = CachingInterceptor::new(manager.clone());
                    if let Some(reporter) = &self.reporter {
                        caching = caching.with_reporter(reporter.clone());
                    }
                    pipeline.push(Arc::new(caching));
                    cache.get_or_insert(manager);
                }
            }
        }

        Ok(HttpClient {
            pipeline,
            base_url: self.base_url,
            cache,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
