use super::{Transport, TransportError};
use crate::error::ProtocolError;
use crate::types::{HttpRequest, HttpResponse};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::Proxy;
use std::env;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    pub proxy_url: Option<String>,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
            proxy_url: None,
            user_agent: concat!("awg-http-cache/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl TransportConfig {
    /// Production-friendly defaults, overridable from the environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let timeout_secs = env::var("AWG_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok());
        let pool_max_idle_per_host = env::var("AWG_HTTP_POOL_MAX_IDLE_PER_HOST")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.pool_max_idle_per_host);
        let pool_idle_secs = env::var("AWG_HTTP_POOL_IDLE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok());
        let proxy_url = env::var("AWG_PROXY_URL").ok().filter(|s| !s.is_empty());

        Self {
            timeout: timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            pool_max_idle_per_host,
            pool_idle_timeout: pool_idle_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.pool_idle_timeout),
            proxy_url,
            ..defaults
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(config.pool_idle_timeout))
            .user_agent(config.user_agent.as_str());

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy url: {e}"),
                    ErrorContext::new()
                        .with_field_path("AWG_PROXY_URL")
                        .with_details(proxy_url.as_str())
                        .with_source("http_transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self { client })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(TransportConfig::from_env())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let (method, url, headers, body) = request.into_parts();
        debug!(%method, %url, "sending request");

        let mut req = self.client.request(method, url.clone()).headers(headers);
        if let Some(body) = body {
            req = req.body(body);
        }

        let response = req
            .send()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().clone();

        if !status.is_success() {
            // The error body is informational; a failed read must not mask the status.
            let body = response.bytes().await.unwrap_or_default();
            return Err(ProtocolError::new(status, url).with_body(body).into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        Ok(HttpResponse::new(status, final_url)
            .with_headers(headers)
            .with_body(body))
    }
}
