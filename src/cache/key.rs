//! Request fingerprinting.

use crate::types::HttpRequest;
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};

/// Identity of a cacheable request: method plus the full URL with query.
///
/// The raw text is kept instead of a digest, so two different requests never
/// share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(method: &Method, url: &Url) -> Self {
        Self(format!("{} {}", method.as_str(), url_without_fragment(url)))
    }

    pub fn from_request(request: &HttpRequest) -> Self {
        Self::new(request.method(), request.url())
    }

    /// Namespace the key, e.g. when several clients share one store.
    pub fn with_prefix(self, prefix: &str) -> Self {
        Self(format!("{}:{}", prefix, self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Fragments never reach the server.
fn url_without_fragment(url: &Url) -> &str {
    match url.as_str().find('#') {
        Some(i) => &url.as_str()[..i],
        None => url.as_str(),
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&HttpRequest> for CacheKey {
    fn from(request: &HttpRequest) -> Self {
        Self::from_request(request)
    }
}
