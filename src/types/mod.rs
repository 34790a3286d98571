//! 类型系统模块：定义 HTTP 请求与响应的核心值类型。
//!
//! # Types Module
//!
//! Owned, cloneable values describing one HTTP exchange. They are built on the
//! `reqwest` re-exports of the `http` primitives so that the transport can hand
//! them to the client without conversion.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`HttpRequest`] | Method, absolute URL (with query), headers, optional body |
//! | [`HttpResponse`] | Status, headers, body and source URL of a received response |
//!
//! ## Example
//!
//! ```rust
//! use awg_http_cache::types::HttpRequest;
//! use reqwest::Url;
//!
//! let url = Url::parse("https://example.org/api/search/Test").unwrap();
//! let req = HttpRequest::get(url).with_query("limit", "10");
//! assert_eq!(req.url().as_str(), "https://example.org/api/search/Test?limit=10");
//! ```

pub mod request;
pub mod response;

pub use request::HttpRequest;
pub use response::HttpResponse;
