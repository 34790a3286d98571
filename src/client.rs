//! Client facade over the interceptor pipeline.
//!
//! Keep the public surface small: build once, share via `Arc`, call
//! `get`/`get_json`/`post_json`/`send`. Implementation details live in
//! submodules under `src/client/`.

pub mod builder;
pub mod core;
pub mod error_classification;
pub mod types;

pub use builder::HttpClientBuilder;
pub use core::HttpClient;
pub use error_classification::{classify, FailureClass};
pub use types::CancelHandle;
