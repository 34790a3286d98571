//! 诊断模块：接收被拦截器分类的失败并输出诊断日志。
//!
//! Diagnostics for failures classified by the caching interceptor.
//!
//! Only protocol errors (a response with a failure status) are reported; the
//! interceptor re-raises every failure regardless of what the reporter does.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ErrorReporter`] | Trait for diagnostic destinations |
//! | [`TracingErrorReporter`] | Default: one `tracing::error!` event per report |
//! | [`InMemoryErrorReporter`] | Records messages, for tests |
//! | [`NoopErrorReporter`] | Discards reports |

use crate::error::ProtocolError;
use std::sync::{Arc, RwLock};
use tracing::error;

/// Fixed message emitted once per protocol error seen by the caching interceptor.
pub const PROTOCOL_ERROR_MESSAGE: &str = "CachingInterceptor: Processing http error";

pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &ProtocolError);
}

/// Logs through `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, err: &ProtocolError) {
        error!(status = err.status.as_u16(), url = %err.url, "{}", PROTOCOL_ERROR_MESSAGE);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopErrorReporter;

impl ErrorReporter for NoopErrorReporter {
    fn report(&self, _: &ProtocolError) {}
}

/// In-memory reporter for testing.
#[derive(Debug, Default)]
pub struct InMemoryErrorReporter {
    messages: RwLock<Vec<String>>,
}

impl InMemoryErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .read()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
    pub fn clear(&self) {
        if let Ok(mut m) = self.messages.write() {
            m.clear();
        }
    }
    pub fn len(&self) -> usize {
        self.messages.read().map(|m| m.len()).unwrap_or(0)
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorReporter for InMemoryErrorReporter {
    fn report(&self, _: &ProtocolError) {
        if let Ok(mut m) = self.messages.write() {
            m.push(PROTOCOL_ERROR_MESSAGE.to_string());
        }
    }
}

pub fn default_reporter() -> Arc<dyn ErrorReporter> {
    Arc::new(TracingErrorReporter)
}
