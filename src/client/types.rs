use tokio_util::sync::CancellationToken;

/// Consumer-side handle for abandoning an in-flight request.
///
/// Cancelling drops the pending exchange; a request cancelled before its
/// response arrives never writes to the cache.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) async fn cancelled(&self) {
        self.token.cancelled().await
    }
}
