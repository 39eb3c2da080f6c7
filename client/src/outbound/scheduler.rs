//! Tokio-backed [`ExpiryScheduler`].

use std::time::Duration;

use tokio::runtime::Handle;

use crate::domain::ports::{ExpiryScheduler, ExpiryTask};

/// Runs expiry tasks on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioExpiryScheduler {
    handle: Handle,
}

impl TokioExpiryScheduler {
    /// Schedule onto the runtime behind `handle`.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Schedule onto the runtime the caller is running inside.
    ///
    /// Returns `None` outside a tokio runtime.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl ExpiryScheduler for TokioExpiryScheduler {
    fn schedule(&self, after: Duration, task: ExpiryTask) {
        self.handle.spawn(async move {
            tokio::time::sleep(after).await;
            task();
        });
    }
}
