//! Driven port for delayed one-shot tasks.

use std::time::Duration;

/// Work run once a delay elapses.
pub type ExpiryTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs a task after a delay.
///
/// There is no cancellation; tasks must tolerate running after the state
/// they refer to has gone.
pub trait ExpiryScheduler: Send + Sync {
    /// Run `task` once `after` has elapsed.
    fn schedule(&self, after: Duration, task: ExpiryTask);
}
