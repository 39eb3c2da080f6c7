//! Queue of transient user-facing messages.
//!
//! Each notification is removed when its duration elapses unless the duration
//! is zero. Expiry goes through an [`ExpiryScheduler`] so tests can drive it
//! by hand. Scheduled removals hold only a weak handle to the queue and look
//! entries up by id, so a dismissed or cleared notification makes the later
//! firing a no-op.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use mockable::Clock;
use serde::Serialize;
use tracing::debug;

use super::ports::ExpiryScheduler;

/// Lifetime of success, warning and info notifications.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(5_000);
/// Lifetime of error notifications.
pub const ERROR_DURATION: Duration = Duration::from_millis(8_000);

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// An action completed.
    Success,
    /// An action failed.
    Error,
    /// Something needs attention.
    Warning,
    /// Neutral information.
    Info,
}

impl Severity {
    /// Lifetime applied when the caller does not pick one.
    pub fn default_duration(self) -> Duration {
        match self {
            Self::Error => ERROR_DURATION,
            Self::Success | Self::Warning | Self::Info => DEFAULT_DURATION,
        }
    }
}

/// Stable notification identifier, `notif-<counter>-<unix millis>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One queued message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Unique identifier.
    pub id: NotificationId,
    /// Severity.
    pub severity: Severity,
    /// Headline.
    pub title: String,
    /// Optional body text.
    pub message: Option<String>,
    /// Time until automatic removal; zero means persistent.
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl Notification {
    /// Whether the notification stays until dismissed.
    pub fn is_persistent(&self) -> bool {
        self.duration.is_zero()
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::Serializer;

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u128(value.as_millis())
    }
}

struct QueueInner {
    entries: Mutex<Vec<Notification>>,
    counter: AtomicU64,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn ExpiryScheduler>,
}

impl QueueInner {
    fn entries(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: &NotificationId) -> bool {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|entry| entry.id != *id);
        entries.len() != before
    }
}

/// Shared handle to the notification queue.
///
/// Clones refer to the same queue.
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<QueueInner>,
}

impl fmt::Debug for NotificationQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationQueue")
            .field("entries", &*self.inner.entries())
            .finish_non_exhaustive()
    }
}

impl NotificationQueue {
    /// Create an empty queue.
    pub fn new(clock: Arc<dyn Clock>, scheduler: Arc<dyn ExpiryScheduler>) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                entries: Mutex::new(Vec::new()),
                counter: AtomicU64::new(0),
                clock,
                scheduler,
            }),
        }
    }

    /// Enqueue a success notification.
    pub fn success(&self, title: impl Into<String>, message: Option<String>) -> NotificationId {
        self.push_default(Severity::Success, title, message)
    }

    /// Enqueue an error notification.
    pub fn error(&self, title: impl Into<String>, message: Option<String>) -> NotificationId {
        self.push_default(Severity::Error, title, message)
    }

    /// Enqueue a warning notification.
    pub fn warning(&self, title: impl Into<String>, message: Option<String>) -> NotificationId {
        self.push_default(Severity::Warning, title, message)
    }

    /// Enqueue an info notification.
    pub fn info(&self, title: impl Into<String>, message: Option<String>) -> NotificationId {
        self.push_default(Severity::Info, title, message)
    }

    fn push_default(
        &self,
        severity: Severity,
        title: impl Into<String>,
        message: Option<String>,
    ) -> NotificationId {
        self.push(severity, title, message, severity.default_duration())
    }

    /// Enqueue a notification with an explicit lifetime.
    ///
    /// A zero `duration` keeps it until [`Self::remove`] or
    /// [`Self::clear_all`].
    pub fn push(
        &self,
        severity: Severity,
        title: impl Into<String>,
        message: Option<String>,
        duration: Duration,
    ) -> NotificationId {
        let id = self.next_id();
        let notification = Notification {
            id: id.clone(),
            severity,
            title: title.into(),
            message,
            duration,
        };
        debug!(id = %id, ?severity, title = %notification.title, "notification queued");
        self.inner.entries().push(notification);

        if !duration.is_zero() {
            let queue = Arc::downgrade(&self.inner);
            let expired = id.clone();
            self.inner
                .scheduler
                .schedule(duration, Box::new(move || expire(&queue, &expired)));
        }
        id
    }

    fn next_id(&self) -> NotificationId {
        let counter = self.inner.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let millis = self.inner.clock.utc().timestamp_millis();
        NotificationId(format!("notif-{counter}-{millis}"))
    }

    /// Remove a notification. Unknown ids are ignored.
    pub fn remove(&self, id: &NotificationId) {
        self.inner.remove(id);
    }

    /// Remove every notification. Pending expiries become no-ops.
    pub fn clear_all(&self) {
        self.inner.entries().clear();
    }

    /// Snapshot of the queue in insertion order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.entries().clone()
    }

    /// Number of queued notifications.
    pub fn len(&self) -> usize {
        self.inner.entries().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.entries().is_empty()
    }
}

fn expire(queue: &Weak<QueueInner>, id: &NotificationId) {
    let Some(inner) = queue.upgrade() else {
        return;
    };
    if inner.remove(id) {
        debug!(id = %id, "notification expired");
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::test_support::{FixedClock, ManualExpiryScheduler};
    use rstest::{fixture, rstest};

    struct Harness {
        queue: NotificationQueue,
        scheduler: Arc<ManualExpiryScheduler>,
    }

    #[fixture]
    fn harness() -> Harness {
        let scheduler = Arc::new(ManualExpiryScheduler::default());
        let queue = NotificationQueue::new(
            Arc::new(FixedClock::at_millis(1_700_000_000_000)),
            scheduler.clone(),
        );
        Harness { queue, scheduler }
    }

    #[rstest]
    fn ids_are_unique_and_embed_the_clock(harness: Harness) {
        let first = harness.queue.info("one", None);
        let second = harness.queue.info("two", None);
        assert_eq!(first.as_str(), "notif-1-1700000000000");
        assert_eq!(second.as_str(), "notif-2-1700000000000");
        assert_ne!(first, second);
    }

    #[rstest]
    #[case(Severity::Success, DEFAULT_DURATION)]
    #[case(Severity::Warning, DEFAULT_DURATION)]
    #[case(Severity::Info, DEFAULT_DURATION)]
    #[case(Severity::Error, ERROR_DURATION)]
    fn helpers_apply_severity_durations(
        harness: Harness,
        #[case] severity: Severity,
        #[case] expected: Duration,
    ) {
        let queue = &harness.queue;
        match severity {
            Severity::Success => queue.success("t", None),
            Severity::Error => queue.error("t", None),
            Severity::Warning => queue.warning("t", None),
            Severity::Info => queue.info("t", None),
        };
        let notifications = queue.notifications();
        assert_eq!(notifications[0].severity, severity);
        assert_eq!(notifications[0].duration, expected);
        assert_eq!(harness.scheduler.pending_delays(), vec![expected]);
    }

    #[rstest]
    fn expiry_removes_exactly_the_expired_entry(harness: Harness) {
        let short = harness
            .queue
            .push(Severity::Info, "short", None, Duration::from_millis(10));
        let _long = harness
            .queue
            .push(Severity::Info, "long", None, Duration::from_secs(60));

        assert_eq!(harness.scheduler.run_due(Duration::from_millis(10)), 1);

        let remaining = harness.queue.notifications();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "long");
        assert!(remaining.iter().all(|n| n.id != short));
    }

    #[rstest]
    fn persistent_notifications_schedule_nothing(harness: Harness) {
        harness
            .queue
            .push(Severity::Warning, "sticky", Some("stays".to_owned()), Duration::ZERO);
        assert!(harness.scheduler.pending_delays().is_empty());
        assert!(harness.queue.notifications()[0].is_persistent());
    }

    #[rstest]
    fn remove_is_idempotent(harness: Harness) {
        let id = harness.queue.success("saved", None);
        harness.queue.remove(&id);
        harness.queue.remove(&id);
        assert!(harness.queue.is_empty());
        assert_eq!(harness.scheduler.run_all(), 1);
        assert!(harness.queue.is_empty());
    }

    #[rstest]
    fn clear_all_leaves_timers_harmless(harness: Harness) {
        harness.queue.info("a", None);
        harness.queue.error("b", Some("details".to_owned()));
        harness.queue.clear_all();
        assert!(harness.queue.is_empty());

        let later = harness.queue.info("c", None);
        harness.scheduler.run_due(ERROR_DURATION - Duration::from_millis(1));
        assert!(harness.queue.is_empty());
        assert!(later.as_str().starts_with("notif-3-"));
    }

    #[test]
    fn dropped_queue_makes_expiry_a_no_op() {
        let scheduler = Arc::new(ManualExpiryScheduler::default());
        let queue = NotificationQueue::new(Arc::new(FixedClock::at_millis(0)), scheduler.clone());
        queue.info("gone", None);
        drop(queue);
        assert_eq!(scheduler.run_all(), 1);
    }

    #[test]
    fn clones_share_one_queue() {
        let queue = NotificationQueue::new(
            Arc::new(FixedClock::at_millis(0)),
            Arc::new(ManualExpiryScheduler::default()),
        );
        let other = queue.clone();
        other.warning("shared", None);
        assert_eq!(queue.len(), 1);
    }
}
