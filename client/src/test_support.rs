//! Test doubles shared by unit tests (in `src/`) and integration tests
//! (in `tests/`).
//!
//! Compiled for unit tests and when the `test-support` feature is enabled.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{ExpiryScheduler, ExpiryTask};

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Freeze the clock at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }

    /// Freeze the clock at `millis` after the Unix epoch.
    pub fn at_millis(millis: i64) -> Self {
        match DateTime::<Utc>::from_timestamp_millis(millis) {
            Some(now) => Self(now),
            None => panic!("timestamp out of range: {millis}"),
        }
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Start the clock at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}"),
        };
        *self.lock_clock() += delta;
    }

    /// Jump the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Scheduler that queues tasks until the test runs them.
///
/// Delays are recorded but no time passes on its own; [`Self::run_due`]
/// fires every pending task whose delay fits in the given window.
#[derive(Default)]
pub struct ManualExpiryScheduler {
    pending: Mutex<Vec<(Duration, ExpiryTask)>>,
}

impl ManualExpiryScheduler {
    fn lock_pending(&self) -> MutexGuard<'_, Vec<(Duration, ExpiryTask)>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Delays of the tasks not yet run, in scheduling order.
    pub fn pending_delays(&self) -> Vec<Duration> {
        self.lock_pending().iter().map(|(delay, _)| *delay).collect()
    }

    /// Run every pending task with a delay of at most `elapsed`.
    ///
    /// Returns how many tasks ran.
    pub fn run_due(&self, elapsed: Duration) -> usize {
        let due: Vec<ExpiryTask> = {
            let mut pending = self.lock_pending();
            let (due, keep): (Vec<_>, Vec<_>) = pending
                .drain(..)
                .partition(|(delay, _)| *delay <= elapsed);
            *pending = keep;
            due.into_iter().map(|(_, task)| task).collect()
        };
        let count = due.len();
        for task in due {
            task();
        }
        count
    }

    /// Run every pending task regardless of delay.
    pub fn run_all(&self) -> usize {
        self.run_due(Duration::MAX)
    }
}

impl ExpiryScheduler for ManualExpiryScheduler {
    fn schedule(&self, after: Duration, task: ExpiryTask) {
        self.lock_pending().push((after, task));
    }
}
