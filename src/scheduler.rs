//! Periodic housekeeping timers
//!
//! Timers are deadlines polled by the event loop rather than spawned tasks,
//! so firing a timer never runs concurrently with a store mutation.

use std::time::{Duration, Instant};

/// Smallest interval accepted for a periodic task
pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// A repeating deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTask {
    interval: Duration,
    next_due: Instant,
}

impl PeriodicTask {
    /// Start a task whose first tick is one interval after `now`
    pub fn start(interval: Duration, now: Instant) -> Self {
        let interval = interval.max(MIN_INTERVAL);
        Self {
            interval,
            next_due: now + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the next tick
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }

    /// Check whether the task is due, advancing its deadline if so
    ///
    /// Ticks missed while the loop was busy collapse into one.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due += self.interval;
        if self.next_due <= now {
            self.next_due = now + self.interval;
        }
        true
    }
}

/// Which tasks fired on a poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Due {
    pub cleanup: bool,
    pub refresh: bool,
}

/// Owns the cleanup timer and the optional refresh timer
#[derive(Debug, Clone)]
pub struct Scheduler {
    cleanup: PeriodicTask,
    refresh: Option<PeriodicTask>,
}

impl Scheduler {
    /// Create a scheduler with the cleanup timer running and refresh disabled
    pub fn new(cleanup_interval: Duration, now: Instant) -> Self {
        Self {
            cleanup: PeriodicTask::start(cleanup_interval, now),
            refresh: None,
        }
    }

    /// Start the refresh timer, replacing any running one
    pub fn enable_refresh(&mut self, interval: Duration, now: Instant) {
        // Assigning drops the previous task, so at most one refresh timer exists
        self.refresh = Some(PeriodicTask::start(interval, now));
        tracing::debug!("Auto-refresh every {:?}", interval.max(MIN_INTERVAL));
    }

    /// Cancel the refresh timer
    pub fn disable_refresh(&mut self) {
        if self.refresh.take().is_some() {
            tracing::debug!("Auto-refresh disabled");
        }
    }

    /// Change the refresh interval
    ///
    /// Only restarts the timer if refresh is currently enabled. Returns whether
    /// a running timer was replaced.
    pub fn set_refresh_interval(&mut self, interval: Duration, now: Instant) -> bool {
        if self.refresh.is_some() {
            self.enable_refresh(interval, now);
            true
        } else {
            false
        }
    }

    pub fn refresh_enabled(&self) -> bool {
        self.refresh.is_some()
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh.map(|task| task.interval())
    }

    /// Time until the next refresh tick, if refresh is enabled
    pub fn refresh_remaining(&self, now: Instant) -> Option<Duration> {
        self.refresh.map(|task| task.remaining(now))
    }

    /// Advance all timers to `now`
    pub fn poll(&mut self, now: Instant) -> Due {
        Due {
            cleanup: self.cleanup.poll(now),
            refresh: self
                .refresh
                .as_mut()
                .map(|task| task.poll(now))
                .unwrap_or(false),
        }
    }
}
