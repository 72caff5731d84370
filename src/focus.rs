//! Pointer-driven monitor focus.
//!
//! The [`FocusTracker`] owns the recurring [`Task::PollFocus`] and decides
//! whether a pointer sample means the user moved to another monitor.  It
//! never changes engine state itself: [`FocusTracker::observe`] only reports
//! the new monitor and the engine applies it.

use crate::model::Monitor;
use crate::scheduler::{Scheduler, Task, TaskId};
use crate::topology::monitor_at;
use std::time::Duration;

/// Bookkeeping for the focus poll.
#[derive(Debug)]
pub struct FocusTracker {
    period: Duration,
    poll: Option<TaskId>,
}

impl FocusTracker {
    pub fn new(period: Duration) -> Self {
        Self { period, poll: None }
    }

    /// Schedule the next poll one period after `now`, replacing any poll
    /// still pending.
    pub fn arm(&mut self, scheduler: &mut Scheduler, now: Duration) {
        self.disarm(scheduler);
        self.poll = Some(scheduler.schedule(now, self.period, Task::PollFocus));
    }

    /// Cancel the pending poll, if any.
    pub fn disarm(&mut self, scheduler: &mut Scheduler) {
        if let Some(id) = self.poll.take() {
            scheduler.cancel(id);
        }
    }

    /// Forget the poll handle after the scheduler dropped every task.
    pub fn forget(&mut self) {
        self.poll = None;
    }

    /// Whether a poll is waiting to run.
    pub fn is_armed(&self) -> bool {
        self.poll.is_some()
    }

    /// Interpret a pointer sample.
    ///
    /// Returns the monitor under the pointer when it differs from
    /// `current`.  A pointer outside every monitor keeps the current focus.
    pub fn observe(
        &self,
        monitors: &[Monitor],
        pointer: (i32, i32),
        current: Option<usize>,
    ) -> Option<usize> {
        let (x, y) = pointer;
        match monitor_at(monitors, x, y) {
            Some(m) if Some(m) != current => Some(m),
            _ => None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
