//! Cancellable delayed tasks on a caller-driven clock.
//!
//! The engine never sleeps.  It hands [`Task`]s to the [`Scheduler`] with a
//! delay, and whoever drives the engine calls
//! [`pop_due`](Scheduler::pop_due) with the current time.  Time is a
//! [`Duration`] since an arbitrary epoch, so tests can run on a virtual
//! clock and the daemon on a monotonic [`Instant`](std::time::Instant).
//!
//! Every scheduled task gets a [`TaskId`] that can cancel it individually;
//! [`cancel_all`](Scheduler::cancel_all) drops every outstanding task at
//! once.

use crate::model::WindowId;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

/// Token identifying one scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Work the engine can defer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Sample the pointer and update the focused monitor.
    PollFocus,
    /// Shift every monitor except `focused` by `delta` workspaces.
    Propagate { delta: isize, focused: usize },
    /// Ask the host to move one window.
    MoveWindow {
        window: WindowId,
        title: String,
        workspace: usize,
    },
}

/// Pending tasks ordered by deadline, then by scheduling order.
#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    queue: BTreeMap<(Duration, TaskId), Task>,
    deadlines: HashMap<TaskId, Duration>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to run `delay` after `now`.
    pub fn schedule(&mut self, now: Duration, delay: Duration, task: Task) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let due = now + delay;
        self.queue.insert((due, id), task);
        self.deadlines.insert(id, due);
        id
    }

    /// Cancel a pending task.  Returns `false` if it already ran or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.deadlines.remove(&id) {
            Some(due) => self.queue.remove(&(due, id)).is_some(),
            None => false,
        }
    }

    /// Cancel every pending task and return how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.queue.len();
        self.queue.clear();
        self.deadlines.clear();
        n
    }

    /// Remove and return the earliest task whose deadline is `<= now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, TaskId, Task)> {
        let (&(due, id), _) = self.queue.iter().next()?;
        if due > now {
            return None;
        }
        self.deadlines.remove(&id);
        self.queue.remove(&(due, id)).map(|task| (due, id, task))
    }

    /// Deadline of the earliest pending task.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Whether `id` is still waiting to run.
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Whether any pending task matches `pred`.
    pub fn any(&self, mut pred: impl FnMut(&Task) -> bool) -> bool {
        self.queue.values().any(|t| pred(t))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn mv(id: &str) -> Task {
        Task::MoveWindow {
            window: id.into(),
            title: id.to_string(),
            workspace: 0,
        }
    }

    #[test]
    fn tasks_run_in_deadline_order() {
        let mut s = Scheduler::new();
        s.schedule(ms(0), ms(30), mv("c"));
        s.schedule(ms(0), ms(10), mv("a"));
        s.schedule(ms(0), ms(20), mv("b"));

        let order: Vec<Task> = std::iter::from_fn(|| s.pop_due(ms(100)))
            .map(|(_, _, t)| t)
            .collect();
        assert_eq!(order, vec![mv("a"), mv("b"), mv("c")]);
    }

    #[test]
    fn same_deadline_keeps_scheduling_order() {
        let mut s = Scheduler::new();
        s.schedule(ms(0), ms(10), mv("first"));
        s.schedule(ms(0), ms(10), mv("second"));
        assert_eq!(s.pop_due(ms(10)).map(|(_, _, t)| t), Some(mv("first")));
        assert_eq!(s.pop_due(ms(10)).map(|(_, _, t)| t), Some(mv("second")));
    }

    #[test]
    fn nothing_runs_before_its_deadline() {
        let mut s = Scheduler::new();
        s.schedule(ms(5), ms(50), Task::PollFocus);
        assert!(s.pop_due(ms(54)).is_none());
        let (due, _, task) = s.pop_due(ms(55)).unwrap();
        assert_eq!(due, ms(55));
        assert_eq!(task, Task::PollFocus);
        assert!(s.is_empty());
    }

    #[test]
    fn cancelled_task_never_runs() {
        let mut s = Scheduler::new();
        let a = s.schedule(ms(0), ms(10), mv("a"));
        s.schedule(ms(0), ms(20), mv("b"));
        assert!(s.cancel(a));
        assert!(!s.cancel(a));
        assert!(!s.is_pending(a));
        assert_eq!(s.pop_due(ms(100)).map(|(_, _, t)| t), Some(mv("b")));
        assert!(s.pop_due(ms(100)).is_none());
    }

    #[test]
    fn cancel_after_run_is_a_no_op() {
        let mut s = Scheduler::new();
        let a = s.schedule(ms(0), ms(0), mv("a"));
        assert!(s.pop_due(ms(0)).is_some());
        assert!(!s.cancel(a));
    }

    #[test]
    fn cancel_all_empties_the_queue() {
        let mut s = Scheduler::new();
        s.schedule(ms(0), ms(10), mv("a"));
        s.schedule(ms(0), ms(20), Task::PollFocus);
        assert_eq!(s.cancel_all(), 2);
        assert!(s.is_empty());
        assert_eq!(s.next_deadline(), None);
        assert!(s.pop_due(ms(1000)).is_none());
    }

    #[test]
    fn next_deadline_tracks_earliest() {
        let mut s = Scheduler::new();
        assert_eq!(s.next_deadline(), None);
        let late = s.schedule(ms(0), ms(150), Task::PollFocus);
        let early = s.schedule(ms(0), ms(50), mv("a"));
        assert_eq!(s.next_deadline(), Some(ms(50)));
        s.cancel(early);
        assert_eq!(s.next_deadline(), Some(ms(150)));
        s.cancel(late);
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn any_matches_pending_tasks() {
        let mut s = Scheduler::new();
        s.schedule(ms(0), ms(10), Task::PollFocus);
        assert!(s.any(|t| matches!(t, Task::PollFocus)));
        assert!(!s.any(|t| matches!(t, Task::MoveWindow { .. })));
    }
}
