//! In-memory [`Desktop`] used by the unit tests.

use crate::model::{Bounds, HostEvent, Monitor, Signal, Window, WindowId};
use crate::traits::{Desktop, SubscriptionId};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::sync::mpsc;

#[derive(Debug, thiserror::Error)]
#[error("fake desktop error: {0}")]
pub struct FakeError(pub String);

/// Record-keeping desktop.
///
/// Moves are logged in `moves` and applied to `windows`, like a real host
/// would.  Subscriptions keep their sink so tests can [`emit`](Self::emit)
/// events through them.
#[derive(Debug)]
pub struct FakeDesktop {
    pub monitors: RefCell<Vec<Monitor>>,
    pub workspace_count: Cell<usize>,
    pub active_workspace: Cell<usize>,
    pub pointer: Cell<(i32, i32)>,
    pub windows: RefCell<Vec<Window>>,
    pub moves: RefCell<Vec<(WindowId, usize)>>,
    /// Windows whose moves fail.
    pub broken_windows: RefCell<HashSet<WindowId>>,
    /// When set, `monitors()` fails.
    pub monitors_fail: Cell<bool>,
    /// Number of successful subscriptions before `subscribe` starts failing.
    pub subscribe_budget: Cell<Option<usize>>,
    pub subscriptions: RefCell<Vec<(SubscriptionId, Signal, mpsc::Sender<HostEvent>)>>,
    /// Number of bulk [`Desktop::windows`] queries served.
    pub window_queries: Cell<usize>,
    next_subscription: Cell<u64>,
}

impl FakeDesktop {
    /// Two monitors side by side: monitor 0 is 1920x1080, monitor 1 is a
    /// smaller 1280x800 laptop panel.  Four workspaces, workspace 0 active,
    /// pointer on monitor 0.
    pub fn two_monitors() -> Self {
        Self::new(vec![
            Monitor::new(0, Bounds::new(0, 0, 1920, 1080)),
            Monitor::new(1, Bounds::new(1920, 0, 1280, 800)),
        ])
    }

    pub fn new(monitors: Vec<Monitor>) -> Self {
        Self {
            monitors: RefCell::new(monitors),
            workspace_count: Cell::new(4),
            active_workspace: Cell::new(0),
            pointer: Cell::new((100, 100)),
            windows: RefCell::new(Vec::new()),
            moves: RefCell::new(Vec::new()),
            broken_windows: RefCell::new(HashSet::new()),
            monitors_fail: Cell::new(false),
            subscribe_budget: Cell::new(None),
            subscriptions: RefCell::new(Vec::new()),
            window_queries: Cell::new(0),
            next_subscription: Cell::new(1),
        }
    }

    pub fn add_window(&self, id: &str, monitor: Option<usize>, workspace: usize) {
        self.windows.borrow_mut().push(Window {
            id: id.into(),
            title: format!("{} title", id),
            monitor,
            workspace,
        });
    }

    /// Moves recorded so far as `(window id, workspace)`.
    pub fn moves(&self) -> Vec<(String, usize)> {
        self.moves
            .borrow()
            .iter()
            .map(|(id, ws)| (id.0.clone(), *ws))
            .collect()
    }

    /// Send `event` to every subscriber of its signal.  Returns how many
    /// sinks received it.
    pub fn emit(&self, event: HostEvent) -> usize {
        let signal = event.signal();
        self.subscriptions
            .borrow()
            .iter()
            .filter(|(_, s, _)| *s == signal)
            .filter(|(_, _, tx)| tx.send(event.clone()).is_ok())
            .count()
    }

    pub fn subscribed(&self, signal: Signal) -> bool {
        self.subscriptions
            .borrow()
            .iter()
            .any(|(_, s, _)| *s == signal)
    }

    /// Drop the monitor list down to the first monitor.
    pub fn unplug_all_but_first(&self) {
        self.monitors.borrow_mut().truncate(1);
    }
}

impl Desktop for FakeDesktop {
    type Error = FakeError;

    fn monitors(&self) -> Result<Vec<Monitor>, FakeError> {
        if self.monitors_fail.get() {
            return Err(FakeError("monitors unavailable".into()));
        }
        Ok(self.monitors.borrow().clone())
    }

    fn workspace_count(&self) -> Result<usize, FakeError> {
        Ok(self.workspace_count.get())
    }

    fn active_workspace(&self) -> Result<usize, FakeError> {
        Ok(self.active_workspace.get())
    }

    fn windows_on_workspace(&self, workspace: usize) -> Result<Vec<Window>, FakeError> {
        Ok(self
            .windows
            .borrow()
            .iter()
            .filter(|w| w.workspace == workspace)
            .cloned()
            .collect())
    }

    fn windows(&self) -> Result<Vec<Window>, FakeError> {
        self.window_queries.set(self.window_queries.get() + 1);
        Ok(self.windows.borrow().clone())
    }

    fn pointer(&self) -> Result<(i32, i32), FakeError> {
        Ok(self.pointer.get())
    }

    fn move_window(&self, window: &WindowId, workspace: usize) -> Result<(), FakeError> {
        if self.broken_windows.borrow().contains(window) {
            return Err(FakeError(format!("window {} is gone", window)));
        }
        self.moves.borrow_mut().push((window.clone(), workspace));
        for w in self.windows.borrow_mut().iter_mut() {
            if &w.id == window {
                w.workspace = workspace;
            }
        }
        Ok(())
    }

    fn subscribe(
        &self,
        signal: Signal,
        sink: mpsc::Sender<HostEvent>,
    ) -> Result<SubscriptionId, FakeError> {
        if let Some(budget) = self.subscribe_budget.get() {
            if budget == 0 {
                return Err(FakeError(format!("cannot subscribe to {}", signal)));
            }
            self.subscribe_budget.set(Some(budget - 1));
        }
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.subscriptions.borrow_mut().push((id, signal, sink));
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), FakeError> {
        self.subscriptions.borrow_mut().retain(|(sid, _, _)| *sid != id);
        Ok(())
    }
}
