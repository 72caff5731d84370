//! The synchronization engine.
//!
//! [`SyncEngine`] owns every piece of mutable state: the offset ledger, the
//! placement cache, the focused monitor and the scheduler holding its
//! deferred work.  It reacts to [`HostEvent`]s and to the passage of time
//! and issues window moves through the [`Desktop`] trait.
//!
//! The engine is split across three files:
//!
//! * this module: state, activation, the clock and task dispatch;
//! * [`sync`]: interpretation of workspace switches and redistribution;
//! * [`topology`]: reactions to monitors and workspaces coming and going.
//!
//! Nothing here blocks.  The caller delivers events with
//! [`handle_event`](SyncEngine::handle_event) and moves the clock forward
//! with [`advance`](SyncEngine::advance).

mod sync;
mod topology;

use crate::config::SyncConfig;
use crate::focus::FocusTracker;
use crate::ledger::OffsetLedger;
use crate::model::{HostEvent, Monitor, Window, WindowId};
use crate::placement::PlacementCache;
use crate::scheduler::{Scheduler, Task, TaskId};
use crate::topology::{monitor_at, reference_monitor, Topology};
use crate::traits::Desktop;
use log::{debug, info, warn};
use std::time::Duration;

/// Possible errors from the engine.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The desktop returned an error.
    #[error("desktop error: {0}")]
    Desktop(String),
}

/// Coarse state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Fewer than two monitors, or stopped.  No state is kept.
    Inactive,
    /// Active with nothing but the focus poll pending.
    Idle,
    /// Active with a redistribution or window moves still pending.
    Syncing,
}

/// Keeps the workspaces of every monitor in step with the focused one.
#[derive(Debug)]
pub struct SyncEngine {
    config: SyncConfig,
    scheduler: Scheduler,
    focus: FocusTracker,
    now: Duration,
    active: bool,
    monitor_count: usize,
    workspace_count: usize,
    reference_monitor: Option<usize>,
    active_monitor: Option<usize>,
    last_workspace: usize,
    ledger: OffsetLedger,
    placement: PlacementCache,
}

impl SyncEngine {
    /// Create an inactive engine.
    pub fn new(config: SyncConfig) -> Self {
        let focus = FocusTracker::new(config.poll_interval());
        Self {
            config,
            scheduler: Scheduler::new(),
            focus,
            now: Duration::ZERO,
            active: false,
            monitor_count: 0,
            workspace_count: 0,
            reference_monitor: None,
            active_monitor: None,
            last_workspace: 0,
            ledger: OffsetLedger::default(),
            placement: PlacementCache::default(),
        }
    }

    /// Read the initial topology and activate if more than one monitor is
    /// connected.
    ///
    /// This is the only operation that reports a host failure: without an
    /// initial topology the engine has nothing to work with.
    pub fn start<D: Desktop>(&mut self, desktop: &D, now: Duration) -> Result<(), SyncError> {
        self.now = now;
        let topology =
            Topology::read(desktop).map_err(|e| SyncError::Desktop(e.to_string()))?;
        if topology.monitor_count() > 1 {
            self.activate(desktop, topology);
        } else {
            info!(
                "{} monitor(s) connected, synchronization stays inactive",
                topology.monitor_count()
            );
        }
        Ok(())
    }

    /// Cancel every pending task and drop all state.
    ///
    /// Safe to call any number of times.
    pub fn stop(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        self.focus.forget();
        if self.active || cancelled > 0 {
            info!("synchronization disabled ({} pending task(s) cancelled)", cancelled);
        }
        self.active = false;
        self.monitor_count = 0;
        self.workspace_count = 0;
        self.reference_monitor = None;
        self.active_monitor = None;
        self.last_workspace = 0;
        self.ledger.clear();
        self.placement.clear();
    }

    /// Process one host notification.
    pub fn handle_event<D: Desktop>(&mut self, desktop: &D, event: HostEvent) {
        debug!("event {:?}", event);
        match event {
            HostEvent::MonitorsChanged => self.on_monitors_changed(desktop),
            HostEvent::ActiveWorkspaceChanged { monitor } => {
                self.on_active_workspace_changed(desktop, monitor)
            }
            HostEvent::FocusMoved => self.on_focus_moved(desktop),
            HostEvent::WorkspaceAdded { index } => self.on_workspace_added(desktop, index),
            HostEvent::WorkspaceRemoved { index } => self.on_workspace_removed(desktop, index),
        }
    }

    /// Move the clock to `now`, running every task that became due on the
    /// way in deadline order.
    pub fn advance<D: Desktop>(&mut self, desktop: &D, now: Duration) {
        while let Some((due, id, task)) = self.scheduler.pop_due(now) {
            self.now = due;
            self.run_task(desktop, id, task);
        }
        self.now = self.now.max(now);
    }

    /// When the next pending task is due.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    pub fn state(&self) -> EngineState {
        if !self.active {
            EngineState::Inactive
        } else if self.scheduler.any(|t| !matches!(t, Task::PollFocus)) {
            EngineState::Syncing
        } else {
            EngineState::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current clock reading.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// The smallest monitor, used as the reference for offsets.
    pub fn reference_monitor(&self) -> Option<usize> {
        self.reference_monitor
    }

    /// The monitor under the pointer, `None` until the first poll finds one.
    pub fn active_monitor(&self) -> Option<usize> {
        self.active_monitor
    }

    /// Workspace that was active after the last processed switch.
    pub fn last_workspace(&self) -> usize {
        self.last_workspace
    }

    pub fn monitor_count(&self) -> usize {
        self.monitor_count
    }

    pub fn workspace_count(&self) -> usize {
        self.workspace_count
    }

    /// Offset of `monitor`, or `None` when it is not tracked.
    pub fn offset(&self, monitor: usize) -> Option<usize> {
        self.ledger.get(monitor)
    }

    pub fn ledger(&self) -> &OffsetLedger {
        &self.ledger
    }

    pub fn placement(&self) -> &PlacementCache {
        &self.placement
    }

    /// Number of tasks waiting in the scheduler, focus poll included.
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    //  Activation

    fn activate<D: Desktop>(&mut self, desktop: &D, topology: Topology) {
        self.active = true;
        self.monitor_count = topology.monitor_count();
        self.workspace_count = topology.workspace_count;
        self.last_workspace = topology.active_workspace;
        self.active_monitor = None;
        self.ledger.reset(self.monitor_count, self.workspace_count);
        self.classify(&topology.monitors);
        self.refresh_placement(desktop);
        info!(
            "synchronization enabled: {} monitors, {} workspaces, active workspace {}",
            self.monitor_count, self.workspace_count, self.last_workspace
        );
        self.poll_focus(desktop);
        self.focus.arm(&mut self.scheduler, self.now);
    }

    fn classify(&mut self, monitors: &[Monitor]) {
        self.reference_monitor = reference_monitor(monitors);
        if let Some(r) = self.reference_monitor {
            info!("identified monitor {} as reference monitor", r);
        }
    }

    //  Tasks

    fn run_task<D: Desktop>(&mut self, desktop: &D, id: TaskId, task: Task) {
        debug!("running {} {:?}", id, task);
        match task {
            Task::PollFocus => {
                self.focus.forget();
                if self.active {
                    self.poll_focus(desktop);
                    self.focus.arm(&mut self.scheduler, self.now);
                }
            }
            Task::Propagate { delta, focused } => self.sync_other_monitors(delta, focused),
            Task::MoveWindow {
                window,
                title,
                workspace,
            } => self.perform_move(desktop, &window, &title, workspace),
        }
    }

    /// Sample the pointer and switch focus if it moved to another monitor.
    fn poll_focus<D: Desktop>(&mut self, desktop: &D) {
        let monitors = match desktop.monitors() {
            Ok(m) => m,
            Err(e) => {
                warn!("focus poll: failed to query monitors: {}", e);
                return;
            }
        };
        let pointer = match desktop.pointer() {
            Ok(p) => p,
            Err(e) => {
                warn!("focus poll: failed to query pointer: {}", e);
                return;
            }
        };
        if let Some(monitor) = self.focus.observe(&monitors, pointer, self.active_monitor) {
            let role = if Some(monitor) == self.reference_monitor {
                "reference"
            } else {
                "secondary"
            };
            info!("pointer on {} monitor {}", role, monitor);
            self.active_monitor = Some(monitor);
            self.refresh_placement(desktop);
        }
    }

    /// The monitor under the pointer right now, straight from the host.
    fn monitor_under_pointer<D: Desktop>(&self, desktop: &D) -> Option<usize> {
        let monitors = desktop.monitors().ok()?;
        let (x, y) = desktop.pointer().ok()?;
        monitor_at(&monitors, x, y)
    }

    /// Rebuild the placement cache from the host.
    ///
    /// On failure the previous cache is kept.
    fn refresh_placement<D: Desktop>(&mut self, desktop: &D) {
        let windows = match desktop.windows() {
            Ok(w) => w,
            Err(e) => {
                warn!("failed to list windows: {}", e);
                return;
            }
        };
        self.placement =
            PlacementCache::rebuild(self.monitor_count, self.workspace_count, windows);
        debug!("placement cache holds {} window(s)", self.placement.len());
    }

    /// Schedule one move per window, `move_stagger` apart, in slice order.
    fn schedule_moves(&mut self, windows: &[Window], workspace: usize) {
        let stagger = self.config.move_stagger();
        for (i, window) in windows.iter().enumerate() {
            self.scheduler.schedule(
                self.now,
                stagger * i as u32,
                Task::MoveWindow {
                    window: window.id.clone(),
                    title: window.title.clone(),
                    workspace,
                },
            );
        }
    }

    fn perform_move<D: Desktop>(
        &mut self,
        desktop: &D,
        window: &WindowId,
        title: &str,
        workspace: usize,
    ) {
        if workspace >= self.workspace_count {
            warn!(
                "not moving {:?} ({}): workspace {} no longer exists",
                title, window, workspace
            );
            return;
        }
        match desktop.move_window(window, workspace) {
            Ok(()) => debug!("moved {:?} to workspace {}", title, workspace),
            Err(e) => warn!("error moving {:?} ({}): {}", title, window, e),
        }
    }
}

//  Tests
