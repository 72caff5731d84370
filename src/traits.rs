//! The capability trait that decouples monsync from any specific desktop
//! shell.
//!
//! Every concrete host (Hyprland, a test harness, …) implements
//! [`Desktop`].  The [`SyncEngine`](crate::engine::SyncEngine) and the
//! [`Controller`](crate::lifecycle::Controller) only depend on this
//! abstraction.

use crate::model::{HostEvent, Monitor, Signal, Window, WindowId};
use std::fmt;
use std::sync::mpsc;

/// Handle returned by [`Desktop::subscribe`].
///
/// The handle must be passed back to [`Desktop::unsubscribe`] to stop the
/// delivery of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Abstraction over a desktop shell whose workspaces form one global
/// sequence shared by every monitor.
///
/// Workspaces are addressed by their 0-based index in that sequence.
/// Monitors are addressed by the index reported in [`Monitor::index`].
pub trait Desktop {
    /// The error type produced by this desktop.
    type Error: std::error::Error + Send + 'static;

    /// Return the monitors the host knows about, in index order.
    fn monitors(&self) -> Result<Vec<Monitor>, Self::Error>;

    /// Number of workspaces currently in the sequence.
    fn workspace_count(&self) -> Result<usize, Self::Error>;

    /// Index of the currently active workspace.
    fn active_workspace(&self) -> Result<usize, Self::Error>;

    /// Windows living on `workspace`, across all monitors.
    ///
    /// Windows whose monitor cannot be determined are reported with
    /// `monitor: None`.
    fn windows_on_workspace(&self, workspace: usize) -> Result<Vec<Window>, Self::Error>;

    /// Windows on every workspace, across all monitors.
    ///
    /// The default asks [`windows_on_workspace`](Desktop::windows_on_workspace)
    /// once per workspace.  Hosts that can list everything in one round-trip
    /// should override it.
    fn windows(&self) -> Result<Vec<Window>, Self::Error> {
        let mut windows = Vec::new();
        for workspace in 0..self.workspace_count()? {
            windows.extend(self.windows_on_workspace(workspace)?);
        }
        Ok(windows)
    }

    /// Current pointer position on the virtual desktop.
    fn pointer(&self) -> Result<(i32, i32), Self::Error>;

    /// Request that `window` moves to `workspace`.
    ///
    /// The request may complete asynchronously on the host side; an error
    /// only reports failures the host notices immediately (e.g. the window
    /// no longer exists).
    fn move_window(&self, window: &WindowId, workspace: usize) -> Result<(), Self::Error>;

    /// Start delivering `signal` notifications into `sink`.
    fn subscribe(
        &self,
        signal: Signal,
        sink: mpsc::Sender<HostEvent>,
    ) -> Result<SubscriptionId, Self::Error>;

    /// Stop a delivery started by [`subscribe`](Desktop::subscribe).
    ///
    /// Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), Self::Error>;
}
