//! Read-only snapshots of the desktop layout.
//!
//! [`Topology`] bundles what the engine needs to know about monitors and
//! workspaces at one instant.  [`reference_monitor`] and [`monitor_at`] are
//! the pure helpers that classify monitors and locate the pointer.

use crate::model::Monitor;
use crate::traits::Desktop;

/// Monitors and workspaces as seen at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pub monitors: Vec<Monitor>,
    pub workspace_count: usize,
    pub active_workspace: usize,
}

impl Topology {
    /// Query the host for a fresh snapshot.
    pub fn read<D: Desktop>(desktop: &D) -> Result<Self, D::Error> {
        Ok(Self {
            monitors: desktop.monitors()?,
            workspace_count: desktop.workspace_count()?,
            active_workspace: desktop.active_workspace()?,
        })
    }

    /// Number of monitors in the snapshot.
    pub fn monitor_count(&self) -> usize {
        self.monitors.len()
    }
}

/// Pick the reference monitor: the one with the smallest area.
///
/// On ties the first monitor in the list wins.  Returns `None` for an
/// empty list.
pub fn reference_monitor(monitors: &[Monitor]) -> Option<usize> {
    let mut best: Option<&Monitor> = None;
    for m in monitors {
        match best {
            Some(b) if m.bounds.area() >= b.bounds.area() => {}
            _ => best = Some(m),
        }
    }
    best.map(|m| m.index)
}

/// Find the monitor containing the point `(x, y)`.
///
/// If bounds overlap, the first monitor in the list wins.
pub fn monitor_at(monitors: &[Monitor], x: i32, y: i32) -> Option<usize> {
    monitors
        .iter()
        .find(|m| m.bounds.contains(x, y))
        .map(|m| m.index)
}
