//! Types shared by every component of monsync.
//!
//! [`Monitor`] and [`Window`] describe what the host reports about the
//! desktop, and [`HostEvent`] / [`Signal`] describe the notifications the
//! host delivers.  Monitor and workspace identities are plain dense indices
//! assigned by the host; they are stable only until the next topology change.

use std::fmt;

/// Position and size of a monitor on the virtual desktop (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Surface in pixels.  Only used to tell monitors apart by size.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Whether `(x, y)` lies inside the bounds.
    ///
    /// Both axes are half-open: the left and top edges belong to the
    /// monitor, the right and bottom edges belong to its neighbour.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (x, y) = (x as i64, y as i64);
        let (left, top) = (self.x as i64, self.y as i64);
        x >= left && x < left + self.width as i64 && y >= top && y < top + self.height as i64
    }
}

/// A monitor as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
    /// Host-assigned index (0-based, dense).
    pub index: usize,
    pub bounds: Bounds,
}

impl Monitor {
    pub fn new(index: usize, bounds: Bounds) -> Self {
        Self { index, bounds }
    }
}

/// Opaque window identity (e.g. a Hyprland client address).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub String);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A window and where it currently lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub id: WindowId,
    /// Human-readable title, only used in log messages.
    pub title: String,
    /// Monitor the window is shown on, or `None` when the host cannot tell
    /// (e.g. the window is unmapped).
    pub monitor: Option<usize>,
    /// Workspace index the window belongs to.
    pub workspace: usize,
}

/// Kinds of host notification a caller can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    MonitorsChanged,
    ActiveWorkspaceChanged,
    WorkspaceAdded,
    WorkspaceRemoved,
}

impl Signal {
    /// Every signal, in subscription order.
    pub const ALL: [Signal; 4] = [
        Signal::MonitorsChanged,
        Signal::ActiveWorkspaceChanged,
        Signal::WorkspaceAdded,
        Signal::WorkspaceRemoved,
    ];
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::MonitorsChanged => write!(f, "monitors-changed"),
            Signal::ActiveWorkspaceChanged => write!(f, "active-workspace-changed"),
            Signal::WorkspaceAdded => write!(f, "workspace-added"),
            Signal::WorkspaceRemoved => write!(f, "workspace-removed"),
        }
    }
}

/// A notification delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Monitors were added, removed or rearranged.
    MonitorsChanged,

    /// The globally active workspace changed.
    ///
    /// `monitor` is the monitor the switch originated from when the host
    /// knows it.  When it is `None` the engine falls back to the monitor
    /// under the pointer.
    ActiveWorkspaceChanged { monitor: Option<usize> },

    /// Keyboard focus moved to another monitor.
    ///
    /// On hosts where each monitor shows its own workspace, this changes
    /// the active workspace without anybody switching.  Delivered under
    /// [`Signal::ActiveWorkspaceChanged`].
    FocusMoved,

    /// A workspace was created at `index`.
    WorkspaceAdded { index: usize },

    /// The workspace at `index` was destroyed.
    WorkspaceRemoved { index: usize },
}

impl HostEvent {
    /// The subscription signal this event is delivered under.
    pub fn signal(&self) -> Signal {
        match self {
            HostEvent::MonitorsChanged => Signal::MonitorsChanged,
            HostEvent::ActiveWorkspaceChanged { .. } | HostEvent::FocusMoved => {
                Signal::ActiveWorkspaceChanged
            }
            HostEvent::WorkspaceAdded { .. } => Signal::WorkspaceAdded,
            HostEvent::WorkspaceRemoved { .. } => Signal::WorkspaceRemoved,
        }
    }
}
