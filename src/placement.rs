//! Cached window placement.
//!
//! [`PlacementCache`] answers "which windows live on monitor *m*, workspace
//! *w*" without querying the host.  It is rebuilt from a full window list on
//! topology and focus changes, and patched in place while a redistribution
//! is still in flight so that a sequence of asynchronous moves never has to
//! re-read the host halfway through.

use crate::model::Window;

/// What happened to one workspace group during
/// [`shift_monitor`](PlacementCache::shift_monitor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupShift {
    /// Workspace the group lived on.
    pub from: usize,
    /// Workspace the group now lives on, or `None` when the target fell
    /// outside the workspace range and the group stayed put.
    pub to: Option<usize>,
    /// Windows of the group, in cache order.
    pub windows: Vec<Window>,
}

/// Windows grouped by monitor, then by workspace.
///
/// Both levels are dense tables indexed by monitor and workspace index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementCache {
    tables: Vec<Vec<Vec<Window>>>,
    workspace_count: usize,
}

impl PlacementCache {
    /// An empty cache for `monitor_count` monitors and `workspace_count`
    /// workspaces.
    pub fn new(monitor_count: usize, workspace_count: usize) -> Self {
        Self {
            tables: vec![vec![Vec::new(); workspace_count]; monitor_count],
            workspace_count,
        }
    }

    /// Build a cache from every window on the desktop.
    ///
    /// Windows without a known monitor, or whose monitor or workspace is
    /// out of range, are left out.
    pub fn rebuild(
        monitor_count: usize,
        workspace_count: usize,
        windows: impl IntoIterator<Item = Window>,
    ) -> Self {
        let mut cache = Self::new(monitor_count, workspace_count);
        for window in windows {
            let Some(monitor) = window.monitor else {
                continue;
            };
            if monitor >= monitor_count || window.workspace >= workspace_count {
                continue;
            }
            cache.tables[monitor][window.workspace].push(window);
        }
        cache
    }

    /// Windows on `monitor` / `workspace`, in cache order.
    pub fn windows(&self, monitor: usize, workspace: usize) -> &[Window] {
        self.tables
            .get(monitor)
            .and_then(|t| t.get(workspace))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Non-empty workspace groups of `monitor`, in ascending workspace
    /// order.
    pub fn groups(&self, monitor: usize) -> impl Iterator<Item = (usize, &[Window])> {
        self.tables
            .get(monitor)
            .into_iter()
            .flat_map(|t| t.iter().enumerate())
            .filter(|(_, ws)| !ws.is_empty())
            .map(|(i, ws)| (i, ws.as_slice()))
    }

    /// Move every group of `monitor` by `delta` workspaces.
    ///
    /// Groups whose target falls outside `[0, workspace_count)` stay where
    /// they are.  Returns one [`GroupShift`] per non-empty group; a zero
    /// delta changes nothing and returns no groups.
    pub fn shift_monitor(&mut self, monitor: usize, delta: isize) -> Vec<GroupShift> {
        let count = self.workspace_count;
        let Some(table) = self.tables.get_mut(monitor) else {
            return Vec::new();
        };
        if delta == 0 {
            return Vec::new();
        }

        let old = std::mem::replace(table, vec![Vec::new(); count]);
        let mut shifts = Vec::new();
        for (from, windows) in old.into_iter().enumerate() {
            if windows.is_empty() {
                continue;
            }
            let target = from as i64 + delta as i64;
            if target < 0 || target >= count as i64 {
                table[from].extend(windows.iter().cloned());
                shifts.push(GroupShift {
                    from,
                    to: None,
                    windows,
                });
                continue;
            }
            let to = target as usize;
            table[to].extend(windows.iter().cloned().map(|mut w| {
                w.workspace = to;
                w
            }));
            shifts.push(GroupShift {
                from,
                to: Some(to),
                windows,
            });
        }
        shifts
    }

    /// Adopt a larger workspace count.  New workspaces start empty on every
    /// monitor.
    pub fn grow_workspaces(&mut self, workspace_count: usize) {
        if workspace_count <= self.workspace_count {
            return;
        }
        for table in &mut self.tables {
            table.resize_with(workspace_count, Vec::new);
        }
        self.workspace_count = workspace_count;
    }

    /// Adopt a smaller workspace count, folding every window that lived at
    /// or beyond `workspace_count` into the last remaining workspace.
    ///
    /// Returns the relocated windows per monitor (as they were before the
    /// move), skipping monitors with nothing to relocate.  A count of zero
    /// leaves no workspace to fold into and is ignored.
    pub fn evict_beyond(&mut self, workspace_count: usize) -> Vec<(usize, Vec<Window>)> {
        if workspace_count == 0 || workspace_count >= self.workspace_count {
            return Vec::new();
        }
        self.workspace_count = workspace_count;
        let mut evicted = Vec::new();
        for (monitor, table) in self.tables.iter_mut().enumerate() {
            let tail: Vec<Window> = table.drain(workspace_count..).flatten().collect();
            if tail.is_empty() {
                continue;
            }
            let last = workspace_count - 1;
            table[last].extend(tail.iter().cloned().map(|mut w| {
                w.workspace = last;
                w
            }));
            evicted.push((monitor, tail));
        }
        evicted
    }

    /// Drop every cached window.
    pub fn clear(&mut self) {
        self.tables.clear();
        self.workspace_count = 0;
    }

    pub fn monitor_count(&self) -> usize {
        self.tables.len()
    }

    pub fn workspace_count(&self) -> usize {
        self.workspace_count
    }

    /// Total number of cached windows.
    pub fn len(&self) -> usize {
        self.tables.iter().flatten().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
