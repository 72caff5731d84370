//! Monitors and workspaces coming and going.

use super::SyncEngine;
use crate::topology::Topology;
use crate::traits::Desktop;
use log::{debug, info, warn};

impl SyncEngine {
    pub(super) fn on_monitors_changed<D: Desktop>(&mut self, desktop: &D) {
        let topology = match Topology::read(desktop) {
            Ok(t) => t,
            Err(e) => {
                warn!("failed to read topology after monitor change: {}", e);
                return;
            }
        };
        let count = topology.monitor_count();

        match (self.active, count > 1) {
            (false, false) => debug!("{} monitor(s), staying inactive", count),
            (false, true) => {
                info!("{} monitors connected", count);
                self.activate(desktop, topology);
            }
            (true, false) => {
                info!("down to {} monitor(s)", count);
                self.stop();
            }
            (true, true) => {
                if count != self.monitor_count {
                    info!(
                        "monitor count changed from {} to {}, resetting offsets",
                        self.monitor_count, count
                    );
                    self.ledger.reset(count, topology.workspace_count);
                } else {
                    self.ledger.set_workspace_count(topology.workspace_count);
                }
                self.monitor_count = count;
                self.workspace_count = topology.workspace_count;
                if self.active_monitor.is_some_and(|m| m >= count) {
                    self.active_monitor = None;
                }
                self.classify(&topology.monitors);
                self.refresh_placement(desktop);
            }
        }
    }

    pub(super) fn on_workspace_added<D: Desktop>(&mut self, desktop: &D, index: usize) {
        if !self.active {
            return;
        }
        let count = match desktop.workspace_count() {
            Ok(c) => c,
            Err(e) => {
                warn!("failed to query workspace count: {}", e);
                return;
            }
        };
        if count <= self.workspace_count {
            debug!("workspace {} added but count is still {}", index, count);
            return;
        }
        info!(
            "workspace {} added, {} -> {} workspaces",
            index, self.workspace_count, count
        );
        self.workspace_count = count;
        self.placement.grow_workspaces(count);
        self.ledger.set_workspace_count(count);
    }

    /// Fold windows from vanished workspaces into the last one left.
    pub(super) fn on_workspace_removed<D: Desktop>(&mut self, desktop: &D, index: usize) {
        if !self.active {
            return;
        }
        let count = match desktop.workspace_count() {
            Ok(c) => c,
            Err(e) => {
                warn!("failed to query workspace count: {}", e);
                return;
            }
        };
        if count >= self.workspace_count {
            debug!("workspace {} removed but count is still {}", index, count);
            return;
        }
        if count == 0 {
            warn!(
                "workspace {} removed but the host reports no workspaces, keeping windows where they are",
                index
            );
            return;
        }
        info!(
            "workspace {} removed, {} -> {} workspaces",
            index, self.workspace_count, count
        );
        self.workspace_count = count;

        let last = count - 1;
        for (monitor, windows) in self.placement.evict_beyond(count) {
            info!(
                "relocating {} window(s) of monitor {} to workspace {}",
                windows.len(),
                monitor,
                last
            );
            self.schedule_moves(&windows, last);
        }
        self.last_workspace = self.last_workspace.min(last);
        self.ledger.set_workspace_count(count);
    }
}
