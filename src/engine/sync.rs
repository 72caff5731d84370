//! Workspace switches and redistribution.

use super::SyncEngine;
use crate::scheduler::Task;
use crate::traits::Desktop;
use log::{debug, info, warn};

impl SyncEngine {
    /// React to the host switching the active workspace.
    ///
    /// Only a switch that originates from the focused monitor is propagated.
    /// Anything else (e.g. a window dragged to another workspace) merely
    /// refreshes the cache.
    pub(super) fn on_active_workspace_changed<D: Desktop>(
        &mut self,
        desktop: &D,
        origin: Option<usize>,
    ) {
        if !self.active {
            debug!("workspace change ignored: synchronization inactive");
            return;
        }
        let current = match desktop.active_workspace() {
            Ok(ws) => ws,
            Err(e) => {
                warn!("failed to query active workspace: {}", e);
                return;
            }
        };
        let previous = self.last_workspace;
        self.last_workspace = current;
        let delta = current as isize - previous as isize;

        let effective = origin.or_else(|| self.monitor_under_pointer(desktop));
        info!(
            "workspace changed from {} to {} on monitor {:?}, focused monitor {:?}",
            previous, current, effective, self.active_monitor
        );

        let focused = match self.active_monitor {
            Some(focused) if effective == Some(focused) => focused,
            _ => {
                info!("switch did not come from the focused monitor, not syncing");
                self.refresh_placement(desktop);
                return;
            }
        };
        if delta == 0 {
            return;
        }

        let offset = self.ledger.shift(focused, delta);
        debug!("monitor {} offset now {:?}", focused, offset);
        let id = self.scheduler.schedule(
            self.now,
            self.config.debounce(),
            Task::Propagate { delta, focused },
        );
        debug!("redistribution by {:+} scheduled as {}", delta, id);
    }

    /// Absorb the workspace change caused by focusing another monitor.
    ///
    /// The newly active workspace becomes the baseline for the next switch;
    /// no offset changes and nothing moves.
    pub(super) fn on_focus_moved<D: Desktop>(&mut self, desktop: &D) {
        if !self.active {
            return;
        }
        match desktop.active_workspace() {
            Ok(current) => {
                info!(
                    "focus moved to another monitor, workspace {} is now active",
                    current
                );
                self.last_workspace = current;
            }
            Err(e) => warn!("failed to query active workspace: {}", e),
        }
        self.refresh_placement(desktop);
    }

    /// Shift every monitor except `focused` by `delta` workspaces.
    pub(super) fn sync_other_monitors(&mut self, delta: isize, focused: usize) {
        if !self.active {
            return;
        }
        info!("syncing other monitors: shifting workspaces by {:+}", delta);
        for monitor in 0..self.monitor_count {
            if monitor != focused {
                self.shift_monitor(monitor, delta);
            }
        }
    }

    fn shift_monitor(&mut self, monitor: usize, delta: isize) {
        let offset = self.ledger.shift(monitor, delta);
        debug!("monitor {} offset now {:?}", monitor, offset);

        for group in self.placement.shift_monitor(monitor, delta) {
            match group.to {
                Some(to) => {
                    info!(
                        "moving {} window(s) of monitor {} from workspace {} to {}",
                        group.windows.len(),
                        monitor,
                        group.from,
                        to
                    );
                    self.schedule_moves(&group.windows, to);
                }
                None => {
                    info!(
                        "skipping {} window(s) of monitor {} on workspace {}: target {} out of range",
                        group.windows.len(),
                        monitor,
                        group.from,
                        group.from as isize + delta
                    );
                }
            }
        }
    }
}
