//! Per-monitor workspace offsets.
//!
//! An offset records how far a monitor's apparent workspace sequence has
//! drifted.  It always stays a valid workspace index, i.e. inside
//! `[0, workspace_count - 1]`.

/// Offsets indexed by monitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetLedger {
    offsets: Vec<usize>,
    workspace_count: usize,
}

impl OffsetLedger {
    /// A ledger with every offset at 0.
    pub fn new(monitor_count: usize, workspace_count: usize) -> Self {
        Self {
            offsets: vec![0; monitor_count],
            workspace_count,
        }
    }

    /// Offset of `monitor`, or `None` if the monitor is not tracked.
    pub fn get(&self, monitor: usize) -> Option<usize> {
        self.offsets.get(monitor).copied()
    }

    /// Add `delta` to the offset of `monitor`, clamped into range.
    ///
    /// Returns the new offset, or `None` for an untracked monitor.
    pub fn shift(&mut self, monitor: usize, delta: isize) -> Option<usize> {
        let max = self.max_offset();
        let slot = self.offsets.get_mut(monitor)?;
        let shifted = (*slot as i64 + delta as i64).clamp(0, max as i64);
        *slot = shifted as usize;
        Some(*slot)
    }

    /// Adopt a new workspace count, clamping every offset into the new
    /// range.
    pub fn set_workspace_count(&mut self, workspace_count: usize) {
        self.workspace_count = workspace_count;
        let max = self.max_offset();
        for offset in &mut self.offsets {
            *offset = (*offset).min(max);
        }
    }

    /// Reset to `monitor_count` zero offsets.
    pub fn reset(&mut self, monitor_count: usize, workspace_count: usize) {
        *self = Self::new(monitor_count, workspace_count);
    }

    /// Forget every monitor.
    pub fn clear(&mut self) {
        self.offsets.clear();
        self.workspace_count = 0;
    }

    /// All offsets in monitor order.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    fn max_offset(&self) -> usize {
        self.workspace_count.saturating_sub(1)
    }
}
