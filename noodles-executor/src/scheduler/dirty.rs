//! Dirty-state tracking with downstream propagation.

use super::graph::ExecutionGraph;
use noodles_core::types::OperatorId;
use std::collections::HashSet;
use std::time::Duration;

/// Tracks which operators need recomputation.
///
/// In immediate mode (`batch_delay == 0`) marking an operator dirty cascades
/// to everything reachable through data edges right away. In batched mode
/// the named operators are flagged immediately and the cascade is deferred
/// until the batch deadline passes or the next frame starts, coalescing
/// bursts of edits into one walk.
///
/// The cascade keeps a visited set, so it terminates even on graphs whose
/// cycles were introduced through the unvalidated bulk-sync path.
#[derive(Debug)]
pub struct DirtyTracker {
    dirty: HashSet<OperatorId>,
    batch_delay: Duration,
    pending: Vec<OperatorId>,
    /// Batch deadline in clock nanoseconds.
    deadline: Option<u64>,
}

impl DirtyTracker {
    /// Create a tracker. A zero `batch_delay` selects immediate mode.
    pub fn new(batch_delay: Duration) -> Self {
        Self {
            dirty: HashSet::new(),
            batch_delay,
            pending: Vec::new(),
            deadline: None,
        }
    }

    /// Whether cascades are deferred.
    pub fn is_batched(&self) -> bool {
        !self.batch_delay.is_zero()
    }

    /// Mark operators dirty. `now` is the current clock reading in
    /// nanoseconds and is only used to schedule the batch deadline.
    ///
    /// Returns the number of operators whose flag was set.
    pub fn mark_dirty(&mut self, graph: &ExecutionGraph, ids: &[OperatorId], now: u64) -> usize {
        if !self.is_batched() {
            return ids.iter().map(|id| self.cascade(graph, id)).sum();
        }

        let mut marked = 0;
        for id in ids {
            if self.mark_one(graph, id) {
                marked += 1;
                self.pending.push(id.clone());
            }
        }

        if !self.pending.is_empty() {
            // Each new mark pushes the deadline out again.
            self.deadline = Some(now.saturating_add(self.batch_delay.as_nanos() as u64));
        }
        marked
    }

    /// Mark every operator in the graph dirty, ignoring batching.
    pub fn force_update(&mut self, graph: &ExecutionGraph) -> usize {
        let mut marked = 0;
        for op in graph.operators() {
            op.set_dirty(true);
            self.dirty.insert(op.id().clone());
            marked += 1;
        }
        marked
    }

    /// Cascade every pending batch entry. Returns the number of operators marked.
    pub fn flush(&mut self, graph: &ExecutionGraph) -> usize {
        self.deadline = None;
        let pending = std::mem::take(&mut self.pending);
        pending.iter().map(|id| self.cascade(graph, id)).sum()
    }

    /// Flush if the batch deadline has passed.
    pub fn flush_if_due(&mut self, graph: &ExecutionGraph, now: u64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                let marked = self.flush(graph);
                tracing::trace!(marked, "Dirty batch flushed");
                true
            }
            _ => false,
        }
    }

    /// Drop the batch deadline. Pending entries are kept and cascade on the
    /// next flush.
    pub fn cancel_timer(&mut self) {
        self.deadline = None;
    }

    /// Whether a batch is waiting to cascade.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Batch deadline in clock nanoseconds, if one is scheduled.
    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    /// Record an operator as dirty without touching its flag or cascading.
    pub fn record(&mut self, id: OperatorId) {
        self.dirty.insert(id);
    }

    /// Forget an operator that left the graph.
    pub fn forget(&mut self, id: &OperatorId) {
        self.dirty.remove(id);
        self.pending.retain(|p| p != id);
    }

    /// Drop entries whose operator is gone or no longer flagged dirty.
    pub fn reconcile(&mut self, graph: &ExecutionGraph) -> usize {
        self.dirty
            .retain(|id| graph.operator(id).is_some_and(|op| op.is_dirty()));
        self.dirty.len()
    }

    /// Whether an operator is in the dirty set.
    pub fn contains(&self, id: &OperatorId) -> bool {
        self.dirty.contains(id)
    }

    /// Number of operators in the dirty set.
    pub fn len(&self) -> usize {
        self.dirty.len()
    }

    /// Whether the dirty set is empty.
    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty()
    }

    /// Set the operator's flag and record it. Returns false for unknown IDs.
    fn mark_one(&mut self, graph: &ExecutionGraph, id: &OperatorId) -> bool {
        let Some(op) = graph.operator(id) else {
            tracing::debug!(operator_id = %id, "Ignoring dirty mark for unknown operator");
            return false;
        };
        op.set_dirty(true);
        self.dirty.insert(id.clone());
        true
    }

    /// Mark `start` and everything downstream of it through data edges.
    fn cascade(&mut self, graph: &ExecutionGraph, start: &OperatorId) -> usize {
        let mut visited: HashSet<OperatorId> = HashSet::new();
        let mut stack = vec![start.clone()];
        let mut marked = 0;

        while let Some(id) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            if self.mark_one(graph, &id) {
                marked += 1;
            }
            stack.extend(
                graph
                    .data_downstream(&id)
                    .into_iter()
                    .filter(|next| !visited.contains(next)),
            );
        }

        marked
    }
}
