//! Operator store abstraction.

use super::operator::Operator;
use crate::types::OperatorId;
use parking_lot::RwLock;
use std::sync::Arc;

/// Source of truth for the set of live operators.
///
/// The engine re-syncs its node set from the store every frame, so
/// operators may appear and disappear between frames.
pub trait OperatorStore: Send + Sync {
    /// Snapshot of every live operator.
    fn all_operators(&self) -> Vec<Arc<dyn Operator>>;

    /// Look up a single operator.
    fn get(&self, id: &OperatorId) -> Option<Arc<dyn Operator>> {
        self.all_operators().into_iter().find(|op| op.id() == id)
    }
}

/// In-memory operator store preserving insertion order.
#[derive(Default)]
pub struct MemoryStore {
    operators: RwLock<Vec<Arc<dyn Operator>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an operator, replacing any operator with the same ID.
    pub fn insert(&self, op: Arc<dyn Operator>) {
        tracing::trace!(operator_id = %op.id(), "Inserting operator into store");
        let mut operators = self.operators.write();
        if let Some(slot) = operators.iter_mut().find(|o| o.id() == op.id()) {
            *slot = op;
        } else {
            operators.push(op);
        }
    }

    /// Remove an operator by ID, returning it if present.
    pub fn remove(&self, id: &OperatorId) -> Option<Arc<dyn Operator>> {
        let mut operators = self.operators.write();
        let pos = operators.iter().position(|o| o.id() == id)?;
        tracing::trace!(operator_id = %id, "Removing operator from store");
        Some(operators.remove(pos))
    }

    /// Number of operators.
    pub fn len(&self) -> usize {
        self.operators.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.operators.read().is_empty()
    }
}

impl OperatorStore for MemoryStore {
    fn all_operators(&self) -> Vec<Arc<dyn Operator>> {
        self.operators.read().clone()
    }

    fn get(&self, id: &OperatorId) -> Option<Arc<dyn Operator>> {
        self.operators.read().iter().find(|o| o.id() == id).cloned()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<String> = self
            .operators
            .read()
            .iter()
            .map(|o| o.id().to_string())
            .collect();
        f.debug_struct("MemoryStore").field("operators", &ids).finish()
    }
}
