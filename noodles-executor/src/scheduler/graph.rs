//! Execution graph: operator arena, edge list and cached schedule.

use super::sort::{SortOutcome, compute_levels, topological_sort};
use noodles_core::error::{NoodlesError, Result};
use noodles_core::flow::{Edge, EdgeKind};
use noodles_core::traits::Operator;
use noodles_core::types::OperatorId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Index of an operator slot in the graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(u32);

impl NodeIndex {
    fn new(index: usize) -> Self {
        Self(index as u32)
    }

    fn get(self) -> usize {
        self.0 as usize
    }
}

/// A dependency between two operators, with handle information discarded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeLink {
    /// Operator producing the value.
    pub source: OperatorId,
    /// Operator depending on the value.
    pub target: OperatorId,
    /// Scheduling kind.
    pub kind: EdgeKind,
}

impl EdgeLink {
    /// Create a data link.
    pub fn data(source: impl Into<OperatorId>, target: impl Into<OperatorId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: EdgeKind::Data,
        }
    }

    /// Create a loop-carry link.
    pub fn loop_carry(source: impl Into<OperatorId>, target: impl Into<OperatorId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: EdgeKind::LoopCarry,
        }
    }

    fn is_data(&self) -> bool {
        self.kind == EdgeKind::Data
    }
}

impl From<&Edge> for EdgeLink {
    fn from(edge: &Edge) -> Self {
        Self {
            source: edge.source.clone(),
            target: edge.target.clone(),
            kind: edge.kind,
        }
    }
}

struct Slot {
    operator: Arc<dyn Operator>,
    /// Neighbors that depend on this node, with the strongest edge kind.
    downstream: HashMap<NodeIndex, EdgeKind>,
    /// Neighbors this node depends on, with the strongest edge kind.
    upstream: HashMap<NodeIndex, EdgeKind>,
}

impl Slot {
    fn new(operator: Arc<dyn Operator>) -> Self {
        Self {
            operator,
            downstream: HashMap::new(),
            upstream: HashMap::new(),
        }
    }
}

/// The operator graph owned by the engine.
///
/// Operators live in an arena of slots addressed by [`NodeIndex`]. The edge
/// list is the single source of truth: the per-slot upstream/downstream maps
/// are derived from it and rebuilt wholesale whenever an edge or node is
/// removed. Edges may reference operators that are not (yet) in the graph;
/// such edges are kept but ignored until both endpoints exist.
///
/// The topological order and dependency levels are cached and recomputed
/// lazily the next time they are requested after a shape change.
pub struct ExecutionGraph {
    slots: Vec<Option<Slot>>,
    index: HashMap<OperatorId, NodeIndex>,
    edges: Vec<EdgeLink>,
    shape_dirty: bool,
    sorted: Vec<OperatorId>,
    levels: Vec<Vec<OperatorId>>,
    cycles: Vec<Vec<OperatorId>>,
    sort_passes: u64,
}

impl ExecutionGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            shape_dirty: false,
            sorted: Vec::new(),
            levels: Vec::new(),
            cycles: Vec::new(),
            sort_passes: 0,
        }
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Insert an operator. Re-inserting an existing ID replaces the operator
    /// reference and keeps its edges.
    pub fn add_node(&mut self, operator: Arc<dyn Operator>) -> NodeIndex {
        let id = operator.id().clone();
        if let Some(&idx) = self.index.get(&id) {
            if let Some(slot) = self.slots[idx.get()].as_mut() {
                slot.operator = operator;
            }
            return idx;
        }

        let idx = NodeIndex::new(self.slots.len());
        self.slots.push(Some(Slot::new(operator)));
        self.index.insert(id.clone(), idx);

        // Edges registered before this operator appeared become live now.
        let pending: Vec<EdgeLink> = self
            .edges
            .iter()
            .filter(|e| e.source == id || e.target == id)
            .cloned()
            .collect();
        for link in &pending {
            self.link(link);
        }

        self.shape_dirty = true;
        tracing::trace!(operator_id = %id, index = idx.0, "Node added");
        idx
    }

    /// Remove an operator and every edge referencing it.
    pub fn remove_node(&mut self, id: &OperatorId) -> Option<Arc<dyn Operator>> {
        let idx = self.index.remove(id)?;
        let slot = self.slots[idx.get()].take()?;

        self.edges.retain(|e| &e.source != id && &e.target != id);
        self.rebuild_adjacency();
        self.shape_dirty = true;

        tracing::trace!(operator_id = %id, "Node removed");
        Some(slot.operator)
    }

    /// Whether an operator is registered.
    pub fn contains(&self, id: &OperatorId) -> bool {
        self.index.contains_key(id)
    }

    /// Look up an operator.
    pub fn operator(&self, id: &OperatorId) -> Option<Arc<dyn Operator>> {
        self.slot(id).map(|s| Arc::clone(&s.operator))
    }

    /// All operators in insertion order.
    pub fn operators(&self) -> impl Iterator<Item = &Arc<dyn Operator>> {
        self.slots.iter().flatten().map(|s| &s.operator)
    }

    /// All operator IDs in insertion order.
    pub fn node_ids(&self) -> Vec<OperatorId> {
        self.operators().map(|op| op.id().clone()).collect()
    }

    /// Number of operators.
    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    // =========================================================================
    // Edges
    // =========================================================================

    /// Add a data edge after checking that it keeps the graph acyclic.
    ///
    /// Both endpoints must be registered. On rejection the edge list is left
    /// untouched and a cycle error carries the offending cycle.
    pub fn add_edge(&mut self, source: &OperatorId, target: &OperatorId) -> Result<()> {
        self.require_endpoints(source, target)?;
        let candidate = EdgeLink::data(source.clone(), target.clone());
        if let Some(path) = self.cycle_with(&candidate) {
            tracing::debug!(
                source = %source,
                target = %target,
                cycle_len = path.len(),
                "Rejected edge that would create a cycle"
            );
            return Err(NoodlesError::Cycle { path });
        }

        self.push_edge(candidate);
        Ok(())
    }

    /// Add a declared loop-carry edge. These never participate in ordering,
    /// so no cycle check is needed.
    pub fn add_loop_edge(&mut self, source: &OperatorId, target: &OperatorId) {
        self.push_edge(EdgeLink::loop_carry(source.clone(), target.clone()));
    }

    /// Remove the data edge between `source` and `target`.
    ///
    /// Loop-carry edges between the same pair are kept; use
    /// [`ExecutionGraph::remove_loop_edge`] for those.
    pub fn remove_edge(&mut self, source: &OperatorId, target: &OperatorId) -> Result<()> {
        self.remove_edge_of_kind(source, target, EdgeKind::Data)
    }

    /// Remove the loop-carry edge between `source` and `target`.
    pub fn remove_loop_edge(&mut self, source: &OperatorId, target: &OperatorId) -> Result<()> {
        self.remove_edge_of_kind(source, target, EdgeKind::LoopCarry)
    }

    fn remove_edge_of_kind(
        &mut self,
        source: &OperatorId,
        target: &OperatorId,
        kind: EdgeKind,
    ) -> Result<()> {
        let pos = self
            .edges
            .iter()
            .position(|e| &e.source == source && &e.target == target && e.kind == kind)
            .ok_or_else(|| NoodlesError::EdgeNotFound {
                source_id: source.clone(),
                target_id: target.clone(),
            })?;

        self.edges.remove(pos);
        self.rebuild_adjacency();
        self.shape_dirty = true;
        Ok(())
    }

    /// Replace every edge with `edges`.
    ///
    /// This is the bulk-sync path and does not validate acyclicity; cycles
    /// introduced here surface as warnings on the next sort. Edges naming
    /// operators that are not registered yet stay inert until those
    /// operators are added.
    pub fn build_from_edges<'a, I>(&mut self, edges: I)
    where
        I: IntoIterator<Item = &'a Edge>,
    {
        self.edges = edges.into_iter().map(EdgeLink::from).collect();
        self.rebuild_adjacency();
        self.shape_dirty = true;
        tracing::debug!(edges = self.edges.len(), "Rebuilt graph edges");
    }

    /// Whether adding a data edge `source -> target` would close a cycle.
    ///
    /// Runs exactly the checks [`ExecutionGraph::add_edge`] runs, without
    /// mutating the graph, so unregistered endpoints fail the same way.
    pub fn would_create_cycle(&mut self, source: &OperatorId, target: &OperatorId) -> Result<bool> {
        self.require_endpoints(source, target)?;
        Ok(self
            .cycle_with(&EdgeLink::data(source.clone(), target.clone()))
            .is_some())
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> &[EdgeLink] {
        &self.edges
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Operators that `id` depends on (any edge kind).
    pub fn upstream(&self, id: &OperatorId) -> Vec<OperatorId> {
        self.slot(id)
            .map(|s| self.neighbor_ids(s.upstream.keys().copied()))
            .unwrap_or_default()
    }

    /// Operators that depend on `id` (any edge kind).
    pub fn downstream(&self, id: &OperatorId) -> Vec<OperatorId> {
        self.slot(id)
            .map(|s| self.neighbor_ids(s.downstream.keys().copied()))
            .unwrap_or_default()
    }

    /// Operators that depend on `id` through data edges only.
    pub fn data_downstream(&self, id: &OperatorId) -> Vec<OperatorId> {
        self.slot(id)
            .map(|s| {
                self.neighbor_ids(
                    s.downstream
                        .iter()
                        .filter(|(_, kind)| **kind == EdgeKind::Data)
                        .map(|(idx, _)| *idx),
                )
            })
            .unwrap_or_default()
    }

    /// Whether the operator has any upstream dependency.
    pub fn has_upstream(&self, id: &OperatorId) -> bool {
        self.slot(id).is_some_and(|s| !s.upstream.is_empty())
    }

    /// Whether the operator has any downstream dependent.
    pub fn has_downstream(&self, id: &OperatorId) -> bool {
        self.slot(id).is_some_and(|s| !s.downstream.is_empty())
    }

    // =========================================================================
    // Schedule
    // =========================================================================

    /// Topological execution order, re-sorting only after a shape change.
    ///
    /// Operators on a cycle are left out.
    pub fn execution_order(&mut self) -> Vec<OperatorId> {
        self.ensure_sorted();
        self.sorted.clone()
    }

    /// Dependency levels for parallel execution, re-sorting only after a
    /// shape change.
    pub fn execution_levels(&mut self) -> Vec<Vec<OperatorId>> {
        self.ensure_sorted();
        self.levels.clone()
    }

    /// Whether the graph shape changed since the last sort.
    pub fn is_shape_dirty(&self) -> bool {
        self.shape_dirty
    }

    /// Cycles found by the last sort.
    pub fn cycles(&self) -> &[Vec<OperatorId>] {
        &self.cycles
    }

    /// Length of the cached order (without re-sorting).
    pub fn cached_order_len(&self) -> usize {
        self.sorted.len()
    }

    /// Number of cached dependency levels (without re-sorting).
    pub fn cached_level_count(&self) -> usize {
        self.levels.len()
    }

    /// How many times the sorter has run on this graph.
    pub fn sort_passes(&self) -> u64 {
        self.sort_passes
    }

    /// Check that the derived adjacency maps match the edge list.
    pub fn adjacency_consistent(&self) -> bool {
        let mut expected = ExecutionGraph::new();
        for op in self.operators() {
            expected.slots.push(Some(Slot::new(Arc::clone(op))));
        }
        expected.index = self
            .operators()
            .enumerate()
            .map(|(i, op)| (op.id().clone(), NodeIndex::new(i)))
            .collect();
        expected.edges = self.edges.clone();
        expected.rebuild_adjacency();

        self.node_ids().iter().all(|id| {
            let up: HashSet<_> = self.upstream(id).into_iter().collect();
            let down: HashSet<_> = self.downstream(id).into_iter().collect();
            up == expected.upstream(id).into_iter().collect::<HashSet<_>>()
                && down == expected.downstream(id).into_iter().collect::<HashSet<_>>()
        })
    }

    fn ensure_sorted(&mut self) {
        if !self.shape_dirty && self.sort_passes > 0 {
            return;
        }

        let outcome = self.sort_with(None);
        let edges = self.live_data_edges(None);
        self.levels = compute_levels(&outcome.sorted, &edges)
            .into_iter()
            .map(|level| self.ids_of(level))
            .collect();
        self.sorted = self.ids_of(outcome.sorted);
        self.cycles = outcome
            .cycles
            .into_iter()
            .map(|cycle| self.ids_of(cycle))
            .collect();

        for cycle in &self.cycles {
            tracing::warn!(
                cycle = %format_cycle(cycle),
                "Graph contains a cycle; its operators are skipped"
            );
        }

        self.shape_dirty = false;
    }

    /// Run the sorter over live data edges, optionally with one extra edge.
    fn sort_with(&mut self, extra: Option<&EdgeLink>) -> SortOutcome<NodeIndex> {
        self.sort_passes += 1;
        let nodes: Vec<NodeIndex> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(i, _)| NodeIndex::new(i))
            .collect();
        topological_sort(&nodes, &self.live_data_edges(extra))
    }

    fn require_endpoints(&self, source: &OperatorId, target: &OperatorId) -> Result<()> {
        for id in [source, target] {
            if !self.index.contains_key(id) {
                return Err(NoodlesError::UnknownOperator { id: id.clone() });
            }
        }
        Ok(())
    }

    fn cycle_with(&mut self, candidate: &EdgeLink) -> Option<Vec<OperatorId>> {
        let outcome = self.sort_with(Some(candidate));
        if outcome.is_acyclic() {
            return None;
        }

        let source = self.index.get(&candidate.source).copied();
        let target = self.index.get(&candidate.target).copied();
        let closes = |cycle: &Vec<NodeIndex>| {
            let n = cycle.len();
            (0..n).any(|i| Some(cycle[i]) == source && Some(cycle[(i + 1) % n]) == target)
        };

        let chosen = outcome
            .cycles
            .iter()
            .find(|c| closes(c))
            .or_else(|| outcome.cycles.first())?;
        Some(self.ids_of(chosen.iter().copied()))
    }

    fn live_data_edges(&self, extra: Option<&EdgeLink>) -> Vec<(NodeIndex, NodeIndex)> {
        self.edges
            .iter()
            .chain(extra)
            .filter(|e| e.is_data())
            .filter_map(|e| Some((*self.index.get(&e.source)?, *self.index.get(&e.target)?)))
            .collect()
    }

    fn push_edge(&mut self, link: EdgeLink) {
        self.link(&link);
        self.edges.push(link);
        self.shape_dirty = true;
    }

    /// Record `link` in the adjacency maps if both endpoints exist.
    fn link(&mut self, link: &EdgeLink) {
        let (Some(&s), Some(&t)) = (self.index.get(&link.source), self.index.get(&link.target))
        else {
            return;
        };

        if let Some(slot) = self.slots[s.get()].as_mut() {
            merge_kind(slot.downstream.entry(t).or_insert(link.kind), link.kind);
        }
        if let Some(slot) = self.slots[t.get()].as_mut() {
            merge_kind(slot.upstream.entry(s).or_insert(link.kind), link.kind);
        }
    }

    fn rebuild_adjacency(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.upstream.clear();
            slot.downstream.clear();
        }
        let edges = std::mem::take(&mut self.edges);
        for link in &edges {
            self.link(link);
        }
        self.edges = edges;
    }

    fn slot(&self, id: &OperatorId) -> Option<&Slot> {
        let idx = self.index.get(id)?;
        self.slots[idx.get()].as_ref()
    }

    /// Map unordered neighbor indices to IDs in arena order.
    fn neighbor_ids(&self, indices: impl IntoIterator<Item = NodeIndex>) -> Vec<OperatorId> {
        let mut indices: Vec<NodeIndex> = indices.into_iter().collect();
        indices.sort_unstable();
        self.ids_of(indices)
    }

    fn ids_of(&self, indices: impl IntoIterator<Item = NodeIndex>) -> Vec<OperatorId> {
        indices
            .into_iter()
            .filter_map(|idx| self.slots[idx.get()].as_ref())
            .map(|s| s.operator.id().clone())
            .collect()
    }
}

/// A data edge wins over a loop-carry edge between the same pair.
fn merge_kind(existing: &mut EdgeKind, incoming: EdgeKind) {
    if incoming == EdgeKind::Data {
        *existing = EdgeKind::Data;
    }
}

fn format_cycle(cycle: &[OperatorId]) -> String {
    cycle
        .iter()
        .map(OperatorId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl Default for ExecutionGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExecutionGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionGraph")
            .field("nodes", &self.node_ids())
            .field("edges", &self.edges)
            .field("shape_dirty", &self.shape_dirty)
            .finish()
    }
}
