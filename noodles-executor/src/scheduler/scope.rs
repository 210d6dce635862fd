//! For-loop scope discovery and execution.
//!
//! A scope is the subgraph between a `ForLoopBegin` operator and its matching
//! `ForLoopEnd`. The executor runs the body once per element of Begin's input
//! collection, injecting the current item through Begin's outputs and the
//! running accumulator through the optional `ForLoopMeta` operator. Body
//! operators never learn they are inside a loop; they react through ordinary
//! dirty flags and scope-local topological execution.

use super::graph::ExecutionGraph;
use super::sort::topological_sort;
use noodles_core::error::{NoodlesError, Result};
use noodles_core::flow::EdgeKind;
use noodles_core::ports;
use noodles_core::traits::{Operator, OperatorRole};
use noodles_core::types::OperatorId;
use noodles_core::value::Value;
use futures::future::BoxFuture;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::Instrument;

/// A discovered for-loop scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForLoopScope {
    /// The Begin operator.
    pub begin: OperatorId,
    /// The matching End operator.
    pub end: OperatorId,
    /// The Meta operator, if the loop has one.
    pub meta: Option<OperatorId>,
    /// Every operator visited between Begin and End, including End and Meta.
    pub members: Vec<OperatorId>,
}

impl ForLoopScope {
    /// Whether `id` belongs to the scope (Begin included).
    pub fn contains(&self, id: &OperatorId) -> bool {
        &self.begin == id || self.members.contains(id)
    }
}

/// An operator failure inside a scope iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeError {
    /// Zero-based iteration index of the scope that was run. Failures in a
    /// nested loop carry the outer iteration.
    pub iteration: usize,
    /// The failing operator.
    pub operator_id: OperatorId,
    /// What went wrong.
    pub error: NoodlesError,
}

/// Result of running a scope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScopeOutcome {
    /// One entry per iteration, read from End's `item` input.
    pub results: Vec<Value>,
    /// Accumulator after the last iteration (`null` without a Meta operator).
    pub accumulator: Value,
    /// Isolated operator failures.
    pub errors: Vec<ScopeError>,
}

/// Find every for-loop scope in the graph.
///
/// From each Begin operator the downstream adjacency is walked breadth-first.
/// Every visited operator joins the scope and the walk stops at End
/// operators. A nested Begin contributes its whole scope, and the walk
/// resumes after that scope's End, so the End an outer loop closes on is
/// the first one no nested loop claims. The same rule picks the Meta
/// operator. Begins without a reachable End are skipped.
pub fn find_for_loop_scopes(graph: &ExecutionGraph) -> Vec<ForLoopScope> {
    let mut finder = ScopeFinder::new(graph);
    let mut scopes = Vec::new();

    for op in graph.operators() {
        if op.role() != OperatorRole::ForLoopBegin {
            continue;
        }
        match finder.scope_of(op.id()) {
            Some(scope) => scopes.push(scope),
            None => {
                tracing::warn!(begin = %op.id(), "ForLoopBegin has no reachable ForLoopEnd");
            }
        }
    }

    scopes
}

/// Scope discovery with memoized nested scopes.
struct ScopeFinder<'g> {
    graph: &'g ExecutionGraph,
    found: HashMap<OperatorId, Option<ForLoopScope>>,
    in_progress: HashSet<OperatorId>,
}

impl<'g> ScopeFinder<'g> {
    fn new(graph: &'g ExecutionGraph) -> Self {
        Self {
            graph,
            found: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    fn scope_of(&mut self, begin: &OperatorId) -> Option<ForLoopScope> {
        if let Some(found) = self.found.get(begin) {
            return found.clone();
        }

        self.in_progress.insert(begin.clone());
        let scope = self.walk(begin);
        self.in_progress.remove(begin);

        self.found.insert(begin.clone(), scope.clone());
        scope
    }

    fn walk(&mut self, begin: &OperatorId) -> Option<ForLoopScope> {
        let graph = self.graph;
        let mut visited: HashSet<OperatorId> = HashSet::from([begin.clone()]);
        let mut queue: VecDeque<OperatorId> = graph.downstream(begin).into();
        let mut members = Vec::new();
        let mut ends = Vec::new();
        let mut metas = Vec::new();
        // Operators owned by nested scopes.
        let mut claimed: HashSet<OperatorId> = HashSet::new();

        while let Some(id) = queue.pop_front() {
            if !visited.insert(id.clone()) {
                continue;
            }
            let Some(member) = graph.operator(&id) else {
                continue;
            };
            members.push(id.clone());

            match member.role() {
                OperatorRole::ForLoopEnd => {
                    ends.push(id);
                    continue;
                }
                OperatorRole::ForLoopMeta => metas.push(id.clone()),
                OperatorRole::ForLoopBegin if !self.in_progress.contains(&id) => {
                    if let Some(inner) = self.scope_of(&id) {
                        for inner_member in &inner.members {
                            claimed.insert(inner_member.clone());
                            if visited.insert(inner_member.clone()) {
                                members.push(inner_member.clone());
                            }
                        }
                        queue.extend(graph.downstream(&inner.end));
                        continue;
                    }
                }
                _ => {}
            }

            queue.extend(graph.downstream(&id));
        }

        let end = ends.into_iter().find(|e| !claimed.contains(e))?;
        let meta = metas.into_iter().find(|m| !claimed.contains(m));
        Some(ForLoopScope {
            begin: begin.clone(),
            end,
            meta,
            members,
        })
    }
}

/// Operators needed to run a scope, resolved from the graph.
///
/// Building a plan only needs a shared view of the graph, so the engine
/// builds it under its state lock and runs it after releasing the lock.
pub struct ScopePlan {
    scope: ForLoopScope,
    begin: Arc<dyn Operator>,
    end: Arc<dyn Operator>,
    meta: Option<Arc<dyn Operator>>,
    /// Scope members in scope-local topological order.
    ordered: Vec<Arc<dyn Operator>>,
    /// Operators outside the scope feeding body operators.
    feeders: Vec<Arc<dyn Operator>>,
    /// Plans for loops nested in this one, keyed by their Begin operator.
    nested: HashMap<OperatorId, ScopePlan>,
    /// Members of nested scopes; those run inside their own plan.
    nested_members: HashSet<OperatorId>,
}

impl ScopePlan {
    /// Resolve a scope against the graph.
    pub fn new(graph: &ExecutionGraph, scope: &ForLoopScope) -> Result<Self> {
        let resolve = |id: &OperatorId| {
            graph.operator(id).ok_or_else(|| NoodlesError::ScopeInvalid {
                begin: scope.begin.clone(),
                cause: format!("operator '{}' is not in the graph", id),
            })
        };

        let begin = resolve(&scope.begin)?;
        let end = resolve(&scope.end)?;
        let meta = scope.meta.as_ref().map(resolve).transpose()?;

        let members: HashSet<&OperatorId> = scope.members.iter().collect();
        let local_edges: Vec<(OperatorId, OperatorId)> = graph
            .edges()
            .iter()
            .filter(|e| e.kind == EdgeKind::Data)
            .filter(|e| members.contains(&e.source) && members.contains(&e.target))
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect();

        let outcome = topological_sort(&scope.members, &local_edges);
        if !outcome.is_acyclic() {
            tracing::warn!(
                begin = %scope.begin,
                cycles = outcome.cycles.len(),
                "For-loop scope contains a cycle; its operators are skipped"
            );
        }
        let ordered = outcome
            .sorted
            .iter()
            .map(resolve)
            .collect::<Result<Vec<_>>>()?;

        let mut seen = HashSet::new();
        let feeders = graph
            .edges()
            .iter()
            .filter(|e| e.kind == EdgeKind::Data)
            .filter(|e| members.contains(&e.target) && !scope.contains(&e.source))
            .filter(|e| seen.insert(e.source.clone()))
            .filter_map(|e| graph.operator(&e.source))
            .collect();

        let mut finder = ScopeFinder::new(graph);
        let mut nested = HashMap::new();
        let mut nested_members = HashSet::new();
        for op in &ordered {
            if op.role() != OperatorRole::ForLoopBegin {
                continue;
            }
            if let Some(inner) = finder.scope_of(op.id()) {
                if inner.members.contains(&scope.begin) {
                    continue;
                }
                nested_members.extend(inner.members.iter().cloned());
                nested.insert(op.id().clone(), ScopePlan::new(graph, &inner)?);
            }
        }

        Ok(Self {
            scope: scope.clone(),
            begin,
            end,
            meta,
            ordered,
            feeders,
            nested,
            nested_members,
        })
    }

    /// The scope being executed.
    pub fn scope(&self) -> &ForLoopScope {
        &self.scope
    }

    /// Whether Begin or any member is flagged dirty.
    pub fn is_dirty(&self) -> bool {
        self.begin.is_dirty() || self.ordered.iter().any(|op| op.is_dirty())
    }

    /// Run every iteration and publish the collected results on End.
    pub async fn execute(&self) -> Result<ScopeOutcome> {
        let span = tracing::info_span!(
            "for_loop_scope",
            begin = %self.scope.begin,
            end = %self.scope.end,
            members = self.scope.members.len(),
        );
        self.run().instrument(span).await
    }

    /// Boxed [`ScopePlan::execute`], for running nested loops.
    fn execute_boxed(&self) -> BoxFuture<'_, Result<ScopeOutcome>> {
        Box::pin(self.execute())
    }

    async fn run(&self) -> Result<ScopeOutcome> {
        let mut outcome = ScopeOutcome::default();

        // Bring Begin's collection and the body's outside inputs up to date.
        for op in std::iter::once(&self.begin).chain(&self.feeders) {
            if let Err(error) = op.pull().await {
                tracing::warn!(operator_id = %op.id(), error = %error, "Scope input pull failed");
                outcome.errors.push(ScopeError {
                    iteration: 0,
                    operator_id: op.id().clone(),
                    error,
                });
            }
        }

        let Some(items) = self
            .begin
            .input_value(ports::BEGIN_DATA)
            .and_then(|v| v.as_array())
        else {
            tracing::debug!("Scope input is not a sequence; nothing to iterate");
            self.begin.set_dirty(false);
            return Ok(outcome);
        };

        let total = items.len();
        let mut accumulator = self
            .meta
            .as_ref()
            .and_then(|m| m.input_value(ports::META_INITIAL_VALUE))
            .unwrap_or_default();

        for (index, item) in items.into_iter().enumerate() {
            self.begin.set_output(ports::BEGIN_ITEM, item)?;
            self.begin.set_output(ports::INDEX, Value::from(index))?;
            self.begin.set_output(ports::TOTAL, Value::from(total))?;

            if let Some(meta) = &self.meta {
                meta.set_output(ports::META_ACCUMULATOR, accumulator.clone())?;
                meta.set_output(ports::INDEX, Value::from(index))?;
                meta.set_output(ports::TOTAL, Value::from(total))?;
                meta.set_output(ports::META_IS_FIRST, Value::bool(index == 0))?;
                meta.set_output(ports::META_IS_LAST, Value::bool(index + 1 == total))?;
            }

            for op in &self.ordered {
                op.set_dirty(true);
            }

            for op in &self.ordered {
                if !op.is_dirty() {
                    continue;
                }
                if let Some(inner) = self.nested.get(op.id()) {
                    match inner.execute_boxed().await {
                        Ok(inner_outcome) => {
                            outcome.errors.extend(
                                inner_outcome
                                    .errors
                                    .into_iter()
                                    .map(|e| ScopeError { iteration: index, ..e }),
                            );
                        }
                        Err(error) => outcome.errors.push(ScopeError {
                            iteration: index,
                            operator_id: op.id().clone(),
                            error,
                        }),
                    }
                    op.set_dirty(false);
                    continue;
                }
                if self.nested_members.contains(op.id()) || op.role().is_loop_control() {
                    op.set_dirty(false);
                    continue;
                }
                if let Err(error) = run_operator(op.as_ref()).await {
                    tracing::warn!(
                        operator_id = %op.id(),
                        iteration = index,
                        error = %error,
                        "Operator failed inside for-loop scope"
                    );
                    outcome.errors.push(ScopeError {
                        iteration: index,
                        operator_id: op.id().clone(),
                        error,
                    });
                }
                op.set_dirty(false);
            }

            outcome
                .results
                .push(self.end.input_value(ports::END_ITEM).unwrap_or_default());

            if let Some(meta) = &self.meta {
                if let Some(next) = meta.input_value(ports::META_CURRENT_VALUE) {
                    accumulator = next;
                }
            }
        }

        self.end
            .set_output(ports::END_DATA, Value::array(outcome.results.clone()))?;
        self.end.set_dirty(false);
        self.begin.set_dirty(false);
        outcome.accumulator = accumulator;

        tracing::debug!(
            iterations = total,
            errors = outcome.errors.len(),
            "For-loop scope finished"
        );
        Ok(outcome)
    }
}

/// Execute one body operator and publish its outputs.
async fn run_operator(op: &dyn Operator) -> Result<()> {
    let inputs = op.read_inputs();
    let outputs = op.execute(inputs).await?;
    for (name, value) in outputs {
        op.set_output(&name, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubOperator;

    fn id(s: &str) -> OperatorId {
        OperatorId::new(s)
    }

    fn loop_graph() -> ExecutionGraph {
        let mut graph = ExecutionGraph::new();
        graph.add_node(Arc::new(StubOperator::new("begin", OperatorRole::ForLoopBegin)));
        graph.add_node(Arc::new(StubOperator::new("meta", OperatorRole::ForLoopMeta)));
        graph.add_node(StubOperator::transform("body"));
        graph.add_node(Arc::new(StubOperator::new("end", OperatorRole::ForLoopEnd)));
        graph.add_node(StubOperator::sink("after"));

        graph.add_edge(&id("begin"), &id("body")).unwrap();
        graph.add_edge(&id("meta"), &id("body")).unwrap();
        graph.add_edge(&id("body"), &id("end")).unwrap();
        graph.add_loop_edge(&id("body"), &id("meta"));
        graph.add_edge(&id("end"), &id("after")).unwrap();
        graph
    }

    #[test]
    fn discovers_scope_members() {
        let graph = loop_graph();
        let scopes = find_for_loop_scopes(&graph);

        assert_eq!(scopes.len(), 1);
        let scope = &scopes[0];
        assert_eq!(scope.begin, id("begin"));
        assert_eq!(scope.end, id("end"));
        assert_eq!(scope.meta, Some(id("meta")));

        assert!(scope.members.contains(&id("body")));
        assert!(scope.members.contains(&id("meta")));
        assert!(!scope.members.contains(&id("begin")));
        assert!(!scope.members.contains(&id("after")));
    }

    #[test]
    fn nested_loop_keeps_outer_scope() {
        let mut graph = ExecutionGraph::new();
        graph.add_node(Arc::new(StubOperator::new("outer", OperatorRole::ForLoopBegin)));
        graph.add_node(StubOperator::transform("x"));
        graph.add_node(Arc::new(StubOperator::new("inner", OperatorRole::ForLoopBegin)));
        graph.add_node(StubOperator::transform("y"));
        graph.add_node(Arc::new(StubOperator::new("inner_end", OperatorRole::ForLoopEnd)));
        graph.add_node(StubOperator::transform("z"));
        graph.add_node(Arc::new(StubOperator::new("outer_end", OperatorRole::ForLoopEnd)));

        let chain = ["outer", "x", "inner", "y", "inner_end", "z", "outer_end"];
        for pair in chain.windows(2) {
            graph.add_edge(&id(pair[0]), &id(pair[1])).unwrap();
        }
        // Shortcut into the inner body from the outer body.
        graph.add_edge(&id("x"), &id("y")).unwrap();

        let scopes = find_for_loop_scopes(&graph);
        assert_eq!(scopes.len(), 2);

        let outer = scopes.iter().find(|s| s.begin == id("outer")).unwrap();
        assert_eq!(outer.end, id("outer_end"));
        for name in ["x", "inner", "y", "inner_end", "z", "outer_end"] {
            assert!(outer.members.contains(&id(name)), "{name}");
        }

        let inner = scopes.iter().find(|s| s.begin == id("inner")).unwrap();
        assert_eq!(inner.end, id("inner_end"));
        assert!(inner.members.contains(&id("y")));
        assert!(!inner.members.contains(&id("z")));
        assert!(!inner.members.contains(&id("outer_end")));
    }

    #[test]
    fn begin_without_end_is_skipped() {
        let mut graph = ExecutionGraph::new();
        graph.add_node(Arc::new(StubOperator::new("begin", OperatorRole::ForLoopBegin)));
        graph.add_node(StubOperator::transform("body"));
        graph.add_edge(&id("begin"), &id("body")).unwrap();

        assert!(find_for_loop_scopes(&graph).is_empty());
    }

    #[test]
    fn plan_orders_members_locally() {
        let graph = loop_graph();
        let scope = find_for_loop_scopes(&graph).remove(0);
        let plan = ScopePlan::new(&graph, &scope).unwrap();

        let order: Vec<_> = plan.ordered.iter().map(|op| op.id().clone()).collect();
        let pos = |name: &str| order.iter().position(|i| i == &id(name)).unwrap();
        assert!(pos("meta") < pos("body"));
        assert!(pos("body") < pos("end"));
    }

    #[test]
    fn plan_fails_for_missing_operator() {
        let graph = loop_graph();
        let scope = ForLoopScope {
            begin: id("begin"),
            end: id("missing"),
            meta: None,
            members: vec![],
        };
        assert!(matches!(
            ScopePlan::new(&graph, &scope),
            Err(NoodlesError::ScopeInvalid { .. })
        ));
    }

    #[tokio::test]
    async fn non_sequence_input_yields_empty_results() {
        let graph = loop_graph();
        let scope = find_for_loop_scopes(&graph).remove(0);
        let outcome = ScopePlan::new(&graph, &scope)
            .unwrap()
            .execute()
            .await
            .unwrap();

        assert!(outcome.results.is_empty());
        assert!(outcome.errors.is_empty());
    }
}
