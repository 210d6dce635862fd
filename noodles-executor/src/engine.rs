//! Frame-paced operator engine.
//!
//! The engine owns the [`ExecutionGraph`] and [`DirtyTracker`] and drives
//! pull-based execution from root operators once per frame interval.
//!
//! ## Frame loop
//!
//! A tokio interval stands in for the host's per-frame callback. On every
//! tick the engine checks whether a frame interval has elapsed since the
//! last frame. If so, and no frame is still in flight, it advances the frame
//! baseline (carrying the remainder forward so the cadence does not drift)
//! and spawns one frame. Ticks that arrive while a frame is in flight are
//! dropped rather than queued, so slow frames degrade the effective frame
//! rate instead of building a backlog.
//!
//! ## Locking
//!
//! All graph bookkeeping sits behind one mutex. It is never held across an
//! `.await`: a frame snapshots the operators it needs, releases the lock,
//! awaits the pulls, and re-locks to record results.

use crate::config::EngineConfig;
use crate::metrics::{EngineMetrics, GraphStats, PerformanceMetrics};
use crate::scheduler::{
    DirtyTracker, ExecutionGraph, ForLoopScope, ScopeOutcome, ScopePlan, find_for_loop_scopes,
};
use futures::future::join_all;
use noodles_core::error::{NoodlesError, Result};
use noodles_core::flow::Edge;
use noodles_core::testing::{ClockProvider, RealClock};
use noodles_core::traits::{Operator, OperatorStore};
use noodles_core::types::OperatorId;
use noodles_core::value::Value;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, instrument};

/// Outcome of pulling one root operator.
#[derive(Debug, Clone, PartialEq)]
pub struct PullOutcome {
    /// The pulled value, absent when the pull failed.
    pub value: Option<Value>,
    /// Whether the value differs from the previous frame's value.
    pub changed: bool,
    /// The pull failure, if any.
    pub error: Option<NoodlesError>,
}

impl PullOutcome {
    fn success(value: Value, changed: bool) -> Self {
        Self {
            value: Some(value),
            changed,
            error: None,
        }
    }

    fn failure(error: NoodlesError) -> Self {
        Self {
            value: None,
            changed: false,
            error: Some(error),
        }
    }

    /// Whether the pull succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything one frame produced.
#[derive(Debug, Clone, Default)]
pub struct FrameResults {
    /// Frame number (1-based). Zero for a skipped frame.
    pub frame: u64,
    /// True when the frame did not run because another was in flight.
    pub skipped: bool,
    /// Per-root pull outcomes.
    pub roots: HashMap<OperatorId, PullOutcome>,
    /// For-loop scopes run during the frame, keyed by Begin operator.
    pub scopes: HashMap<OperatorId, ScopeOutcome>,
    /// Time spent in the frame.
    pub elapsed: Duration,
}

impl FrameResults {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    /// Outcome for a root operator.
    pub fn get(&self, id: &OperatorId) -> Option<&PullOutcome> {
        self.roots.get(id)
    }

    /// Pulled value for a root operator.
    pub fn value(&self, id: &OperatorId) -> Option<&Value> {
        self.roots.get(id).and_then(|o| o.value.as_ref())
    }

    /// Pull failure for a root operator.
    pub fn error(&self, id: &OperatorId) -> Option<&NoodlesError> {
        self.roots.get(id).and_then(|o| o.error.as_ref())
    }

    /// Failed roots.
    pub fn errors(&self) -> impl Iterator<Item = (&OperatorId, &NoodlesError)> {
        self.roots
            .iter()
            .filter_map(|(id, o)| o.error.as_ref().map(|e| (id, e)))
    }

    /// Number of root outcomes.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether no roots were pulled.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Result of a single [`OperatorEngine::tick`].
#[derive(Debug)]
pub enum Tick {
    /// The frame interval has not elapsed yet.
    Waiting,
    /// A frame was due but the previous one is still in flight.
    Skipped,
    /// A frame was started.
    Started(JoinHandle<FrameResults>),
}

struct EngineState {
    graph: ExecutionGraph,
    dirty: DirtyTracker,
    /// Clock reading (nanoseconds) of the last frame baseline.
    last_frame: u64,
    last_values: HashMap<OperatorId, Value>,
    metrics: PerformanceMetrics,
}

/// Resets the in-flight flag when a frame finishes.
struct PullGuard<'a>(&'a AtomicBool);

impl<'a> PullGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for PullGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owned in-flight claim for a frame handed to a spawned task.
///
/// Built before spawning, so the flag is released even if the task never
/// gets polled.
struct FrameClaim(Arc<OperatorEngine>);

impl Drop for FrameClaim {
    fn drop(&mut self) {
        self.0.pulling.store(false, Ordering::Release);
    }
}

/// The operator graph execution engine.
///
/// Operators live in an external [`OperatorStore`]; the engine re-syncs its
/// node set from the store at the start of every frame and whenever edges are
/// rebuilt, so operators registered directly with [`OperatorEngine::add_node`]
/// must also be present in the store to survive the next sync.
///
/// # Example
///
/// ```ignore
/// let engine = Arc::new(OperatorEngine::new(store, EngineConfig::default()));
/// engine.build_from_edges(&edges);
/// engine.start();
/// // ...
/// engine.stop();
/// ```
pub struct OperatorEngine {
    store: Arc<dyn OperatorStore>,
    config: EngineConfig,
    clock: Arc<dyn ClockProvider>,
    state: Mutex<EngineState>,
    pulling: AtomicBool,
    running: AtomicBool,
    ticker: Mutex<Option<JoinHandle<()>>>,
    prometheus: Option<Arc<EngineMetrics>>,
}

impl OperatorEngine {
    /// Create an engine reading operators from `store`.
    pub fn new(store: Arc<dyn OperatorStore>, config: EngineConfig) -> Self {
        let clock: Arc<dyn ClockProvider> = Arc::new(RealClock::new());
        Self {
            state: Mutex::new(EngineState {
                graph: ExecutionGraph::new(),
                dirty: DirtyTracker::new(config.batch_delay),
                last_frame: clock.now(),
                last_values: HashMap::new(),
                metrics: PerformanceMetrics::default(),
            }),
            store,
            config,
            clock,
            pulling: AtomicBool::new(false),
            running: AtomicBool::new(false),
            ticker: Mutex::new(None),
            prometheus: None,
        }
    }

    /// Use a custom clock (e.g. `MockClock` in tests).
    pub fn with_clock(mut self, clock: Arc<dyn ClockProvider>) -> Self {
        self.state.get_mut().last_frame = clock.now();
        self.clock = clock;
        self
    }

    /// Mirror frame metrics into a Prometheus registry.
    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.prometheus = Some(metrics);
        self
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Prometheus metrics, if attached.
    pub fn prometheus(&self) -> Option<&Arc<EngineMetrics>> {
        self.prometheus.as_ref()
    }

    // =========================================================================
    // Graph mutation
    // =========================================================================

    /// Register an operator. A dirty operator enters the dirty set.
    pub fn add_node(&self, operator: Arc<dyn Operator>) {
        let mut state = self.state.lock();
        if operator.is_dirty() {
            state.dirty.record(operator.id().clone());
        }
        state.graph.add_node(operator);
    }

    /// Remove an operator and its edges.
    pub fn remove_node(&self, id: &OperatorId) -> Option<Arc<dyn Operator>> {
        let mut state = self.state.lock();
        state.dirty.forget(id);
        state.last_values.remove(id);
        state.graph.remove_node(id)
    }

    /// Add a data edge, rejecting it with [`NoodlesError::Cycle`] if it
    /// would close a cycle and [`NoodlesError::UnknownOperator`] if either
    /// endpoint is not registered.
    pub fn add_edge(&self, source: &OperatorId, target: &OperatorId) -> Result<()> {
        self.state.lock().graph.add_edge(source, target)
    }

    /// Add a declared loop-carry edge.
    pub fn add_loop_edge(&self, source: &OperatorId, target: &OperatorId) {
        self.state.lock().graph.add_loop_edge(source, target);
    }

    /// Remove the data edge between two operators.
    pub fn remove_edge(&self, source: &OperatorId, target: &OperatorId) -> Result<()> {
        self.state.lock().graph.remove_edge(source, target)
    }

    /// Remove the loop-carry edge between two operators.
    pub fn remove_loop_edge(&self, source: &OperatorId, target: &OperatorId) -> Result<()> {
        self.state.lock().graph.remove_loop_edge(source, target)
    }

    /// Re-sync operators from the store and replace every edge.
    pub fn build_from_edges(&self, edges: &[Edge]) {
        let mut state = self.state.lock();
        self.sync_from_store(&mut state);
        state.graph.build_from_edges(edges);
    }

    /// Operators `id` depends on.
    pub fn upstream(&self, id: &OperatorId) -> Vec<OperatorId> {
        self.state.lock().graph.upstream(id)
    }

    /// Operators depending on `id`.
    pub fn downstream(&self, id: &OperatorId) -> Vec<OperatorId> {
        self.state.lock().graph.downstream(id)
    }

    /// Whether adding `source -> target` would close a cycle.
    ///
    /// Fails like [`OperatorEngine::add_edge`] for unregistered endpoints.
    pub fn would_create_cycle(&self, source: &OperatorId, target: &OperatorId) -> Result<bool> {
        self.state.lock().graph.would_create_cycle(source, target)
    }

    /// Cached topological execution order.
    pub fn execution_order(&self) -> Vec<OperatorId> {
        self.state.lock().graph.execution_order()
    }

    /// Cached dependency levels.
    pub fn execution_levels(&self) -> Vec<Vec<OperatorId>> {
        self.state.lock().graph.execution_levels()
    }

    /// Number of sorter runs so far.
    pub fn sort_passes(&self) -> u64 {
        self.state.lock().graph.sort_passes()
    }

    // =========================================================================
    // Dirty state
    // =========================================================================

    /// Mark operators dirty, cascading downstream now or at the next flush.
    pub fn mark_dirty(&self, ids: &[OperatorId]) -> usize {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let state = &mut *state;
        state.dirty.mark_dirty(&state.graph, ids, now)
    }

    /// Mark every operator dirty.
    pub fn force_update(&self) -> usize {
        let mut state = self.state.lock();
        let state = &mut *state;
        state.dirty.force_update(&state.graph)
    }

    /// Whether an operator is in the dirty set.
    pub fn is_marked_dirty(&self, id: &OperatorId) -> bool {
        self.state.lock().dirty.contains(id)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Snapshot of the graph.
    pub fn stats(&self) -> GraphStats {
        let state = self.state.lock();
        GraphStats {
            node_count: state.graph.node_count(),
            edge_count: state.graph.edge_count(),
            level_count: state.graph.cached_level_count(),
            dirty_count: state.dirty.len(),
            running: self.is_running(),
            order_len: state.graph.cached_order_len(),
            cycle_count: state.graph.cycles().len(),
        }
    }

    /// Snapshot of frame-loop performance.
    pub fn metrics(&self) -> PerformanceMetrics {
        self.state.lock().metrics.clone()
    }

    // =========================================================================
    // For-loop scopes
    // =========================================================================

    /// Discover every for-loop scope in the graph.
    pub fn find_for_loop_scopes(&self) -> Vec<ForLoopScope> {
        find_for_loop_scopes(&self.state.lock().graph)
    }

    /// Run a for-loop scope to completion.
    pub async fn execute_for_loop_scope(&self, scope: &ForLoopScope) -> Result<ScopeOutcome> {
        let plan = {
            let state = self.state.lock();
            ScopePlan::new(&state.graph, scope)?
        };
        plan.execute().await
    }

    // =========================================================================
    // Frame loop
    // =========================================================================

    /// Start the frame loop. Does nothing if already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        self.state.lock().last_frame = self.clock.now();

        let engine = Arc::downgrade(self);
        let tick_interval = self.config.tick_interval;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let Some(engine) = engine.upgrade() else {
                    break;
                };
                if !engine.is_running() {
                    break;
                }
                // Frames run detached; their results have no consumer here.
                let _ = engine.tick();
            }
        });

        if let Some(previous) = self.ticker.lock().replace(handle) {
            previous.abort();
        }

        tracing::info!(
            target_fps = self.config.target_fps,
            parallel = self.config.parallel,
            batch_delay_ms = self.config.batch_delay.as_millis() as u64,
            "Engine started"
        );
    }

    /// Stop the frame loop and drop any pending dirty-batch deadline.
    ///
    /// A frame already in flight runs to completion.
    pub fn stop(&self) {
        self.state.lock().dirty.cancel_timer();
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.ticker.lock().take() {
            handle.abort();
        }
        tracing::info!("Engine stopped");
    }

    /// Whether the frame loop is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Whether a frame is in flight.
    pub fn is_pulling(&self) -> bool {
        self.pulling.load(Ordering::SeqCst)
    }

    /// One host tick: flush a due dirty batch and start a frame if one is due.
    ///
    /// Must be called from within a tokio runtime when a frame is due.
    pub fn tick(self: &Arc<Self>) -> Tick {
        let now = self.clock.now();
        let interval = self.config.frame_interval().as_nanos() as u64;

        {
            let mut state = self.state.lock();
            let state = &mut *state;
            state.dirty.flush_if_due(&state.graph, now);

            let elapsed = now.saturating_sub(state.last_frame);
            if elapsed < interval {
                return Tick::Waiting;
            }

            if self
                .pulling
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                state.metrics.frames_skipped += 1;
                if let Some(prometheus) = &self.prometheus {
                    prometheus.record_skipped();
                }
                tracing::trace!("Frame still in flight; tick dropped");
                return Tick::Skipped;
            }

            state.last_frame = now - elapsed % interval;
        }

        let claim = FrameClaim(Arc::clone(self));
        Tick::Started(tokio::spawn(async move {
            let claim = claim;
            claim.0.run_frame().await
        }))
    }

    /// Execute one frame now.
    ///
    /// Returns a skipped result if another frame is in flight.
    pub async fn execute_frame(&self) -> FrameResults {
        let Some(_guard) = PullGuard::acquire(&self.pulling) else {
            let mut state = self.state.lock();
            state.metrics.frames_skipped += 1;
            if let Some(prometheus) = &self.prometheus {
                prometheus.record_skipped();
            }
            return FrameResults::skipped();
        };
        self.run_frame().await
    }

    #[instrument(skip_all, fields(frame = tracing::field::Empty))]
    async fn run_frame(&self) -> FrameResults {
        let started = self.clock.now();

        let (frame, plans, roots) = {
            let mut state = self.state.lock();
            let state = &mut *state;

            self.sync_from_store(state);
            if state.dirty.has_pending() {
                state.dirty.flush(&state.graph);
            }

            let order = state.graph.execution_order();
            let plans = if self.config.run_scopes {
                dirty_scope_plans(&state.graph)
            } else {
                Vec::new()
            };
            let roots = find_roots(&state.graph, &order);

            (state.metrics.frames_executed + 1, plans, roots)
        };
        tracing::Span::current().record("frame", frame);

        let mut scopes = HashMap::new();
        for plan in plans {
            let begin = plan.scope().begin.clone();
            match plan.execute().await {
                Ok(outcome) => {
                    scopes.insert(begin, outcome);
                }
                Err(error) => {
                    tracing::warn!(begin = %begin, error = %error, "For-loop scope failed");
                }
            }
        }

        let pulled: Vec<(OperatorId, Result<Value>)> = if self.config.parallel {
            join_all(roots.iter().map(|op| pull_root(op.as_ref()))).await
        } else {
            let mut pulled = Vec::with_capacity(roots.len());
            for op in &roots {
                pulled.push(pull_root(op.as_ref()).await);
            }
            pulled
        };

        let mut state = self.state.lock();
        let state = &mut *state;

        let mut outcomes = HashMap::with_capacity(pulled.len());
        let mut errors = 0;
        for (id, result) in pulled {
            let outcome = match result {
                Ok(value) => {
                    let changed = state.last_values.get(&id) != Some(&value);
                    state.last_values.insert(id.clone(), value.clone());
                    PullOutcome::success(value, changed)
                }
                Err(error) => {
                    tracing::warn!(operator_id = %id, error = %error, "Root pull failed");
                    errors += 1;
                    PullOutcome::failure(error)
                }
            };
            outcomes.insert(id, outcome);
        }

        let elapsed = self.clock.elapsed_since(started);
        let dirty_count = state.dirty.reconcile(&state.graph);
        let operator_count = state.graph.node_count();

        let metrics = &mut state.metrics;
        metrics.frame_time = elapsed;
        metrics.results = outcomes.len();
        metrics.dirty_count = dirty_count;
        metrics.operator_count = operator_count;
        metrics.frames_executed = frame;
        metrics.root_errors += errors as u64;
        metrics.last_frame_at = Some(self.clock.system_time_millis());

        if let Some(prometheus) = &self.prometheus {
            prometheus.record_frame(elapsed, errors, operator_count, dirty_count);
        }

        tracing::debug!(
            frame,
            roots = outcomes.len(),
            errors,
            scopes = scopes.len(),
            dirty = dirty_count,
            elapsed_us = elapsed.as_micros() as u64,
            "Frame executed"
        );

        FrameResults {
            frame,
            skipped: false,
            roots: outcomes,
            scopes,
            elapsed,
        }
    }

    /// Add operators that appeared in the store and evict vanished ones.
    fn sync_from_store(&self, state: &mut EngineState) {
        let live = self.store.all_operators();
        let live_ids: HashSet<OperatorId> = live.iter().map(|op| op.id().clone()).collect();

        let mut added = 0;
        for op in live {
            if !state.graph.contains(op.id()) {
                if op.is_dirty() {
                    state.dirty.record(op.id().clone());
                }
                added += 1;
            }
            state.graph.add_node(op);
        }

        let vanished: Vec<OperatorId> = state
            .graph
            .node_ids()
            .into_iter()
            .filter(|id| !live_ids.contains(id))
            .collect();
        for id in &vanished {
            state.graph.remove_node(id);
            state.dirty.forget(id);
            state.last_values.remove(id);
        }

        if added > 0 || !vanished.is_empty() {
            tracing::debug!(added, removed = vanished.len(), "Synced operators from store");
        }
    }
}

impl Drop for OperatorEngine {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.get_mut().take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for OperatorEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorEngine")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("pulling", &self.is_pulling())
            .finish()
    }
}

async fn pull_root(op: &dyn Operator) -> (OperatorId, Result<Value>) {
    let span = crate::instrument_operator!(op.id(), op.role().as_str());
    (op.id().clone(), op.pull().instrument(span).await)
}

/// Sinks by role, plus implicit sinks: no dependents but some dependency.
/// Operators left out of `order` (cycle members) are never roots.
fn find_roots(graph: &ExecutionGraph, order: &[OperatorId]) -> Vec<Arc<dyn Operator>> {
    order
        .iter()
        .filter_map(|id| graph.operator(id))
        .filter(|op| {
            op.role().is_sink() || (!graph.has_downstream(op.id()) && graph.has_upstream(op.id()))
        })
        .collect()
}

/// Plans for every outermost scope whose Begin or members are dirty.
/// Nested scopes run inside the plan of the loop containing them.
fn dirty_scope_plans(graph: &ExecutionGraph) -> Vec<ScopePlan> {
    let scopes = find_for_loop_scopes(graph);
    let nested: HashSet<&OperatorId> = scopes.iter().flat_map(|s| &s.members).collect();

    scopes
        .iter()
        .filter(|scope| !nested.contains(&scope.begin))
        .filter_map(|scope| match ScopePlan::new(graph, scope) {
            Ok(plan) => Some(plan),
            Err(error) => {
                tracing::warn!(begin = %scope.begin, error = %error, "Skipping invalid scope");
                None
            }
        })
        .filter(ScopePlan::is_dirty)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubOperator;
    use noodles_core::testing::MockClock;
    use noodles_core::traits::{MemoryStore, OperatorRole};

    fn id(s: &str) -> OperatorId {
        OperatorId::new(s)
    }

    fn engine_with(
        ops: Vec<Arc<StubOperator>>,
        config: EngineConfig,
    ) -> (Arc<OperatorEngine>, Arc<MockClock>) {
        let store = Arc::new(MemoryStore::new());
        for op in ops {
            store.insert(op);
        }
        let clock = Arc::new(MockClock::new());
        let engine = OperatorEngine::new(store, config).with_clock(clock.clone());
        (Arc::new(engine), clock)
    }

    #[test]
    fn tick_outside_a_runtime_releases_the_frame() {
        let (engine, clock) = engine_with(vec![StubOperator::sink("v")], EngineConfig::default());
        clock.advance(Duration::from_millis(20));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| engine.tick()));
        assert!(result.is_err());
        assert!(!engine.is_pulling());
    }

    #[tokio::test]
    async fn aborted_frame_releases_the_pulling_flag() {
        let (engine, clock) = engine_with(vec![StubOperator::sink("v")], EngineConfig::default());
        clock.advance(Duration::from_millis(20));

        let Tick::Started(handle) = engine.tick() else {
            panic!("frame should be due");
        };
        assert!(engine.is_pulling());
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
        assert!(!engine.is_pulling());
    }

    #[tokio::test]
    async fn frame_pulls_sinks_and_implicit_sinks() {
        let source = Arc::new(StubOperator::new("src", OperatorRole::Transform).with_value(1));
        let tail = Arc::new(StubOperator::new("tail", OperatorRole::Transform).with_value(2));
        let viewer = StubOperator::sink("viewer");
        let (engine, _) = engine_with(vec![source, tail, viewer], EngineConfig::default());

        engine.build_from_edges(&[Edge::between("src", "tail")]);
        let results = engine.execute_frame().await;

        assert!(results.get(&id("src")).is_none());
        assert_eq!(results.value(&id("tail")), Some(&Value::int(2)));
        assert!(results.get(&id("viewer")).is_some());
    }

    #[tokio::test]
    async fn changed_flag_tracks_previous_value() {
        let viewer = Arc::new(StubOperator::new("v", OperatorRole::Viewer).with_value(1));
        let (engine, _) = engine_with(vec![viewer.clone()], EngineConfig::default());

        assert!(engine.execute_frame().await.get(&id("v")).unwrap().changed);
        assert!(!engine.execute_frame().await.get(&id("v")).unwrap().changed);

        viewer.set_value(2);
        assert!(engine.execute_frame().await.get(&id("v")).unwrap().changed);
    }

    #[tokio::test]
    async fn tick_waits_for_frame_interval_and_carries_remainder() {
        let (engine, clock) = engine_with(vec![], EngineConfig::default().with_target_fps(50));

        clock.advance(Duration::from_millis(10));
        assert!(matches!(engine.tick(), Tick::Waiting));

        clock.advance(Duration::from_millis(15));
        let Tick::Started(handle) = engine.tick() else {
            panic!("frame should start after 25ms");
        };
        handle.await.unwrap();

        // 25ms elapsed against a 20ms interval: 5ms carried forward.
        clock.advance(Duration::from_millis(15));
        assert!(matches!(engine.tick(), Tick::Started(_)));
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let (engine, _) = engine_with(vec![], EngineConfig::default());
        engine.start();
        assert!(engine.is_running());
        engine.start();
        engine.stop();
        engine.stop();
        assert!(!engine.is_running());
    }
}
