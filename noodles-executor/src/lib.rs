//! Noodles Executor - Operator graph execution engine.
//!
//! This crate schedules and runs a graph of operators:
//! - Topological sorting with cycle detection and dependency levels
//! - Validated graph mutation (edges that would close a cycle are rejected)
//! - Dirty propagation, immediate or batched
//! - A frame-paced, pull-based execution loop with re-entrancy protection
//! - For-loop scope execution with accumulator threading
//! - An optional process-wide engine registry

#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod metrics;
pub mod observability;
pub mod registry;
pub mod scheduler;
pub mod testing;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::{FrameResults, OperatorEngine, PullOutcome, Tick};
    pub use crate::metrics::{EngineMetrics, GraphStats, PerformanceMetrics};
    pub use crate::observability::{LogFormat, TracingConfig, init_tracing};
    pub use crate::scheduler::{
        DirtyTracker, ExecutionGraph, ForLoopScope, ScopeError, ScopeOutcome, ScopePlan,
        SortOutcome, compute_levels, find_for_loop_scopes, topological_sort,
    };
}
