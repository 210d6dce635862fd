//! Scheduling primitives for the operator graph.
//!
//! This module provides the building blocks the engine composes:
//! - [`topological_sort`] / [`compute_levels`] - Pure ordering functions
//! - [`ExecutionGraph`] - Operator arena with a validated mutation API
//! - [`DirtyTracker`] - Dirty propagation, immediate or batched
//! - [`find_for_loop_scopes`] / [`ScopePlan`] - For-loop scope discovery and execution

mod dirty;
mod graph;
mod scope;
mod sort;

pub use dirty::DirtyTracker;
pub use graph::{EdgeLink, ExecutionGraph, NodeIndex};
pub use scope::{
    ForLoopScope, ScopeError, ScopeOutcome, ScopePlan, find_for_loop_scopes,
};
pub use sort::{SortOutcome, compute_levels, topological_sort};
