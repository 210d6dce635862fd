//! Field names used by the for-loop control operators.
//!
//! The scope executor injects iteration state through these fields, so loop
//! operators and the executor must agree on them.

/// Input collection iterated by a `ForLoopBegin` operator.
pub const BEGIN_DATA: &str = "data";
/// Current item published by `ForLoopBegin`.
pub const BEGIN_ITEM: &str = "d";
/// Current iteration index.
pub const INDEX: &str = "index";
/// Total number of iterations.
pub const TOTAL: &str = "total";

/// Per-iteration result read from a `ForLoopEnd` operator.
pub const END_ITEM: &str = "item";
/// Collected results published by `ForLoopEnd` after the loop.
pub const END_DATA: &str = "data";

/// Initial accumulator configured on a `ForLoopMeta` operator.
pub const META_INITIAL_VALUE: &str = "initialValue";
/// Accumulator value fed back from the loop body.
pub const META_CURRENT_VALUE: &str = "currentValue";
/// Accumulator published to the loop body.
pub const META_ACCUMULATOR: &str = "accumulator";
/// True on the first iteration.
pub const META_IS_FIRST: &str = "isFirst";
/// True on the last iteration.
pub const META_IS_LAST: &str = "isLast";
