//! For-loop control operators.
//!
//! These operators carry no logic of their own. The scope executor writes
//! the current item and accumulator onto their outputs and reads the
//! per-iteration result back from their inputs.

use crate::base::{FieldOperator, OperatorCore, delegate_fields, pull_through};
use noodles_core::ports;
use noodles_core::traits::{
    ExecuteFuture, Inputs, Operator, OperatorInfo, OperatorRole, Outputs, PullFuture,
};
use noodles_core::types::OperatorId;
use noodles_core::value::Value;

/// Start of a for-loop scope.
///
/// # Ports
/// - Input: "data" - The collection to iterate
/// - Output: "d" - Current item
/// - Output: "index", "total" - Iteration position
#[derive(Debug)]
pub struct ForLoopBeginOp {
    core: OperatorCore,
}

impl ForLoopBeginOp {
    /// Create a Begin operator.
    pub fn new(id: impl Into<OperatorId>) -> Self {
        Self {
            core: OperatorCore::new(
                id,
                &[(ports::BEGIN_DATA, Value::null())],
                &[ports::BEGIN_ITEM, ports::INDEX, ports::TOTAL],
            ),
        }
    }
}

impl FieldOperator for ForLoopBeginOp {
    fn core(&self) -> &OperatorCore {
        &self.core
    }

    fn primary_output(&self) -> &'static str {
        ports::BEGIN_ITEM
    }
}

impl Operator for ForLoopBeginOp {
    delegate_fields!();

    fn info(&self) -> OperatorInfo {
        OperatorInfo::new("ForLoopBeginOp", OperatorRole::ForLoopBegin)
            .with_inputs([ports::BEGIN_DATA])
            .with_outputs([ports::BEGIN_ITEM, ports::INDEX, ports::TOTAL])
            .with_description("Starts a for-loop over a collection")
    }

    fn execute<'a>(&'a self, _inputs: Inputs) -> ExecuteFuture<'a> {
        Box::pin(async { Ok(Outputs::new()) })
    }

    /// Refreshes the input collection and returns the current item.
    fn pull<'a>(&'a self) -> PullFuture<'a> {
        Box::pin(pull_through(self))
    }
}

/// End of a for-loop scope.
///
/// # Ports
/// - Input: "item" - Per-iteration result
/// - Output: "data" - Results of every iteration
#[derive(Debug)]
pub struct ForLoopEndOp {
    core: OperatorCore,
}

impl ForLoopEndOp {
    /// Create an End operator.
    pub fn new(id: impl Into<OperatorId>) -> Self {
        Self {
            core: OperatorCore::new(
                id,
                &[(ports::END_ITEM, Value::null())],
                &[ports::END_DATA],
            ),
        }
    }

    /// Collected results published by the last scope run.
    pub fn results(&self) -> Value {
        self.core.output_value(ports::END_DATA).unwrap_or_default()
    }
}

impl FieldOperator for ForLoopEndOp {
    fn core(&self) -> &OperatorCore {
        &self.core
    }

    fn primary_output(&self) -> &'static str {
        ports::END_DATA
    }
}

impl Operator for ForLoopEndOp {
    delegate_fields!();

    fn info(&self) -> OperatorInfo {
        OperatorInfo::new("ForLoopEndOp", OperatorRole::ForLoopEnd)
            .with_inputs([ports::END_ITEM])
            .with_outputs([ports::END_DATA])
            .with_description("Collects per-iteration results")
    }

    fn execute<'a>(&'a self, _inputs: Inputs) -> ExecuteFuture<'a> {
        Box::pin(async { Ok(Outputs::new()) })
    }

    /// Returns the published results. Upstream operators belong to the
    /// loop body and are only driven by the scope executor.
    fn pull<'a>(&'a self) -> PullFuture<'a> {
        Box::pin(async move { Ok(self.results()) })
    }
}

/// Accumulator and position inside a for-loop scope.
///
/// # Ports
/// - Input: "initialValue" - Accumulator before the first iteration
/// - Input: "currentValue" - Accumulator for the next iteration
/// - Output: "accumulator", "index", "total", "isFirst", "isLast"
#[derive(Debug)]
pub struct ForLoopMetaOp {
    core: OperatorCore,
}

impl ForLoopMetaOp {
    /// Create a Meta operator with the given initial accumulator.
    pub fn new(id: impl Into<OperatorId>, initial_value: impl Into<Value>) -> Self {
        Self {
            core: OperatorCore::new(
                id,
                &[
                    (ports::META_INITIAL_VALUE, initial_value.into()),
                    (ports::META_CURRENT_VALUE, Value::null()),
                ],
                &[
                    ports::META_ACCUMULATOR,
                    ports::INDEX,
                    ports::TOTAL,
                    ports::META_IS_FIRST,
                    ports::META_IS_LAST,
                ],
            ),
        }
    }
}

impl FieldOperator for ForLoopMetaOp {
    fn core(&self) -> &OperatorCore {
        &self.core
    }

    fn primary_output(&self) -> &'static str {
        ports::META_ACCUMULATOR
    }
}

impl Operator for ForLoopMetaOp {
    delegate_fields!();

    fn info(&self) -> OperatorInfo {
        OperatorInfo::new("ForLoopMetaOp", OperatorRole::ForLoopMeta)
            .with_inputs([ports::META_INITIAL_VALUE, ports::META_CURRENT_VALUE])
            .with_outputs([
                ports::META_ACCUMULATOR,
                ports::INDEX,
                ports::TOTAL,
                ports::META_IS_FIRST,
                ports::META_IS_LAST,
            ])
            .with_description("Exposes the loop accumulator and position")
    }

    fn execute<'a>(&'a self, _inputs: Inputs) -> ExecuteFuture<'a> {
        Box::pin(async { Ok(Outputs::new()) })
    }

    /// Returns the published accumulator. `currentValue` is fed back from
    /// the loop body, so pulling through it would recurse.
    fn pull<'a>(&'a self) -> PullFuture<'a> {
        Box::pin(async move {
            Ok(self
                .core
                .output_value(ports::META_ACCUMULATOR)
                .unwrap_or_default())
        })
    }
}
