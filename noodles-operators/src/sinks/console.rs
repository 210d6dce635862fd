//! Console sink.

use crate::base::{FieldOperator, OperatorCore, delegate_fields, pull_through};
use noodles_core::traits::{
    ExecuteFuture, Inputs, Operator, OperatorInfo, OperatorRole, Outputs, PullFuture,
};
use noodles_core::types::OperatorId;
use noodles_core::value::Value;

/// Logs every new input value.
///
/// # Ports
/// - Input: "in" - Value to log
/// - Output: "out" - The same value
#[derive(Debug)]
pub struct ConsoleOp {
    core: OperatorCore,
}

impl ConsoleOp {
    /// Create a console sink.
    pub fn new(id: impl Into<OperatorId>) -> Self {
        Self {
            core: OperatorCore::new(id, &[("in", Value::null())], &["out"]),
        }
    }
}

impl FieldOperator for ConsoleOp {
    fn core(&self) -> &OperatorCore {
        &self.core
    }
}

impl Operator for ConsoleOp {
    delegate_fields!();

    fn info(&self) -> OperatorInfo {
        OperatorInfo::new("ConsoleOp", OperatorRole::Console)
            .with_inputs(["in"])
            .with_outputs(["out"])
            .with_description("Logs the incoming value")
    }

    fn execute<'a>(&'a self, inputs: Inputs) -> ExecuteFuture<'a> {
        Box::pin(async move {
            let value = inputs.get("in").cloned().unwrap_or_default();
            tracing::info!(operator_id = %self.core.id(), value = %value, "console");
            Ok(Outputs::from([("out".to_string(), value)]))
        })
    }

    fn pull<'a>(&'a self) -> PullFuture<'a> {
        Box::pin(pull_through(self))
    }
}
