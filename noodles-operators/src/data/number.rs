//! Number operator (constant source).

use crate::base::{FieldOperator, OperatorCore, delegate_fields, pull_through};
use noodles_core::traits::{
    ExecuteFuture, Inputs, Operator, OperatorInfo, OperatorRole, Outputs, PullFuture,
};
use noodles_core::types::OperatorId;
use noodles_core::value::Value;

/// Emits its `value` input on `out`.
///
/// # Ports
/// - Input: "value" - The number to emit
/// - Output: "out" - The same number
#[derive(Debug)]
pub struct NumberOp {
    core: OperatorCore,
}

impl NumberOp {
    /// Create a number operator.
    pub fn new(id: impl Into<OperatorId>, value: impl Into<Value>) -> Self {
        Self {
            core: OperatorCore::new(id, &[("value", value.into())], &["out"]),
        }
    }

    /// Change the emitted value. The caller marks the operator dirty.
    pub fn set_value(&self, value: impl Into<Value>) {
        if let Ok(input) = self.core.input("value") {
            input.set_literal(value.into());
        }
    }
}

impl FieldOperator for NumberOp {
    fn core(&self) -> &OperatorCore {
        &self.core
    }
}

impl Operator for NumberOp {
    delegate_fields!();

    fn info(&self) -> OperatorInfo {
        OperatorInfo::new("NumberOp", OperatorRole::Transform)
            .with_inputs(["value"])
            .with_outputs(["out"])
            .with_description("Emits a constant number")
    }

    fn execute<'a>(&'a self, inputs: Inputs) -> ExecuteFuture<'a> {
        Box::pin(async move {
            let value = inputs.get("value").cloned().unwrap_or_default();
            Ok(Outputs::from([("out".to_string(), value)]))
        })
    }

    fn pull<'a>(&'a self) -> PullFuture<'a> {
        Box::pin(pull_through(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pull_emits_value_and_clears_dirty() {
        let op = NumberOp::new("/n", 4);
        assert!(op.is_dirty());
        assert_eq!(op.pull().await.unwrap(), Value::int(4));
        assert!(!op.is_dirty());
    }

    #[tokio::test]
    async fn clean_operator_keeps_published_value() {
        let op = NumberOp::new("/n", 4);
        op.pull().await.unwrap();

        op.set_value(9);
        assert_eq!(op.pull().await.unwrap(), Value::int(4));

        op.set_dirty(true);
        assert_eq!(op.pull().await.unwrap(), Value::int(9));
    }
}
