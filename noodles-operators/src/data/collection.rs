//! Collection operator (constant list).

use crate::base::{FieldOperator, OperatorCore, delegate_fields, pull_through};
use noodles_core::traits::{
    ExecuteFuture, Inputs, Operator, OperatorInfo, OperatorRole, Outputs, PullFuture,
};
use noodles_core::types::OperatorId;
use noodles_core::value::Value;

/// Emits a list of values on `out`.
///
/// # Ports
/// - Input: "items" - The list
/// - Output: "out" - The same list
#[derive(Debug)]
pub struct CollectionOp {
    core: OperatorCore,
}

impl CollectionOp {
    /// Create a collection operator.
    pub fn new<I, V>(id: impl Into<OperatorId>, items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let items = Value::array(items.into_iter().map(Into::into));
        Self {
            core: OperatorCore::new(id, &[("items", items)], &["out"]),
        }
    }

    /// Replace the list. The caller marks the operator dirty.
    pub fn set_items<I, V>(&self, items: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        if let Ok(input) = self.core.input("items") {
            input.set_literal(Value::array(items.into_iter().map(Into::into)));
        }
    }
}

impl FieldOperator for CollectionOp {
    fn core(&self) -> &OperatorCore {
        &self.core
    }
}

impl Operator for CollectionOp {
    delegate_fields!();

    fn info(&self) -> OperatorInfo {
        OperatorInfo::new("CollectionOp", OperatorRole::Transform)
            .with_inputs(["items"])
            .with_outputs(["out"])
            .with_description("Emits a constant list")
    }

    fn execute<'a>(&'a self, inputs: Inputs) -> ExecuteFuture<'a> {
        Box::pin(async move {
            let items = inputs
                .get("items")
                .cloned()
                .unwrap_or_else(|| Value::array(Vec::new()));
            Ok(Outputs::from([("out".to_string(), items)]))
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
    async fn emits_items() {
        let op = CollectionOp::new("/list", [1, 2, 3]);
        let out = op.pull().await.unwrap();
        assert_eq!(out.as_array().map(|a| a.len()), Some(3));
    }
}
