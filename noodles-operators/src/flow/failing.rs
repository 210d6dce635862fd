//! Operator that always fails.

use crate::base::{FieldOperator, OperatorCore, delegate_fields, pull_through};
use noodles_core::error::NoodlesError;
use noodles_core::traits::{
    ExecuteFuture, Inputs, Operator, OperatorInfo, OperatorRole, PullFuture,
};
use noodles_core::types::OperatorId;
use noodles_core::value::Value;

/// Fails every execution with a fixed message. Stays dirty, so every pull
/// retries and fails again.
///
/// Useful for exercising error isolation in hosts and tests.
#[derive(Debug)]
pub struct FailingOp {
    core: OperatorCore,
    role: OperatorRole,
    message: String,
}

impl FailingOp {
    /// Create a failing transform.
    pub fn new(id: impl Into<OperatorId>, message: impl Into<String>) -> Self {
        Self {
            core: OperatorCore::new(id, &[("in", Value::null())], &["out"]),
            role: OperatorRole::Transform,
            message: message.into(),
        }
    }

    /// Report a different role (e.g. a sink, to fail as a frame root).
    pub fn with_role(mut self, role: OperatorRole) -> Self {
        self.role = role;
        self
    }
}

impl FieldOperator for FailingOp {
    fn core(&self) -> &OperatorCore {
        &self.core
    }
}

impl Operator for FailingOp {
    delegate_fields!();

    fn info(&self) -> OperatorInfo {
        OperatorInfo::new("FailingOp", self.role)
            .with_inputs(["in"])
            .with_outputs(["out"])
            .with_description("Always fails")
    }

    fn role(&self) -> OperatorRole {
        self.role
    }

    fn execute<'a>(&'a self, _inputs: Inputs) -> ExecuteFuture<'a> {
        Box::pin(async move { Err(NoodlesError::execution(self.core.id(), &self.message)) })
    }

    fn pull<'a>(&'a self) -> PullFuture<'a> {
        Box::pin(pull_through(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_pull_fails() {
        let op = FailingOp::new("/bad", "boom").with_role(OperatorRole::Output);
        assert!(op.role().is_sink());

        for _ in 0..2 {
            let err = op.pull().await.unwrap_err();
            assert!(err.to_string().contains("boom"));
            assert!(op.is_dirty());
        }
    }
}
