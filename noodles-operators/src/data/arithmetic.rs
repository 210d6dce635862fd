//! Binary arithmetic operators.

use crate::base::{FieldOperator, OperatorCore, delegate_fields, pull_through};
use noodles_core::error::{NoodlesError, ResultExt};
use noodles_core::traits::{
    ExecuteFuture, Inputs, Operator, OperatorInfo, OperatorRole, Outputs, PullFuture,
};
use noodles_core::types::OperatorId;
use noodles_core::value::Value;

/// Arithmetic operation applied to inputs `a` and `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOperation {
    /// `a + b`
    Add,
    /// `a * b`
    Multiply,
}

impl ArithmeticOperation {
    fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Multiply => a * b,
        }
    }

    /// Value that leaves the other operand unchanged.
    fn identity(&self) -> Value {
        match self {
            Self::Add => Value::int(0),
            Self::Multiply => Value::int(1),
        }
    }
}

/// Shared implementation of the binary operators.
#[derive(Debug)]
struct Binary {
    core: OperatorCore,
    operation: ArithmeticOperation,
}

impl Binary {
    fn new(id: impl Into<OperatorId>, operation: ArithmeticOperation) -> Self {
        let identity = operation.identity();
        Self {
            core: OperatorCore::new(
                id,
                &[("a", identity.clone()), ("b", identity)],
                &["out"],
            ),
            operation,
        }
    }

    fn compute(&self, inputs: &Inputs) -> noodles_core::error::Result<Value> {
        let operand = |name: &str| {
            let value = inputs.get(name).cloned().unwrap_or_default();
            if value.is_null() {
                return Ok(0.0);
            }
            value
                .as_f64()
                .ok_or_else(|| {
                    NoodlesError::Value(format!("input '{}' is not a number: {}", name, value))
                })
                .with_operator(self.core.id())
        };
        Ok(Value::number(self.operation.apply(operand("a")?, operand("b")?)))
    }
}

macro_rules! binary_operator {
    ($(#[$doc:meta])* $name:ident, $operation:expr, $description:literal) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name {
            inner: Binary,
        }

        impl $name {
            /// Create the operator with identity defaults for both inputs.
            pub fn new(id: impl Into<OperatorId>) -> Self {
                Self {
                    inner: Binary::new(id, $operation),
                }
            }

            /// Set both inputs to literal values.
            pub fn with_operands(self, a: impl Into<Value>, b: impl Into<Value>) -> Self {
                if let (Ok(ia), Ok(ib)) = (self.inner.core.input("a"), self.inner.core.input("b")) {
                    ia.set_literal(a.into());
                    ib.set_literal(b.into());
                }
                self
            }
        }

        impl FieldOperator for $name {
            fn core(&self) -> &OperatorCore {
                &self.inner.core
            }
        }

        impl Operator for $name {
            fn id(&self) -> &OperatorId {
                self.inner.core.id()
            }

            fn info(&self) -> OperatorInfo {
                OperatorInfo::new(stringify!($name), OperatorRole::Transform)
                    .with_inputs(["a", "b"])
                    .with_outputs(["out"])
                    .with_description($description)
            }

            fn is_dirty(&self) -> bool {
                self.inner.core.is_dirty()
            }

            fn set_dirty(&self, dirty: bool) {
                self.inner.core.set_dirty(dirty);
            }

            fn input_value(&self, name: &str) -> Option<Value> {
                self.inner.core.input_value(name)
            }

            fn output_value(&self, name: &str) -> Option<Value> {
                self.inner.core.output_value(name)
            }

            fn set_output(&self, name: &str, value: Value) -> noodles_core::error::Result<()> {
                self.inner.core.set_output(name, value)
            }

            fn read_inputs(&self) -> Inputs {
                self.inner.core.read_inputs()
            }

            fn execute<'a>(&'a self, inputs: Inputs) -> ExecuteFuture<'a> {
                Box::pin(async move {
                    let out = self.inner.compute(&inputs)?;
                    Ok(Outputs::from([("out".to_string(), out)]))
                })
            }

            fn pull<'a>(&'a self) -> PullFuture<'a> {
                Box::pin(pull_through(self))
            }
        }
    };
}

binary_operator!(
    /// Adds inputs `a` and `b`. Null inputs count as zero.
    ///
    /// # Ports
    /// - Input: "a", "b" - Operands
    /// - Output: "out" - The sum
    AddOp,
    ArithmeticOperation::Add,
    "Adds two numbers"
);

binary_operator!(
    /// Multiplies inputs `a` and `b`. Null inputs count as zero.
    ///
    /// # Ports
    /// - Input: "a", "b" - Operands
    /// - Output: "out" - The product
    MultiplyOp,
    ArithmeticOperation::Multiply,
    "Multiplies two numbers"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_and_multiply() {
        let add = AddOp::new("/add").with_operands(2, 3);
        assert_eq!(add.pull().await.unwrap(), Value::int(5));

        let mul = MultiplyOp::new("/mul").with_operands(2.5, 4);
        assert_eq!(mul.pull().await.unwrap(), Value::int(10));
    }

    #[tokio::test]
    async fn defaults_are_identities() {
        let mul = MultiplyOp::new("/mul");
        assert_eq!(mul.input_value("a"), Some(Value::int(1)));
        assert_eq!(mul.pull().await.unwrap(), Value::int(1));
    }

    #[tokio::test]
    async fn non_numeric_input_fails() {
        let add = AddOp::new("/add").with_operands("abc", 1);
        let err = add.pull().await.unwrap_err();
        assert_eq!(err.code(), "E201");
        let NoodlesError::OperatorExecution { operator_id, cause } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(operator_id.as_str(), "/add");
        assert!(cause.contains("E203"));
        assert!(cause.contains("input 'a'"));
        assert!(add.is_dirty());
    }
}
