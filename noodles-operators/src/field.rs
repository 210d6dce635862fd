//! Reactive operator fields.
//!
//! An [`OutputField`] is a shared cell: cloning it shares the value. An
//! [`InputField`] either holds a literal value or is connected to an
//! upstream operator's output cell, in which case reading it reads that
//! cell directly.

use noodles_core::traits::Operator;
use noodles_core::types::OperatorId;
use noodles_core::value::Value;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// A shared output cell.
#[derive(Debug, Clone, Default)]
pub struct OutputField {
    cell: Arc<RwLock<Value>>,
}

impl OutputField {
    /// Create a field holding `null`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value.
    pub fn get(&self) -> Value {
        self.cell.read().clone()
    }

    /// Replace the value.
    pub fn set(&self, value: Value) {
        *self.cell.write() = value;
    }

    /// Whether two handles share the same cell.
    pub fn same_cell(&self, other: &OutputField) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

/// Where an input reads its value from.
#[derive(Clone)]
pub enum InputSource {
    /// A value set directly on the input.
    Literal(Value),
    /// Another operator's output.
    Connected {
        /// The upstream operator's ID.
        source: OperatorId,
        /// The upstream output cell.
        field: OutputField,
        /// The upstream operator, for recursive pulls.
        ///
        /// Weak so that loop-carry wiring does not leak reference cycles.
        operator: Weak<dyn Operator>,
    },
}

impl std::fmt::Debug for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Connected { source, field, .. } => f
                .debug_struct("Connected")
                .field("source", source)
                .field("value", &field.get())
                .finish(),
        }
    }
}

/// An operator input.
#[derive(Debug)]
pub struct InputField {
    source: RwLock<InputSource>,
    /// Value restored when the input is disconnected.
    default: Value,
}

impl InputField {
    /// Create an input holding `default`.
    pub fn new(default: Value) -> Self {
        Self {
            source: RwLock::new(InputSource::Literal(default.clone())),
            default,
        }
    }

    /// Current value, read through the connection if there is one.
    pub fn value(&self) -> Value {
        match &*self.source.read() {
            InputSource::Literal(value) => value.clone(),
            InputSource::Connected { field, .. } => field.get(),
        }
    }

    /// Set a literal value, dropping any connection.
    pub fn set_literal(&self, value: Value) {
        *self.source.write() = InputSource::Literal(value);
    }

    /// Read from an upstream output.
    pub fn connect(&self, source: OperatorId, field: OutputField, operator: Weak<dyn Operator>) {
        *self.source.write() = InputSource::Connected {
            source,
            field,
            operator,
        };
    }

    /// Drop the connection and fall back to the default value.
    pub fn disconnect(&self) {
        self.set_literal(self.default.clone());
    }

    /// Whether the input is connected.
    pub fn is_connected(&self) -> bool {
        matches!(&*self.source.read(), InputSource::Connected { .. })
    }

    /// The connected upstream operator, if it is still alive.
    pub fn upstream(&self) -> Option<Arc<dyn Operator>> {
        match &*self.source.read() {
            InputSource::Connected { operator, .. } => operator.upgrade(),
            InputSource::Literal(_) => None,
        }
    }

    /// Snapshot of the source.
    pub fn source(&self) -> InputSource {
        self.source.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_clones_share_the_cell() {
        let out = OutputField::new();
        let shared = out.clone();
        out.set(Value::int(3));
        assert_eq!(shared.get(), Value::int(3));
        assert!(out.same_cell(&shared));
        assert!(!out.same_cell(&OutputField::new()));
    }

    #[test]
    fn input_falls_back_to_default_after_disconnect() {
        let input = InputField::new(Value::int(0));
        let upstream = OutputField::new();
        upstream.set(Value::int(7));

        let dangling: Weak<dyn Operator> = Weak::<crate::data::NumberOp>::new();
        input.connect(OperatorId::new("n"), upstream.clone(), dangling);
        assert!(input.is_connected());
        assert_eq!(input.value(), Value::int(7));
        assert!(input.upstream().is_none());

        upstream.set(Value::int(8));
        assert_eq!(input.value(), Value::int(8));

        input.disconnect();
        assert!(!input.is_connected());
        assert_eq!(input.value(), Value::int(0));
    }
}
