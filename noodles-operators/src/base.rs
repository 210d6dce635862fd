//! Shared operator state and the recursive pull.

use crate::field::{InputField, OutputField};
use noodles_core::error::{NoodlesError, Result};
use noodles_core::traits::{Inputs, Operator, Outputs};
use noodles_core::types::OperatorId;
use noodles_core::value::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// State every built-in operator carries: identity, dirty flag and fields.
///
/// Operators start dirty so their first pull computes.
#[derive(Debug)]
pub struct OperatorCore {
    id: OperatorId,
    dirty: AtomicBool,
    inputs: BTreeMap<String, InputField>,
    outputs: BTreeMap<String, OutputField>,
}

impl OperatorCore {
    /// Create a core with the given inputs (name and default) and outputs.
    pub fn new(id: impl Into<OperatorId>, inputs: &[(&str, Value)], outputs: &[&str]) -> Self {
        Self {
            id: id.into(),
            dirty: AtomicBool::new(true),
            inputs: inputs
                .iter()
                .map(|(name, default)| (name.to_string(), InputField::new(default.clone())))
                .collect(),
            outputs: outputs
                .iter()
                .map(|name| (name.to_string(), OutputField::new()))
                .collect(),
        }
    }

    /// Operator ID.
    pub fn id(&self) -> &OperatorId {
        &self.id
    }

    /// Whether outputs are stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Set the stale flag.
    pub fn set_dirty(&self, dirty: bool) {
        self.dirty.store(dirty, Ordering::SeqCst);
    }

    /// Look up an input field.
    pub fn input(&self, name: &str) -> Result<&InputField> {
        self.inputs.get(name).ok_or_else(|| self.missing(name))
    }

    /// Look up an output field.
    pub fn output(&self, name: &str) -> Result<&OutputField> {
        self.outputs.get(name).ok_or_else(|| self.missing(name))
    }

    /// Input names in order.
    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.keys().map(String::as_str)
    }

    /// Output names in order.
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }

    /// Current value of an input.
    pub fn input_value(&self, name: &str) -> Option<Value> {
        self.inputs.get(name).map(InputField::value)
    }

    /// Current value of an output.
    pub fn output_value(&self, name: &str) -> Option<Value> {
        self.outputs.get(name).map(OutputField::get)
    }

    /// Publish a value onto an output.
    pub fn set_output(&self, name: &str, value: Value) -> Result<()> {
        self.output(name)?.set(value);
        Ok(())
    }

    /// Set an input to a literal value.
    pub fn set_input(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.input(name)?.set_literal(value.into());
        Ok(())
    }

    /// Snapshot of every input value.
    pub fn read_inputs(&self) -> Inputs {
        self.inputs
            .iter()
            .map(|(name, field)| (name.clone(), field.value()))
            .collect()
    }

    /// Publish every computed output.
    pub fn publish(&self, outputs: Outputs) -> Result<()> {
        for (name, value) in outputs {
            self.set_output(&name, value)?;
        }
        Ok(())
    }

    /// Live upstream operators, one entry per operator.
    pub fn upstream(&self) -> Vec<Arc<dyn Operator>> {
        let mut seen = HashSet::new();
        self.inputs
            .values()
            .filter_map(InputField::upstream)
            .filter(|op| seen.insert(op.id().clone()))
            .collect()
    }

    fn missing(&self, port: &str) -> NoodlesError {
        NoodlesError::MissingPort {
            operator_id: self.id.clone(),
            port: port.to_string(),
        }
    }
}

/// Operators built on [`OperatorCore`].
pub trait FieldOperator: Operator {
    /// The operator's shared state.
    fn core(&self) -> &OperatorCore;

    /// Output returned by `pull`.
    fn primary_output(&self) -> &'static str {
        "out"
    }
}

/// Pull every connected upstream operator, recompute if dirty, and return
/// the primary output.
///
/// An upstream failure aborts the pull and leaves this operator dirty.
pub async fn pull_through<O: FieldOperator + ?Sized>(op: &O) -> Result<Value> {
    let core = op.core();
    for upstream in core.upstream() {
        upstream.pull().await?;
    }

    if core.is_dirty() {
        let outputs = op.execute(core.read_inputs()).await?;
        core.publish(outputs)?;
        core.set_dirty(false);
    }

    Ok(core.output_value(op.primary_output()).unwrap_or_default())
}

/// Implements the field-backed [`Operator`] methods by delegating to
/// [`OperatorCore`].
macro_rules! delegate_fields {
    () => {
        fn id(&self) -> &noodles_core::types::OperatorId {
            self.core.id()
        }

        fn is_dirty(&self) -> bool {
            self.core.is_dirty()
        }

        fn set_dirty(&self, dirty: bool) {
            self.core.set_dirty(dirty);
        }

        fn input_value(&self, name: &str) -> Option<noodles_core::value::Value> {
            self.core.input_value(name)
        }

        fn output_value(&self, name: &str) -> Option<noodles_core::value::Value> {
            self.core.output_value(name)
        }

        fn set_output(
            &self,
            name: &str,
            value: noodles_core::value::Value,
        ) -> noodles_core::error::Result<()> {
            self.core.set_output(name, value)
        }

        fn read_inputs(&self) -> noodles_core::traits::Inputs {
            self.core.read_inputs()
        }
    };
}

pub(crate) use delegate_fields;
