//! Operator trait and related types.

use crate::error::Result;
use crate::types::OperatorId;
use crate::value::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Named input values handed to [`Operator::execute`].
pub type Inputs = HashMap<String, Value>;

/// Named output values produced by [`Operator::execute`].
pub type Outputs = HashMap<String, Value>;

/// A boxed future for async operator execution.
pub type ExecuteFuture<'a> = Pin<Box<dyn Future<Output = Result<Outputs>> + Send + 'a>>;

/// A boxed future for pulling an operator's primary value.
pub type PullFuture<'a> = Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>>;

/// The role an operator plays for the engine.
///
/// Roles replace type-name inspection: the engine decides whether an operator
/// is a sink or a loop control point by asking for its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OperatorRole {
    /// Ordinary computation.
    #[default]
    Transform,
    /// Final renderer (the map/canvas output).
    Renderer,
    /// Generic output sink.
    Output,
    /// Inspection sink shown in the editor.
    Viewer,
    /// Logging sink.
    Console,
    /// Start of a for-loop scope; publishes the current item.
    ForLoopBegin,
    /// End of a for-loop scope; collects per-iteration results.
    ForLoopEnd,
    /// Optional accumulator/metadata point inside a for-loop scope.
    ForLoopMeta,
}

impl OperatorRole {
    /// Whether the role is one of the recognized terminal sinks.
    #[must_use]
    pub fn is_sink(&self) -> bool {
        matches!(
            self,
            Self::Renderer | Self::Output | Self::Viewer | Self::Console
        )
    }

    /// Whether the role is driven by the for-loop scope executor.
    #[must_use]
    pub fn is_loop_control(&self) -> bool {
        matches!(
            self,
            Self::ForLoopBegin | Self::ForLoopEnd | Self::ForLoopMeta
        )
    }

    /// Short display name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::Renderer => "renderer",
            Self::Output => "output",
            Self::Viewer => "viewer",
            Self::Console => "console",
            Self::ForLoopBegin => "for_loop_begin",
            Self::ForLoopEnd => "for_loop_end",
            Self::ForLoopMeta => "for_loop_meta",
        }
    }
}

/// Metadata about an operator type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorInfo {
    /// Type name (e.g., "AddOp", "ViewerOp").
    pub kind: String,
    /// Engine role.
    pub role: OperatorRole,
    /// Input field names.
    pub inputs: Vec<String>,
    /// Output field names.
    pub outputs: Vec<String>,
    /// Description of what the operator does.
    pub description: String,
}

impl OperatorInfo {
    /// Create new operator info.
    pub fn new(kind: impl Into<String>, role: OperatorRole) -> Self {
        Self {
            kind: kind.into(),
            role,
            inputs: Vec::new(),
            outputs: Vec::new(),
            description: String::new(),
        }
    }

    /// Set the input field names.
    pub fn with_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    /// Set the output field names.
    pub fn with_outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }
}

/// The interface the engine consumes from every operator.
///
/// Operators live in an external store; the engine only holds shared
/// references. All methods take `&self`, so implementations keep their
/// field values and dirty flag behind interior mutability.
///
/// # Example
///
/// ```ignore
/// impl Operator for DoubleOp {
///     fn id(&self) -> &OperatorId { &self.id }
///
///     fn info(&self) -> OperatorInfo {
///         OperatorInfo::new("DoubleOp", OperatorRole::Transform)
///             .with_inputs(["value"])
///             .with_outputs(["out"])
///     }
///
///     fn execute<'a>(&'a self, inputs: Inputs) -> ExecuteFuture<'a> {
///         Box::pin(async move {
///             let v = inputs.get("value").and_then(Value::as_f64).unwrap_or(0.0);
///             Ok(Outputs::from([("out".to_string(), Value::number(v * 2.0))]))
///         })
///     }
///     // ...
/// }
/// ```
pub trait Operator: Send + Sync {
    /// Unique operator ID.
    fn id(&self) -> &OperatorId;

    /// Get metadata about this operator.
    fn info(&self) -> OperatorInfo;

    /// Engine role. Defaults to the role reported by [`Operator::info`].
    fn role(&self) -> OperatorRole {
        self.info().role
    }

    /// Whether the operator's outputs are stale.
    fn is_dirty(&self) -> bool;

    /// Set the stale flag.
    fn set_dirty(&self, dirty: bool);

    /// Current value of an input field (resolving connections).
    fn input_value(&self, name: &str) -> Option<Value>;

    /// Current value of an output field.
    fn output_value(&self, name: &str) -> Option<Value>;

    /// Publish a value onto an output field.
    fn set_output(&self, name: &str, value: Value) -> Result<()>;

    /// Snapshot of all input values.
    fn read_inputs(&self) -> Inputs;

    /// Compute outputs from the given inputs.
    fn execute<'a>(&'a self, inputs: Inputs) -> ExecuteFuture<'a>;

    /// Demand this operator's primary value, recomputing upstream as needed.
    fn pull<'a>(&'a self) -> PullFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_roles() {
        assert!(OperatorRole::Renderer.is_sink());
        assert!(OperatorRole::Output.is_sink());
        assert!(OperatorRole::Viewer.is_sink());
        assert!(OperatorRole::Console.is_sink());
        assert!(!OperatorRole::Transform.is_sink());
        assert!(!OperatorRole::ForLoopEnd.is_sink());
    }

    #[test]
    fn loop_control_roles() {
        assert!(OperatorRole::ForLoopBegin.is_loop_control());
        assert!(OperatorRole::ForLoopMeta.is_loop_control());
        assert!(!OperatorRole::Viewer.is_loop_control());
    }

    #[test]
    fn operator_info_creation() {
        let info = OperatorInfo::new("AddOp", OperatorRole::Transform)
            .with_inputs(["a", "b"])
            .with_outputs(["out"])
            .with_description("Adds two numbers");

        assert_eq!(info.kind, "AddOp");
        assert_eq!(info.inputs, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(info.outputs.len(), 1);
    }
}
