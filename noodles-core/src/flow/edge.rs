//! Edge definition shared between the editor and the engine.

use crate::types::{EdgeId, OperatorId};
use serde::{Deserialize, Serialize};

/// How an edge participates in scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Ordinary dependency: the target depends on the source.
    #[default]
    Data,
    /// Declared feedback edge into a loop accumulator.
    ///
    /// Loop-carry edges are excluded from topological ordering, cycle checks
    /// and dirty propagation. The for-loop scope executor threads their values
    /// from one iteration to the next instead.
    LoopCarry,
}

/// A connection between two operator fields.
///
/// Multiple edges between the same pair of operators are legal as long as
/// they use different handles. Handle information is kept for the caller;
/// the execution graph only looks at `source`, `target` and `kind`.
///
/// # JSON format
/// ```json
/// {
///   "id": "e1",
///   "source": "/begin",
///   "target": "/add",
///   "sourceHandle": "out.d",
///   "targetHandle": "par.a"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Edge ID.
    pub id: EdgeId,
    /// Operator producing the value.
    pub source: OperatorId,
    /// Operator consuming the value.
    pub target: OperatorId,
    /// Output field on the source operator.
    #[serde(default)]
    pub source_handle: String,
    /// Input field on the target operator.
    #[serde(default)]
    pub target_handle: String,
    /// Scheduling kind.
    #[serde(default)]
    pub kind: EdgeKind,
}

impl Edge {
    /// Create a data edge with a random ID.
    pub fn new(
        source: impl Into<OperatorId>,
        source_handle: impl Into<String>,
        target: impl Into<OperatorId>,
        target_handle: impl Into<String>,
    ) -> Self {
        Self {
            id: EdgeId::random(),
            source: source.into(),
            target: target.into(),
            source_handle: source_handle.into(),
            target_handle: target_handle.into(),
            kind: EdgeKind::Data,
        }
    }

    /// Create a data edge that only records the operator pair.
    pub fn between(source: impl Into<OperatorId>, target: impl Into<OperatorId>) -> Self {
        Self::new(source, "out", target, "in")
    }

    /// Create a loop-carry edge feeding a loop accumulator.
    pub fn loop_carry(
        source: impl Into<OperatorId>,
        source_handle: impl Into<String>,
        target: impl Into<OperatorId>,
        target_handle: impl Into<String>,
    ) -> Self {
        Self::new(source, source_handle, target, target_handle).with_kind(EdgeKind::LoopCarry)
    }

    /// Set the edge ID.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = EdgeId::new(id);
        self
    }

    /// Set the scheduling kind.
    pub fn with_kind(mut self, kind: EdgeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether this is a declared loop-carry edge.
    #[must_use]
    pub fn is_loop_carry(&self) -> bool {
        self.kind == EdgeKind::LoopCarry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_editor_edge_json() {
        let json = r#"{
            "id": "e1",
            "source": "/begin",
            "target": "/add",
            "sourceHandle": "out.d",
            "targetHandle": "par.a"
        }"#;

        let edge: Edge = serde_json::from_str(json).unwrap();
        assert_eq!(edge.id.as_str(), "e1");
        assert_eq!(edge.source.as_str(), "/begin");
        assert_eq!(edge.target.as_str(), "/add");
        assert_eq!(edge.target_handle, "par.a");
        assert_eq!(edge.kind, EdgeKind::Data);
    }

    #[test]
    fn parse_loop_carry_kind() {
        let json = r#"{"id": "e2", "source": "/add", "target": "/meta", "kind": "loop_carry"}"#;
        let edge: Edge = serde_json::from_str(json).unwrap();
        assert!(edge.is_loop_carry());
        assert!(edge.source_handle.is_empty());
    }

    #[test]
    fn builder_methods() {
        let edge = Edge::between("/a", "/b").with_id("fixed");
        assert_eq!(edge.id.as_str(), "fixed");
        assert!(!edge.is_loop_carry());

        let carry = Edge::loop_carry("/add", "out", "/meta", "currentValue");
        assert!(carry.is_loop_carry());
    }
}
