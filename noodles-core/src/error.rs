//! Error types for the noodles engine.
//!
//! Errors carry the identifiers needed to locate the problem (operator IDs,
//! cycle paths, port names). Every variant has a stable code printed as a
//! message prefix.

use crate::types::OperatorId;
use thiserror::Error;

/// The main error type for engine operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NoodlesError {
    // =========================================================================
    // Graph Shape Errors (E100-E199)
    // =========================================================================
    /// Adding an edge would close a cycle.
    ///
    /// This is a permanent rejection of that specific mutation; retrying with
    /// the same edge fails the same way.
    #[error("E101: Edge would create a cycle: {}", format_path(path))]
    Cycle {
        /// The offending cycle, in edge order.
        path: Vec<OperatorId>,
    },

    /// Operator is not registered with the execution graph.
    #[error("E102: Operator '{id}' not found in the execution graph")]
    UnknownOperator {
        /// The missing operator.
        id: OperatorId,
    },

    /// No edge connects the given operators.
    #[error("E103: No edge from '{source_id}' to '{target_id}'")]
    EdgeNotFound {
        /// Source operator.
        source_id: OperatorId,
        /// Target operator.
        target_id: OperatorId,
    },

    // =========================================================================
    // Operator Execution Errors (E200-E299)
    // =========================================================================
    /// An operator's `execute` or `pull` failed.
    #[error("E201: Operator '{operator_id}' failed: {cause}")]
    OperatorExecution {
        /// The failing operator.
        operator_id: OperatorId,
        /// Reason for the failure.
        cause: String,
    },

    /// An operator has no field with the given name.
    #[error("E202: Operator '{operator_id}' has no port '{port}'")]
    MissingPort {
        /// The operator that was queried.
        operator_id: OperatorId,
        /// The requested port name.
        port: String,
    },

    /// Value conversion or serialization failed.
    #[error("E203: Value error: {0}")]
    Value(String),

    // =========================================================================
    // Scope Errors (E300-E399)
    // =========================================================================
    /// A for-loop scope is malformed.
    #[error("E301: Invalid for-loop scope starting at '{begin}': {cause}")]
    ScopeInvalid {
        /// The scope's Begin operator.
        begin: OperatorId,
        /// What is wrong with the scope.
        cause: String,
    },

    // =========================================================================
    // Engine Errors (E400-E499)
    // =========================================================================
    /// The process-wide engine has not been initialized.
    #[error("E401: Engine not initialized; call registry::initialize first")]
    NotInitialized,

    /// Invalid configuration value.
    #[error("E402: Invalid configuration: {0}")]
    Config(String),
}

fn format_path(path: &[OperatorId]) -> String {
    path.iter()
        .map(OperatorId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl NoodlesError {
    /// Get the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Cycle { .. } => "E101",
            Self::UnknownOperator { .. } => "E102",
            Self::EdgeNotFound { .. } => "E103",
            Self::OperatorExecution { .. } => "E201",
            Self::MissingPort { .. } => "E202",
            Self::Value(_) => "E203",
            Self::ScopeInvalid { .. } => "E301",
            Self::NotInitialized => "E401",
            Self::Config(_) => "E402",
        }
    }

    /// Create an operator execution error.
    pub fn execution(operator_id: &OperatorId, cause: impl Into<String>) -> Self {
        Self::OperatorExecution {
            operator_id: operator_id.clone(),
            cause: cause.into(),
        }
    }

    /// Check if this error rejects a graph mutation.
    #[must_use]
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            Self::Cycle { .. } | Self::UnknownOperator { .. } | Self::EdgeNotFound { .. }
        )
    }

    /// The cycle path, if this is a cycle rejection.
    #[must_use]
    pub fn cycle_path(&self) -> Option<&[OperatorId]> {
        match self {
            Self::Cycle { path } => Some(path),
            _ => None,
        }
    }
}

/// Result type alias using `NoodlesError`.
pub type Result<T> = std::result::Result<T, NoodlesError>;

/// Extension trait for adding operator context to errors.
pub trait ResultExt<T> {
    /// Attribute an error to an operator.
    fn with_operator(self, operator_id: &OperatorId) -> Result<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn with_operator(self, operator_id: &OperatorId) -> Result<T> {
        self.map_err(|e| NoodlesError::execution(operator_id, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_correct() {
        let err = NoodlesError::Cycle {
            path: vec![OperatorId::new("/a")],
        };
        assert_eq!(err.code(), "E101");

        let err = NoodlesError::execution(&OperatorId::new("/b"), "boom");
        assert_eq!(err.code(), "E201");
        assert_eq!(NoodlesError::NotInitialized.code(), "E401");
    }

    #[test]
    fn cycle_display_lists_path() {
        let err = NoodlesError::Cycle {
            path: vec![
                OperatorId::new("/a"),
                OperatorId::new("/b"),
                OperatorId::new("/c"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("E101"));
        assert!(msg.contains("/a -> /b -> /c"));
        assert_eq!(err.cycle_path().map(<[_]>::len), Some(3));
    }

    #[test]
    fn with_operator_wraps_foreign_errors() {
        let parsed: std::result::Result<i32, _> = "nope".parse::<i32>();
        let err = parsed.with_operator(&OperatorId::new("/parse")).unwrap_err();
        assert!(matches!(err, NoodlesError::OperatorExecution { .. }));
        assert!(err.to_string().contains("/parse"));
    }

    #[test]
    fn graph_errors() {
        assert!(
            NoodlesError::UnknownOperator {
                id: OperatorId::new("/x")
            }
            .is_graph_error()
        );
        assert!(!NoodlesError::Config("bad".to_string()).is_graph_error());
    }
}
