//! Output, viewer and renderer sinks.

use crate::base::{FieldOperator, OperatorCore, delegate_fields, pull_through};
use noodles_core::traits::{
    ExecuteFuture, Inputs, Operator, OperatorInfo, OperatorRole, Outputs, PullFuture,
};
use noodles_core::types::OperatorId;
use noodles_core::value::Value;
use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! display_sink {
    ($(#[$doc:meta])* $name:ident, $role:expr, $description:literal) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name {
            core: OperatorCore,
            renders: AtomicU64,
        }

        impl $name {
            /// Create the sink.
            pub fn new(id: impl Into<OperatorId>) -> Self {
                Self {
                    core: OperatorCore::new(id, &[("in", Value::null())], &["out"]),
                    renders: AtomicU64::new(0),
                }
            }

            /// Times the sink recomputed its output.
            pub fn render_count(&self) -> u64 {
                self.renders.load(Ordering::SeqCst)
            }

            /// Last value received.
            pub fn last_value(&self) -> Value {
                self.core.output_value("out").unwrap_or_default()
            }
        }

        impl FieldOperator for $name {
            fn core(&self) -> &OperatorCore {
                &self.core
            }
        }

        impl Operator for $name {
            delegate_fields!();

            fn info(&self) -> OperatorInfo {
                OperatorInfo::new(stringify!($name), $role)
                    .with_inputs(["in"])
                    .with_outputs(["out"])
                    .with_description($description)
            }

            fn execute<'a>(&'a self, inputs: Inputs) -> ExecuteFuture<'a> {
                Box::pin(async move {
                    self.renders.fetch_add(1, Ordering::SeqCst);
                    let value = inputs.get("in").cloned().unwrap_or_default();
                    Ok(Outputs::from([("out".to_string(), value)]))
                })
            }

            fn pull<'a>(&'a self) -> PullFuture<'a> {
                Box::pin(pull_through(self))
            }
        }
    };
}

display_sink!(
    /// Generic graph output.
    OutputOp,
    OperatorRole::Output,
    "Exposes a value as a graph output"
);

display_sink!(
    /// Inspection sink used by the editor's value preview.
    ViewerOp,
    OperatorRole::Viewer,
    "Shows the incoming value"
);

display_sink!(
    /// Final renderer of a visualization.
    RendererOp,
    OperatorRole::Renderer,
    "Renders the incoming layers"
);
