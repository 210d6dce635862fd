//! Built-in operators for the noodles engine.
//!
//! Operators keep their values in reactive fields (see [`field`]): inputs
//! either hold a literal or read an upstream output cell directly, and
//! `pull` recursively pulls connected upstream operators before
//! recomputing.
//!
//! ## Data (`data::*`)
//! - [`data::NumberOp`] - Constant number
//! - [`data::CollectionOp`] - Constant list
//! - [`data::AddOp`], [`data::MultiplyOp`] - Binary arithmetic
//!
//! ## Sinks (`sinks::*`)
//! - [`sinks::OutputOp`], [`sinks::ViewerOp`], [`sinks::RendererOp`] - Display sinks
//! - [`sinks::ConsoleOp`] - Logs incoming values
//!
//! ## Flow Control (`flow::*`)
//! - [`flow::ForLoopBeginOp`], [`flow::ForLoopEndOp`], [`flow::ForLoopMetaOp`] - For-loop scopes
//! - [`flow::FailingOp`] - Always fails

#![warn(missing_docs)]

pub mod base;
pub mod data;
pub mod field;
pub mod flow;
pub mod sinks;
pub mod wiring;

pub use base::{FieldOperator, OperatorCore, pull_through};
pub use data::{AddOp, ArithmeticOperation, CollectionOp, MultiplyOp, NumberOp};
pub use field::{InputField, InputSource, OutputField};
pub use flow::{FailingOp, ForLoopBeginOp, ForLoopEndOp, ForLoopMetaOp};
pub use sinks::{ConsoleOp, OutputOp, RendererOp, ViewerOp};
pub use wiring::{connect, connect_loop};

/// Prelude for commonly used types.
pub mod prelude {
    pub use crate::base::{FieldOperator, OperatorCore};
    pub use crate::data::{AddOp, CollectionOp, MultiplyOp, NumberOp};
    pub use crate::flow::{FailingOp, ForLoopBeginOp, ForLoopEndOp, ForLoopMetaOp};
    pub use crate::sinks::{ConsoleOp, OutputOp, RendererOp, ViewerOp};
    pub use crate::wiring::{connect, connect_loop};
}
