//! Core traits consumed by the engine.
//!
//! - `Operator`: An opaque computational node with named inputs and outputs
//! - `OperatorStore`: The external collection the engine syncs its node set from

mod operator;
mod store;

pub use operator::{
    ExecuteFuture, Inputs, Operator, OperatorInfo, OperatorRole, Outputs, PullFuture,
};
pub use store::{MemoryStore, OperatorStore};
