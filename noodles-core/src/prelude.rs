//! Prelude for convenient imports.
//!
//! ```ignore
//! use noodles_core::prelude::*;
//! ```

// Core types
pub use crate::types::{EdgeId, OperatorId};
pub use crate::value::Value;

// Error handling
pub use crate::error::{NoodlesError, Result, ResultExt};

// Edges
pub use crate::flow::{Edge, EdgeKind};

// Traits
pub use crate::traits::{
    ExecuteFuture, Inputs, MemoryStore, Operator, OperatorInfo, OperatorRole, OperatorStore,
    Outputs, PullFuture,
};

// Time
pub use crate::testing::{ClockProvider, MockClock, RealClock};

pub use std::sync::Arc;
