//! Noodles Core Library
//!
//! Foundational types, traits and errors for the noodles operator graph
//! engine.
//!
//! # Key Components
//!
//! - **Types**: Strongly-typed operator and edge identifiers
//! - **Flow**: The [`Edge`] model shared with the editor
//! - **Traits**: [`Operator`] and [`OperatorStore`], the interfaces the engine consumes
//! - **Value**: Dynamic values flowing between operator fields
//! - **Ports**: Field names understood by the for-loop scope executor
//!
//! # Example
//!
//! ```ignore
//! use noodles_core::prelude::*;
//!
//! let store = MemoryStore::new();
//! store.insert(Arc::new(my_operator));
//! let edge = Edge::between("/number", "/viewer");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod flow;
pub mod ports;
pub mod prelude;
pub mod testing;
pub mod traits;
pub mod types;
pub mod value;

// Re-export key types at crate root for convenience
pub use error::{NoodlesError, Result};
pub use flow::{Edge, EdgeKind};
pub use traits::{MemoryStore, Operator, OperatorInfo, OperatorRole, OperatorStore};
pub use types::{EdgeId, OperatorId};
pub use value::Value;
