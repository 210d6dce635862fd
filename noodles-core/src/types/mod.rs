//! Core identifier types.
//!
//! - `OperatorId`: Identifier of an operator owned by the external store
//! - `EdgeId`: Identifier of a connection in the editor's edge list

mod ids;

pub use ids::{EdgeId, OperatorId};
