//! Terminal operators the engine pulls every frame.
//!
//! Each sink copies its `in` input to `out`, which is what `pull` returns.

mod console;
mod display;

pub use console::ConsoleOp;
pub use display::{OutputOp, RendererOp, ViewerOp};
