//! Control-flow operators.

mod failing;
mod for_loop;

pub use failing::FailingOp;
pub use for_loop::{ForLoopBeginOp, ForLoopEndOp, ForLoopMetaOp};
