//! Value-producing and arithmetic operators.

mod arithmetic;
mod collection;
mod number;

pub use arithmetic::{AddOp, ArithmeticOperation, MultiplyOp};
pub use collection::CollectionOp;
pub use number::NumberOp;
