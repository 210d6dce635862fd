//! Test support for engine consumers.
//!
//! [`StubOperator`] is a scriptable operator for exercising the scheduler
//! without a real field system.
//!
//! # Example
//!
//! ```ignore
//! use noodles_executor::testing::StubOperator;
//!
//! let viewer = Arc::new(StubOperator::new("/viewer", OperatorRole::Viewer).with_value(42));
//! let broken = Arc::new(StubOperator::new("/broken", OperatorRole::Output).failing("boom"));
//! store.insert(viewer);
//! store.insert(broken);
//! ```

mod stub;

pub use stub::StubOperator;
