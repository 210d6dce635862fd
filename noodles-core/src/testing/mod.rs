//! Deterministic test support.
//!
//! The engine reads every timestamp through a [`ClockProvider`], so frame
//! pacing and dirty-batch deadlines can be driven by a [`MockClock`].
//!
//! # Example
//!
//! ```
//! use noodles_core::testing::{ClockProvider, MockClock};
//! use std::time::Duration;
//!
//! let clock = MockClock::new();
//! clock.advance(Duration::from_millis(16));
//! assert_eq!(clock.now(), 16_000_000);
//! ```

pub mod providers;

pub use providers::{ClockProvider, MockClock, RealClock};
