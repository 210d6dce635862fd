//! Provider traits and implementations.
//!
//! Each provider abstracts an external dependency so tests can inject a
//! deterministic implementation while production code uses the real one.

mod clock;

pub use clock::{ClockProvider, MockClock, RealClock};
