//! Clock provider for time abstraction.
//!
//! Lets tests drive frame pacing with a mock clock while production code
//! uses the monotonic system clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Provider trait for time operations.
pub trait ClockProvider: Send + Sync {
    /// Monotonic time in nanoseconds since the clock was created.
    fn now(&self) -> u64;

    /// Current wall-clock time as milliseconds since UNIX epoch.
    fn system_time_millis(&self) -> u64;

    /// Advance time by the specified duration (mock-only operation).
    ///
    /// Real implementations do nothing.
    fn advance(&self, duration: Duration);

    /// Check if this is a mock clock.
    fn is_mock(&self) -> bool;

    /// Duration elapsed since an earlier `now()` reading.
    fn elapsed_since(&self, earlier: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(earlier))
    }
}

/// Real clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct RealClock {
    start: Instant,
}

impl RealClock {
    /// Create a new real clock.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for RealClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockProvider for RealClock {
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }

    fn system_time_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn advance(&self, _duration: Duration) {}

    fn is_mock(&self) -> bool {
        false
    }
}

/// Mock clock with controllable time.
///
/// Starts at zero (or a given wall-clock time) and only moves when
/// [`ClockProvider::advance`] is called.
#[derive(Debug, Default)]
pub struct MockClock {
    current_nanos: AtomicU64,
    system_time_millis: AtomicU64,
}

impl MockClock {
    /// Create a mock clock starting at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock clock whose wall-clock reading starts at `millis`.
    pub fn at_millis(millis: u64) -> Self {
        Self {
            current_nanos: AtomicU64::new(0),
            system_time_millis: AtomicU64::new(millis),
        }
    }

    /// Current monotonic time in nanoseconds.
    pub fn current_nanos(&self) -> u64 {
        self.current_nanos.load(Ordering::SeqCst)
    }
}

impl ClockProvider for MockClock {
    fn now(&self) -> u64 {
        self.current_nanos.load(Ordering::SeqCst)
    }

    fn system_time_millis(&self) -> u64 {
        self.system_time_millis.load(Ordering::SeqCst)
    }

    fn advance(&self, duration: Duration) {
        self.current_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
        self.system_time_millis
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    fn is_mock(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_clock_advances() {
        let clock = RealClock::new();
        let t1 = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        let t2 = clock.now();
        assert!(t2 > t1);
        assert!(!clock.is_mock());
    }

    #[test]
    fn mock_clock_does_not_advance_automatically() {
        let clock = MockClock::new();
        let t1 = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(t1, clock.now());
    }

    #[test]
    fn mock_clock_advance() {
        let clock = MockClock::new();
        assert_eq!(clock.now(), 0);

        clock.advance(Duration::from_millis(16));
        assert_eq!(clock.now(), 16_000_000);

        clock.advance(Duration::from_micros(500));
        assert_eq!(clock.current_nanos(), 16_500_000);
        assert_eq!(clock.elapsed_since(16_000_000), Duration::from_micros(500));
    }

    #[test]
    fn mock_clock_system_time_advances() {
        let clock = MockClock::at_millis(1_705_314_600_000);
        clock.advance(Duration::from_secs(60));
        assert_eq!(clock.system_time_millis(), 1_705_314_660_000);
    }
}
