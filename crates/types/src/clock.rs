//! Clock capability, narrowing ambient `SystemTime::now()` calls to a
//! testable boundary.

use crate::Timestamp;

/// A source of the current time.
pub trait Clock: Send + Sync {
    /// The current time, as observed by this clock.
    fn now(&self) -> Timestamp;
}

/// The real wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that always returns a fixed time, or one advanced manually.
/// Gated behind `test-utils` so production code never depends on it.
#[cfg(feature = "test-utils")]
pub struct FixedClock {
    current: std::sync::atomic::AtomicI64,
}

#[cfg(feature = "test-utils")]
impl FixedClock {
    /// Construct a clock fixed at `secs` seconds past the Unix epoch.
    pub fn new(secs: i64) -> Self {
        Self {
            current: std::sync::atomic::AtomicI64::new(secs),
        }
    }

    /// Advance the clock by `secs` seconds.
    pub fn advance(&self, secs: i64) {
        self.current
            .fetch_add(secs, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(feature = "test-utils")]
impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(
            self.current.load(std::sync::atomic::Ordering::SeqCst),
            0,
        )
    }
}
