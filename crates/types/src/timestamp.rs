//! UTC instant with second/nanosecond resolution.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A point in time, stored as seconds and nanoseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Timestamp {
    secs: i64,
    nanos: u32,
}

impl Timestamp {
    /// The zero timestamp (Unix epoch).
    pub const ZERO: Self = Self { secs: 0, nanos: 0 };

    /// Construct from raw seconds/nanoseconds since the Unix epoch.
    pub fn new(secs: i64, nanos: u32) -> Self {
        Self { secs, nanos }
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Self {
            secs: since_epoch.as_secs() as i64,
            nanos: since_epoch.subsec_nanos(),
        }
    }

    /// Whole seconds since the Unix epoch.
    pub fn as_secs(&self) -> i64 {
        self.secs
    }

    /// Nanosecond component (0..1_000_000_000).
    pub fn subsec_nanos(&self) -> u32 {
        self.nanos
    }

    /// Whether this is the zero timestamp.
    pub fn is_zero(&self) -> bool {
        self.secs == 0 && self.nanos == 0
    }

    /// Add a duration, saturating at `i64::MAX` seconds.
    pub fn add(&self, duration: Duration) -> Self {
        let extra_nanos = self.nanos as u64 + duration.subsec_nanos() as u64;
        let carry_secs = extra_nanos / 1_000_000_000;
        let nanos = (extra_nanos % 1_000_000_000) as u32;
        let secs = self
            .secs
            .saturating_add(duration.as_secs() as i64)
            .saturating_add(carry_secs as i64);
        Self { secs, nanos }
    }

    /// Subtract a duration, saturating at zero.
    pub fn sub(&self, duration: Duration) -> Self {
        let total_nanos = self.secs.max(0) as i128 * 1_000_000_000 + self.nanos as i128;
        let delta_nanos = duration.as_secs() as i128 * 1_000_000_000 + duration.subsec_nanos() as i128;
        let result_nanos = (total_nanos - delta_nanos).max(0);
        Self {
            secs: (result_nanos / 1_000_000_000) as i64,
            nanos: (result_nanos % 1_000_000_000) as u32,
        }
    }

    /// Signed difference `self - other` as a duration from the earlier to the later.
    ///
    /// Returns `None` if `other` is strictly later than `self`.
    pub fn duration_since(&self, other: Timestamp) -> Option<Duration> {
        let self_nanos = self.secs as i128 * 1_000_000_000 + self.nanos as i128;
        let other_nanos = other.secs as i128 * 1_000_000_000 + other.nanos as i128;
        if self_nanos < other_nanos {
            return None;
        }
        let diff = (self_nanos - other_nanos) as u128;
        Some(Duration::new(
            (diff / 1_000_000_000) as u64,
            (diff % 1_000_000_000) as u32,
        ))
    }
}
