use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// A trait for time sources that return the current second.
///
/// This abstraction allows you to plug in the system clock, a monotonic
/// clock, or a mocked time source in tests. The unit is **seconds** since the
/// Unix epoch; the generator rejects seconds past the 32-bit timestamp field.
///
/// # Example
///
/// ```
/// use muid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_seconds(&self) -> u64 {
///         1_700_000_000
///     }
/// }
///
/// assert_eq!(FixedTime.current_seconds(), 1_700_000_000);
/// ```
pub trait TimeSource {
    /// Returns the current time in seconds since the Unix epoch.
    fn current_seconds(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_seconds(&self) -> u64 {
        (**self).current_seconds()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn current_seconds(&self) -> u64 {
        (**self).current_seconds()
    }
}

/// Reads the wall clock on every call.
///
/// Follows any adjustment of the system clock, including backwards jumps.
/// The generator tolerates those by staying in the last second it saw.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_seconds(&self) -> u64 {
        // A clock set before 1970 reads as zero.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}

/// A clock that reads the wall clock once at construction and advances with
/// [`Instant`] afterwards.
///
/// This avoids wall-clock adjustments (e.g., NTP corrections) so the returned
/// second never goes backward, while staying aligned to the Unix epoch.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    start: Instant,
    epoch_offset: u64, // in seconds
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            epoch_offset: SystemClock.current_seconds(),
        }
    }
}

impl TimeSource for MonotonicClock {
    fn current_seconds(&self) -> u64 {
        self.epoch_offset + self.start.elapsed().as_secs()
    }
}
