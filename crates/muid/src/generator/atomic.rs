use core::cmp;

use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::{Error, Field, Result},
    id::{Uid, layout},
    kind::UidType,
    time::TimeSource,
};

/// Number of distinct sequence values per second (the 16-bit field).
pub const MAX_CAPACITY: u32 = 1 << 16;

/// A lock-free identifier generator suitable for multi-threaded environments.
///
/// The generator keeps one counter per second, shared by all types and
/// sources, in a single [`AtomicU64`]: the high 32 bits hold the second the
/// counter belongs to, the low 32 bits hold how many sequence values have
/// been handed out in it. Every allocation is one compare-and-swap on that
/// word, so the reset at a second boundary and the increment that follows it
/// can never be split between threads.
///
/// Once `capacity` identifiers have been issued in a second, [`allocate`]
/// returns [`Error::Overloaded`] until the clock moves on. The generator does
/// not wait or retry on its own.
///
/// If the clock reports a second earlier than the last one seen, allocation
/// continues inside the last second, so a backwards clock step can never
/// reissue an identifier.
///
/// [`allocate`]: IdGenerator::allocate
pub struct IdGenerator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    capacity: u32,
    time: T,
}

const fn pack_state(second: u32, allocated: u32) -> u64 {
    ((second as u64) << 32) | allocated as u64
}

const fn unpack_state(state: u64) -> (u32, u32) {
    ((state >> 32) as u32, state as u32)
}

impl<T> IdGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator with the full capacity of 65 536 identifiers per
    /// second.
    ///
    /// # Example
    ///
    /// ```
    /// use muid::{IdGenerator, MonotonicClock, UidType};
    ///
    /// let generator = IdGenerator::new(MonotonicClock::new());
    /// let id = generator.allocate(UidType::Band, 3).unwrap();
    /// assert_eq!(id.uid_type().unwrap(), UidType::Band);
    /// assert_eq!(id.source(), 3);
    /// ```
    pub fn new(time: T) -> Self {
        Self::from_parts(0, 0, MAX_CAPACITY, time)
    }

    /// Creates a generator that issues at most `capacity` identifiers per
    /// second.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FieldOutOfRange`] unless `1 <= capacity <= 65536`.
    pub fn with_capacity(capacity: u32, time: T) -> Result<Self> {
        Self::from_components(0, 0, capacity, time)
    }

    /// Creates a generator from explicit state.
    ///
    /// This is primarily useful for restoring a generator that must not
    /// reissue identifiers of a second it already served. `allocated` is the
    /// number of sequence values already handed out in `second`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FieldOutOfRange`] unless `1 <= capacity <= 65536`.
    pub fn from_components(second: u32, allocated: u32, capacity: u32, time: T) -> Result<Self> {
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(Error::out_of_range(Field::Capacity, capacity, MAX_CAPACITY));
        }
        Ok(Self::from_parts(second, allocated, capacity, time))
    }

    fn from_parts(second: u32, allocated: u32, capacity: u32, time: T) -> Self {
        let initial = pack_state(second, allocated);
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(initial)),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(initial),
            capacity,
            time,
        }
    }

    /// The maximum number of identifiers issued per second.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Forgets the last second and its counter.
    ///
    /// Only safe when no identifier minted by this generator in the current
    /// second can still collide, e.g. between test cases.
    pub fn reset(&self) {
        self.state.store(0, Ordering::Relaxed);
    }

    /// Allocates a fresh identifier of type `ty` for `source`.
    ///
    /// # Errors
    ///
    /// - [`Error::FieldOutOfRange`] if `source` exceeds
    ///   [`MAX_SOURCE`](layout::MAX_SOURCE) or `ty` is [`UidType::Url`],
    ///   which only the URL store mints
    /// - [`Error::Overloaded`] if the capacity of the current second is used
    ///   up
    /// - [`Error::TimestampOutOfRange`] if the clock is past the last second
    ///   the 32-bit timestamp field can hold
    ///
    /// # Example
    ///
    /// ```
    /// use muid::{Error, IdGenerator, TimeSource, UidType};
    ///
    /// struct FixedTime;
    /// impl TimeSource for FixedTime {
    ///     fn current_seconds(&self) -> u64 {
    ///         1_700_000_000
    ///     }
    /// }
    ///
    /// let generator = IdGenerator::with_capacity(2, FixedTime).unwrap();
    /// assert_eq!(generator.allocate(UidType::User, 0).unwrap().sequence(), 0);
    /// assert_eq!(generator.allocate(UidType::Tour, 0).unwrap().sequence(), 1);
    /// assert!(matches!(
    ///     generator.allocate(UidType::User, 0),
    ///     Err(Error::Overloaded { second: 1_700_000_000 })
    /// ));
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn allocate(&self, ty: UidType, source: u8) -> Result<Uid> {
        if ty.is_url() {
            return Err(Error::out_of_range(Field::Type, ty.code(), UidType::Url.code() - 1));
        }
        if source > layout::MAX_SOURCE {
            return Err(Error::out_of_range(Field::Source, source, layout::MAX_SOURCE));
        }

        loop {
            let seconds = self.time.current_seconds();
            let Ok(now) = u32::try_from(seconds) else {
                return Err(Error::TimestampOutOfRange { seconds });
            };

            let current = self.state.load(Ordering::Relaxed);
            let (last, allocated) = unpack_state(current);

            let (second, sequence, next) = match now.cmp(&last) {
                cmp::Ordering::Greater => (now, 0, pack_state(now, 1)),
                ordering => {
                    if ordering.is_lt() {
                        Self::cold_clock_behind(now, last);
                    }
                    if allocated >= self.capacity {
                        return Err(self.cold_overloaded(last));
                    }
                    (last, allocated, pack_state(last, allocated + 1))
                }
            };

            if self
                .state
                .compare_exchange(current, next, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                // `sequence < capacity <= 2^16`
                let raw = layout::pack_unchecked(ty.code(), source, second, sequence as u16);
                return Ok(Uid::from_raw(raw));
            }

            // Another thread won the race; retry against its state.
            core::hint::spin_loop();
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_overloaded(&self, second: u32) -> Error {
        #[cfg(feature = "tracing")]
        tracing::debug!(second, capacity = self.capacity, "sequence capacity exhausted");
        Error::Overloaded { second }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u32, last: u32) {
        #[cfg(feature = "tracing")]
        tracing::trace!(now, last, "clock behind, staying in last second");
        #[cfg(not(feature = "tracing"))]
        let _ = (now, last);
    }
}

impl<T> core::fmt::Debug for IdGenerator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let (second, allocated) = unpack_state(self.state.load(Ordering::Relaxed));
        f.debug_struct("IdGenerator")
            .field("second", &second)
            .field("allocated", &allocated)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
