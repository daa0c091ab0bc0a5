use core::fmt;

/// A result type defaulting to the crate-wide [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Boxed error raised by a [`KvStore`] implementation.
///
/// [`KvStore`]: crate::store::KvStore
pub type StorageError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Names the bit field (or generator setting) that was rejected by
/// [`Error::FieldOutOfRange`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    /// The 9-bit type code.
    Type,
    /// The 5-bit source code.
    Source,
    /// The per-second sequence capacity of a generator.
    Capacity,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Type => "type",
            Self::Source => "source",
            Self::Capacity => "capacity",
        })
    }
}

/// All errors that `muid` can produce.
///
/// Every variant is recoverable by the caller. Nothing in this crate logs an
/// error and carries on; each failure is returned to the immediate caller.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A field value does not fit the layout (type >= 512, source >= 32) or a
    /// generator setting is outside its allowed range.
    #[error("{field} value {value} is out of range (max {max})")]
    FieldOutOfRange {
        /// The offending field.
        field: Field,
        /// The rejected value.
        value: u64,
        /// The largest accepted value.
        max: u64,
    },

    /// The alphanumeric form contains a byte outside the 64-symbol alphabet.
    #[error("invalid character 0x{byte:02x} at index {index}")]
    InvalidCharacter {
        /// The offending byte.
        byte: u8,
        /// Its position in the input.
        index: usize,
    },

    /// The alphanumeric form does not have exactly
    /// [`ENCODED_LEN`](crate::alphanumeric::ENCODED_LEN) characters.
    #[error("invalid length {len}, expected 11 characters")]
    InvalidLength {
        /// Length of the rejected input in bytes.
        len: usize,
    },

    /// The alphanumeric form decodes to a value larger than `u64::MAX`.
    #[error("alphanumeric value overflows 64 bits")]
    DecodeOverflow,

    /// A decoded type code has no entry in the type registry.
    #[error("unknown type code {0}")]
    UnknownType(u16),

    /// A type name has no entry in the type registry.
    #[error("unknown type name {0:?}")]
    UnknownTypeName(String),

    /// The per-second sequence capacity is exhausted.
    ///
    /// This is back-pressure, not a bug. Retry once the clock has moved past
    /// `second`.
    #[error("sequence capacity exhausted for second {second}")]
    Overloaded {
        /// The second whose capacity was used up.
        second: u32,
    },

    /// The clock reports a second past the 32-bit timestamp field (after
    /// 2106-02-07 06:28:15 UTC).
    #[error("clock second {seconds} does not fit the 32-bit timestamp field")]
    TimestampOutOfRange {
        /// The second reported by the clock.
        seconds: u64,
    },

    /// The URL could not be parsed or has no host.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl {
        /// The rejected input.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Linear probing gave up before finding a free or matching slot.
    #[error("gave up after {probes} probes")]
    ProbeLimitExceeded {
        /// Number of candidate ids visited.
        probes: u32,
    },

    /// The key-value collaborator failed.
    #[error("storage error: {0}")]
    Storage(#[source] StorageError),

    /// The store lock was poisoned by a panicking thread.
    ///
    /// Not produced when the `parking-lot` feature is enabled, since those
    /// mutexes do not poison.
    #[error("lock poisoned")]
    LockPoisoned,
}

impl Error {
    pub(crate) fn out_of_range(field: Field, value: impl Into<u64>, max: impl Into<u64>) -> Self {
        Self::FieldOutOfRange {
            field,
            value: value.into(),
            max: max.into(),
        }
    }

    #[cfg(feature = "store")]
    pub(crate) fn storage(err: impl core::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(err))
    }

    /// Returns `true` for [`Error::Overloaded`], the only variant worth
    /// retrying unchanged.
    pub fn is_overloaded(&self) -> bool {
        matches!(self, Self::Overloaded { .. })
    }
}

#[cfg(all(feature = "store", not(feature = "parking-lot")))]
use crate::mutex::{MutexGuard, PoisonError};
#[cfg(all(feature = "store", not(feature = "parking-lot")))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_field() {
        let err = Error::out_of_range(Field::Source, 32_u8, 31_u8);
        assert_eq!(err.to_string(), "source value 32 is out of range (max 31)");
    }

    #[test]
    fn display_invalid_character() {
        let err = Error::InvalidCharacter {
            byte: b'#',
            index: 4,
        };
        assert_eq!(err.to_string(), "invalid character 0x23 at index 4");
    }

    #[test]
    fn only_overloaded_is_retryable() {
        assert!(Error::Overloaded { second: 7 }.is_overloaded());
        assert!(!Error::DecodeOverflow.is_overloaded());
    }
}
