//! Bit-exact packing of identifier fields into a `u64`.
//!
//! Two layouts share the top 10 bits:
//!
//! ```text
//!  Bit Index:  63  62        54  53   52        48 47             16 15            0
//!              +---+-----------+----+------------+-----------------+---------------+
//!  Standard:   | 0 | type (9)  | 0  | source (5) | timestamp (32)  | sequence (16) |
//!              +---+-----------+----+------------+-----------------+---------------+
//!
//!  Bit Index:  63  62        54  53   52        48 47             32 31            0
//!              +---+-----------+----+------------+-----------------+---------------+
//!  URL:        | 0 | type (9)  | 0  |  zero (5)  | domain hash (16)| file hash (32)|
//!              +---+-----------+----+------------+-----------------+---------------+
//!              |<------------------ MSB -------- 64 bits -------- LSB ------------>|
//! ```
//!
//! Bit 63 stays clear so the value is non-negative as a signed integer. Bit
//! 53 stays clear so that, once serialized least-significant digit first,
//! the last two alphanumeric characters depend on the type alone.

use crate::{
    error::{Error, Field, Result},
    kind::UidType,
};

/// Largest type code the 9-bit field can hold.
pub const MAX_TYPE: u16 = (1 << 9) - 1;

/// Largest source code the 5-bit field can hold.
pub const MAX_SOURCE: u8 = (1 << 5) - 1;

/// Bitmask for the 9-bit type field. Occupies bits 54 through 62.
pub const TYPE_MASK: u64 = (1 << 9) - 1;

/// Bitmask for the 5-bit source field. Occupies bits 48 through 52.
pub const SOURCE_MASK: u64 = (1 << 5) - 1;

/// Bitmask for the 32-bit timestamp field. Occupies bits 16 through 47.
pub const TIMESTAMP_MASK: u64 = (1 << 32) - 1;

/// Bitmask for the 16-bit sequence field. Occupies bits 0 through 15.
pub const SEQUENCE_MASK: u64 = (1 << 16) - 1;

/// Bitmask for the 16-bit domain hash of the URL layout. Occupies bits 32
/// through 47.
pub const DOMAIN_MASK: u64 = (1 << 16) - 1;

/// Bitmask for the 32-bit file hash of the URL layout. Occupies bits 0
/// through 31.
pub const FILE_MASK: u64 = (1 << 32) - 1;

/// Number of bits to shift the type to its position (bit 54).
pub const TYPE_SHIFT: u64 = 54;

/// Number of bits to shift the source to its position (bit 48).
pub const SOURCE_SHIFT: u64 = 48;

/// Number of bits to shift the timestamp to its position (bit 16).
pub const TIMESTAMP_SHIFT: u64 = 16;

/// Number of bits to shift the sequence (bit 0).
pub const SEQUENCE_SHIFT: u64 = 0;

/// Number of bits to shift the domain hash to its position (bit 32).
pub const DOMAIN_SHIFT: u64 = 32;

/// Number of bits to shift the file hash (bit 0).
pub const FILE_SHIFT: u64 = 0;

/// Bits that must be zero in every identifier: the sign bit and the spacer
/// between type and source.
pub const RESERVED_MASK: u64 = (1 << 63) | (1 << 53);

/// Bits that must additionally be zero in the URL layout (the unused source
/// slot).
pub const URL_RESERVED_MASK: u64 = SOURCE_MASK << SOURCE_SHIFT;

const _: () = {
    assert!(TYPE_SHIFT + 9 == 63, "type must sit right below the sign bit");
    assert!(SOURCE_SHIFT + 5 == 53, "source must sit below the spacer bit");
    assert!(TIMESTAMP_SHIFT + 32 == SOURCE_SHIFT);
    assert!(SEQUENCE_SHIFT + 16 == TIMESTAMP_SHIFT);
    assert!(DOMAIN_SHIFT + 16 == SOURCE_SHIFT);
    assert!(FILE_SHIFT + 32 == DOMAIN_SHIFT);
};

/// Decoded fields of the standard layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fields {
    /// 9-bit type code.
    pub ty: u16,
    /// 5-bit source code of the minting process.
    pub source: u8,
    /// Unix seconds. The field ends at `u32::MAX` (2106-02-07).
    pub timestamp: u32,
    /// Position within the second.
    pub sequence: u16,
}

/// Decoded fields of the URL layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct UrlFields {
    /// Hash of the registrable domain, truncated to 16 bits.
    pub domain_hash: u16,
    /// Hash of the full URL (plus any probe offset), truncated to 32 bits.
    pub file_hash: u32,
}

/// Packs the standard layout.
///
/// # Errors
///
/// Returns [`Error::FieldOutOfRange`] if `ty > MAX_TYPE` or
/// `source > MAX_SOURCE`. Out-of-range values are never clamped.
///
/// # Example
///
/// ```
/// use muid::id::layout;
///
/// let raw = layout::pack(5, 3, 1_700_000_000, 42).unwrap();
/// let fields = layout::unpack(raw);
/// assert_eq!((fields.ty, fields.source, fields.timestamp, fields.sequence), (5, 3, 1_700_000_000, 42));
/// assert!(layout::pack(512, 0, 0, 0).is_err());
/// ```
pub fn pack(ty: u16, source: u8, timestamp: u32, sequence: u16) -> Result<u64> {
    if ty > MAX_TYPE {
        return Err(Error::out_of_range(Field::Type, ty, MAX_TYPE));
    }
    if source > MAX_SOURCE {
        return Err(Error::out_of_range(Field::Source, source, MAX_SOURCE));
    }
    Ok(pack_unchecked(ty, source, timestamp, sequence))
}

/// Packs the standard layout, masking each field to its width.
///
/// Callers must have range-checked `ty` and `source` already.
#[inline]
pub(crate) const fn pack_unchecked(ty: u16, source: u8, timestamp: u32, sequence: u16) -> u64 {
    ((ty as u64 & TYPE_MASK) << TYPE_SHIFT)
        | ((source as u64 & SOURCE_MASK) << SOURCE_SHIFT)
        | ((timestamp as u64 & TIMESTAMP_MASK) << TIMESTAMP_SHIFT)
        | ((sequence as u64 & SEQUENCE_MASK) << SEQUENCE_SHIFT)
}

/// Unpacks the standard layout. Never fails; reserved bits are ignored.
#[inline]
#[must_use]
pub const fn unpack(raw: u64) -> Fields {
    Fields {
        ty: type_code(raw),
        source: ((raw >> SOURCE_SHIFT) & SOURCE_MASK) as u8,
        timestamp: ((raw >> TIMESTAMP_SHIFT) & TIMESTAMP_MASK) as u32,
        sequence: ((raw >> SEQUENCE_SHIFT) & SEQUENCE_MASK) as u16,
    }
}

/// Packs the URL layout. The type is always [`UidType::Url`] and the source
/// slot stays zero.
#[inline]
#[must_use]
pub const fn pack_url(domain_hash: u16, file_hash: u32) -> u64 {
    ((UidType::Url as u64 & TYPE_MASK) << TYPE_SHIFT)
        | ((domain_hash as u64 & DOMAIN_MASK) << DOMAIN_SHIFT)
        | ((file_hash as u64 & FILE_MASK) << FILE_SHIFT)
}

/// Unpacks the URL layout.
#[inline]
#[must_use]
pub const fn unpack_url(raw: u64) -> UrlFields {
    UrlFields {
        domain_hash: ((raw >> DOMAIN_SHIFT) & DOMAIN_MASK) as u16,
        file_hash: ((raw >> FILE_SHIFT) & FILE_MASK) as u32,
    }
}

/// Extracts the 9-bit type code shared by both layouts.
#[inline]
#[must_use]
pub const fn type_code(raw: u64) -> u16 {
    ((raw >> TYPE_SHIFT) & TYPE_MASK) as u16
}

/// Returns `true` if `raw` carries the URL type code.
#[inline]
#[must_use]
pub const fn is_url(raw: u64) -> bool {
    type_code(raw) == UidType::Url as u16
}

/// Checks the structural invariants: the reserved bits are clear, and for
/// URL identifiers the unused source slot is clear too.
///
/// This does not consult the type registry.
#[inline]
#[must_use]
pub const fn is_valid(raw: u64) -> bool {
    if raw & RESERVED_MASK != 0 {
        return false;
    }
    !is_url(raw) || raw & URL_RESERVED_MASK == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn pack_places_fields_exactly() {
        let raw = pack(0b1_0000_0001, 0b1_0001, 0x8000_0001, 0x8001).unwrap();
        assert_eq!(
            raw,
            (0b1_0000_0001_u64 << 54) | (0b1_0001 << 48) | (0x8000_0001 << 16) | 0x8001
        );
        assert_eq!(raw >> 63, 0);
        assert_eq!((raw >> 53) & 1, 0);
    }

    #[test]
    fn example_round_trip() {
        let raw = pack(5, 3, 1_700_000_000, 42).unwrap();
        assert_eq!(
            unpack(raw),
            Fields {
                ty: 5,
                source: 3,
                timestamp: 1_700_000_000,
                sequence: 42
            }
        );
    }

    #[test]
    fn max_fields_keep_sign_bit_clear() {
        let raw = pack(MAX_TYPE, MAX_SOURCE, u32::MAX, u16::MAX).unwrap();
        assert_eq!(raw >> 63, 0);
        assert!(is_valid(raw));
        let fields = unpack(raw);
        assert_eq!(fields.ty, MAX_TYPE);
        assert_eq!(fields.source, MAX_SOURCE);
        assert_eq!(fields.timestamp, u32::MAX);
        assert_eq!(fields.sequence, u16::MAX);
    }

    #[test]
    fn rejects_out_of_range_type_and_source() {
        assert!(matches!(
            pack(512, 0, 0, 0),
            Err(Error::FieldOutOfRange {
                field: Field::Type,
                value: 512,
                max: 511
            })
        ));
        assert!(matches!(
            pack(0, 32, 0, 0),
            Err(Error::FieldOutOfRange {
                field: Field::Source,
                value: 32,
                max: 31
            })
        ));
    }

    #[test]
    fn random_round_trip() {
        let mut rng = rand::rng();
        for _ in 0..10_000 {
            let ty = rng.random_range(0..=MAX_TYPE);
            let source = rng.random_range(0..=MAX_SOURCE);
            let timestamp: u32 = rng.random();
            let sequence: u16 = rng.random();
            let raw = pack(ty, source, timestamp, sequence).unwrap();
            assert_eq!(
                unpack(raw),
                Fields {
                    ty,
                    source,
                    timestamp,
                    sequence
                }
            );
            // A URL type code with a nonzero source is not a valid URL id.
            assert_eq!(is_valid(raw), ty != UidType::Url.code() || source == 0);
        }
    }

    #[test]
    fn url_code_in_standard_layout_is_invalid() {
        let raw = pack(UidType::Url.code(), 3, 1_700_000_000, 42).unwrap();
        assert!(is_url(raw));
        assert!(!is_valid(raw));
        assert!(is_valid(pack(UidType::Url.code(), 0, 7, 7).unwrap()));
    }

    #[test]
    fn url_layout_round_trip() {
        let raw = pack_url(0xBEEF, 0xDEAD_BEEF);
        assert!(is_url(raw));
        assert!(is_valid(raw));
        assert_eq!(type_code(raw), UidType::Url.code());
        assert_eq!(unpack(raw).source, 0);
        assert_eq!(
            unpack_url(raw),
            UrlFields {
                domain_hash: 0xBEEF,
                file_hash: 0xDEAD_BEEF
            }
        );
    }

    #[test]
    fn reserved_bits_make_invalid() {
        let raw = pack(1, 1, 1, 1).unwrap();
        assert!(!is_valid(raw | (1 << 63)));
        assert!(!is_valid(raw | (1 << 53)));

        let url = pack_url(1, 1);
        assert!(!is_valid(url | (1 << 50)));
        // A non-URL id may use the source slot.
        assert!(is_valid(raw | (1 << 50)));
    }
}
