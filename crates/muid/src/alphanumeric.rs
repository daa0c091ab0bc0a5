//! Fixed-width base-64 alphanumeric form of a `u64`.
//!
//! The alphabet is `a-z`, `A-Z`, `0-9`, `!`, `~` with digit values `0..64` in
//! that order. Digits are written **least-significant first**: the character
//! at index 0 is `value % 64`. Because of that ordering the two characters at
//! indices 9 and 10 come from bits 54 and up, which for a valid identifier
//! hold only the type code. Identifiers of the same type therefore share
//! their last two characters.
//!
//! Eleven digits cover 66 bits, so the last digit of a decodable string is
//! limited to `0..16`.

use crate::error::{Error, Result};

/// The 64 symbols, indexed by digit value.
pub const ALPHABET: &[u8; 64] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!~";

/// Length of every encoded identifier.
pub const ENCODED_LEN: usize = 11;

const BITS_PER_CHAR: u32 = 6;
const DIGIT_MASK: u64 = (1 << BITS_PER_CHAR) - 1;
const NO_VALUE: u8 = 255;

/// Largest digit allowed in the most significant position (`2^64 / 64^10`).
const MAX_LAST_DIGIT: u8 = (1 << (64 - BITS_PER_CHAR * (ENCODED_LEN as u32 - 1))) - 1;

/// Lookup table from byte to digit value.
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        lut[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    lut
};

/// Stack buffer holding one encoded identifier.
pub type EncodedBuf = [u8; ENCODED_LEN];

/// Encodes `value` into `buf` without allocating.
///
/// # Example
///
/// ```
/// use muid::alphanumeric::{self, EncodedBuf};
///
/// let mut buf = EncodedBuf::default();
/// alphanumeric::encode_to_buf(65, &mut buf);
/// assert_eq!(&buf, b"bbaaaaaaaaa");
/// ```
#[inline]
pub fn encode_to_buf(mut value: u64, buf: &mut EncodedBuf) {
    for slot in buf.iter_mut() {
        *slot = ALPHABET[(value & DIGIT_MASK) as usize];
        value >>= BITS_PER_CHAR;
    }
}

/// Encodes `value` as an 11-character string.
#[must_use]
pub fn encode(value: u64) -> String {
    let mut buf = EncodedBuf::default();
    encode_to_buf(value, &mut buf);
    buf.iter().map(|&b| char::from(b)).collect()
}

/// Decodes an 11-character string back into its `u64`.
///
/// # Errors
///
/// - [`Error::InvalidLength`] if `s` is not exactly [`ENCODED_LEN`] bytes
/// - [`Error::InvalidCharacter`] for the first byte outside [`ALPHABET`]
/// - [`Error::DecodeOverflow`] if the value does not fit in 64 bits
///
/// # Example
///
/// ```
/// use muid::alphanumeric;
///
/// let s = alphanumeric::encode(u64::MAX);
/// assert_eq!(s, "~~~~~~~~~~p");
/// assert_eq!(alphanumeric::decode(&s).unwrap(), u64::MAX);
/// assert!(alphanumeric::decode("~~~~~~~~~~q").is_err());
/// ```
pub fn decode(s: &str) -> Result<u64> {
    let bytes = s.as_bytes();
    if bytes.len() != ENCODED_LEN {
        return Err(Error::InvalidLength { len: bytes.len() });
    }

    let mut digits = [0_u8; ENCODED_LEN];
    for (index, (&byte, digit)) in bytes.iter().zip(&mut digits).enumerate() {
        *digit = LOOKUP[byte as usize];
        if *digit == NO_VALUE {
            return Err(Error::InvalidCharacter { byte, index });
        }
    }
    if digits[ENCODED_LEN - 1] > MAX_LAST_DIGIT {
        return Err(Error::DecodeOverflow);
    }

    // Least significant digit first.
    Ok(digits
        .iter()
        .rev()
        .fold(0_u64, |acc, &digit| (acc << BITS_PER_CHAR) | u64::from(digit)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        id::layout::{self, MAX_SOURCE},
        kind::UidType,
    };
    use rand::Rng;

    #[test]
    fn alphabet_is_unique_and_complete() {
        let mut seen = [false; 256];
        for &b in ALPHABET {
            assert!(!seen[b as usize], "duplicate symbol {}", b as char);
            seen[b as usize] = true;
            assert!(b.is_ascii_graphic());
        }
        assert_eq!(MAX_LAST_DIGIT, 15);
    }

    #[test]
    fn zero_and_max() {
        assert_eq!(encode(0), "aaaaaaaaaaa");
        assert_eq!(decode("aaaaaaaaaaa").unwrap(), 0);
        assert_eq!(encode(u64::MAX), "~~~~~~~~~~p");
        assert_eq!(decode("~~~~~~~~~~p").unwrap(), u64::MAX);
    }

    #[test]
    fn least_significant_digit_first() {
        assert_eq!(encode(1), "baaaaaaaaaa");
        assert_eq!(encode(63), "~aaaaaaaaaa");
        assert_eq!(encode(64), "abaaaaaaaaa");
    }

    #[test]
    fn random_round_trip() {
        let mut rng = rand::rng();
        for _ in 0..10_000 {
            let value: u64 = rng.random();
            let s = encode(value);
            assert_eq!(s.len(), ENCODED_LEN);
            assert_eq!(decode(&s).unwrap(), value);
        }
    }

    #[test]
    fn rejects_bad_length() {
        assert!(matches!(decode(""), Err(Error::InvalidLength { len: 0 })));
        assert!(matches!(
            decode("aaaaaaaaaaaa"),
            Err(Error::InvalidLength { len: 12 })
        ));
    }

    #[test]
    fn rejects_foreign_characters() {
        assert!(matches!(
            decode("aaaa-aaaaaa"),
            Err(Error::InvalidCharacter {
                byte: b'-',
                index: 4
            })
        ));
        // The first offending byte is reported, counting from the left.
        assert!(matches!(
            decode("a#aaaaaaa-q"),
            Err(Error::InvalidCharacter {
                byte: b'#',
                index: 1
            })
        ));
        // Multi-byte input is rejected byte-wise.
        assert!(matches!(
            decode("aaaaaaaaaé"),
            Err(Error::InvalidCharacter { .. })
        ));
    }

    #[test]
    fn rejects_overflow() {
        assert!(matches!(decode("aaaaaaaaaaq"), Err(Error::DecodeOverflow)));
        assert!(matches!(decode("aaaaaaaaaa~"), Err(Error::DecodeOverflow)));
    }

    #[test]
    fn type_characters_are_stable() {
        let mut rng = rand::rng();
        let mut tags = std::collections::HashSet::new();
        for code in 0..UidType::COUNT {
            let base = encode(layout::pack(code, 0, 0, 0).unwrap());
            let tag = &base[9..11];
            for _ in 0..100 {
                let raw = layout::pack(
                    code,
                    rng.random_range(0..=MAX_SOURCE),
                    rng.random(),
                    rng.random(),
                )
                .unwrap();
                assert_eq!(&encode(raw)[9..11], tag);
            }
            assert!(tags.insert(tag.to_owned()), "tag {tag} reused");
        }
    }
}
