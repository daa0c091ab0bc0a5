//! Three-level directory fan-out for artifacts keyed by identifier.
//!
//! The 64-bit value is folded into 16 bits by XOR-ing its four 16-bit words;
//! the low three nibbles of that hash name the directories. This is for
//! spreading files evenly, not for uniqueness.

/// Every folder name a storage path can contain.
pub const FOLDER_CHARS: &[u8; 16] = b"0123456789abcdef";

/// Folds `raw` into 16 bits by XOR-ing its four 16-bit words.
#[inline]
#[must_use]
pub const fn persistent_hash(raw: u64) -> u16 {
    (raw ^ (raw >> 16) ^ (raw >> 32) ^ (raw >> 48)) as u16
}

/// Returns the storage path for `raw` in the form `"h0/h1/h2/"`.
///
/// # Example
///
/// ```
/// use muid::path::storage_path;
///
/// assert_eq!(storage_path(0), "0/0/0/");
/// assert_eq!(storage_path(0x0000_0000_0000_0cba), "a/b/c/");
/// ```
#[must_use]
pub fn storage_path(raw: u64) -> String {
    let hash = persistent_hash(raw);
    let mut path = String::with_capacity(6);
    for shift in [0, 4, 8] {
        path.push(char::from(FOLDER_CHARS[usize::from((hash >> shift) & 0xF)]));
        path.push('/');
    }
    path
}
