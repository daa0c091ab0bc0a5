use xxhash_rust::xxh3::xxh3_64;

/// Derives the two hashes that place a URL in the identifier space.
///
/// Implementations must be deterministic across processes and releases:
/// identifiers already persisted depend on them.
pub trait UrlHasher {
    /// Hash of the registrable domain, truncated to 16 bits.
    fn domain_hash(&self, domain: &str) -> u16;

    /// Hash of the canonical URL, truncated to 32 bits.
    fn file_hash(&self, url: &str) -> u32;
}

/// The default [`UrlHasher`]: XXH3-64 with seed 0, truncated.
#[derive(Clone, Copy, Debug, Default)]
pub struct Xxh3UrlHasher;

impl UrlHasher for Xxh3UrlHasher {
    fn domain_hash(&self, domain: &str) -> u16 {
        xxh3_64(domain.as_bytes()) as u16
    }

    fn file_hash(&self, url: &str) -> u32 {
        xxh3_64(url.as_bytes()) as u32
    }
}
