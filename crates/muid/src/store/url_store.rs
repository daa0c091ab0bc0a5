#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::{Error, Result},
    id::Uid,
    mutex::Mutex,
    store::{CanonicalUrl, KvStore, UrlHasher, Xxh3UrlHasher, canonicalize},
};

/// Default ceiling on the number of candidate ids visited per URL.
pub const DEFAULT_MAX_PROBES: u32 = 4096;

/// Result of [`UrlStore::intern`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Interned {
    pub id: Uid,
    /// `true` if this call stored the mapping, `false` if it already existed.
    pub created: bool,
}

enum Probe {
    Found(Uid),
    Vacant(Uid),
}

/// Maps URLs onto URL-layout identifiers, persisting each mapping in a
/// [`KvStore`].
///
/// The first candidate for a URL is built from the hash of its registrable
/// domain and the hash of its canonical form. If that slot holds a different
/// URL the file hash is incremented and the next slot is tried, until either
/// the URL itself or a vacant slot is found. Stored values are the canonical
/// URL, so a slot is only ever accepted after comparing its content.
///
/// Interning holds a store-wide lock across the whole probe-then-write
/// sequence because the [`KvStore`] offers no check-and-set. Lookups take no
/// lock.
///
/// # Example
///
/// ```
/// use muid::store::{MemoryKvStore, UrlStore};
///
/// let store = UrlStore::new(MemoryKvStore::new());
/// let id = store.get_or_create("http://a.example/x").unwrap();
/// assert!(id.is_url());
/// assert_eq!(store.get_or_create("http://a.example/x").unwrap(), id);
/// assert_eq!(store.lookup("http://a.example/x").unwrap(), Some(id));
/// assert_eq!(store.resolve(id).unwrap().as_deref(), Some("http://a.example/x"));
/// ```
pub struct UrlStore<S, H = Xxh3UrlHasher> {
    kv: S,
    hasher: H,
    max_probes: u32,
    lock: Mutex<()>,
}

impl<S> UrlStore<S>
where
    S: KvStore,
{
    /// Creates a store over `kv` using the default hasher.
    pub fn new(kv: S) -> Self {
        Self::with_hasher(kv, Xxh3UrlHasher)
    }
}

impl<S, H> UrlStore<S, H>
where
    S: KvStore,
    H: UrlHasher,
{
    /// Creates a store over `kv` using `hasher`.
    ///
    /// Every process sharing one `kv` must use the same hasher.
    pub fn with_hasher(kv: S, hasher: H) -> Self {
        Self {
            kv,
            hasher,
            max_probes: DEFAULT_MAX_PROBES,
            lock: Mutex::new(()),
        }
    }

    /// Sets the probe ceiling. Values below one are raised to one.
    #[must_use]
    pub fn with_max_probes(mut self, max_probes: u32) -> Self {
        self.max_probes = max_probes.max(1);
        self
    }

    pub fn max_probes(&self) -> u32 {
        self.max_probes
    }

    /// The underlying key-value store.
    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Returns the identifier of `url`, interning it first if it is new.
    ///
    /// Repeated calls with the same URL, or with any spelling that
    /// normalizes to the same canonical form, return the same identifier.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if `url` does not parse or has no host
    /// - [`Error::ProbeLimitExceeded`] if no slot was found within the probe
    ///   ceiling
    /// - [`Error::Storage`] if the key-value store fails
    /// - [`Error::LockPoisoned`] if a thread panicked while interning
    pub fn get_or_create(&self, url: &str) -> Result<Uid> {
        self.intern(url).map(|interned| interned.id)
    }

    /// Like [`get_or_create`](Self::get_or_create), also reporting whether
    /// the mapping was created by this call.
    ///
    /// # Errors
    ///
    /// See [`get_or_create`](Self::get_or_create).
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn intern(&self, url: &str) -> Result<Interned> {
        let canonical = canonicalize(url)?;

        let _guard = {
            #[cfg(feature = "parking-lot")]
            {
                self.lock.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.lock.lock()?
            }
        };

        match self.probe(&canonical)? {
            Probe::Found(id) => Ok(Interned { id, created: false }),
            Probe::Vacant(id) => {
                self.kv
                    .put(id.to_raw(), canonical.as_str().as_bytes())
                    .map_err(Error::storage)?;
                #[cfg(feature = "tracing")]
                tracing::debug!(id = %id, url = canonical.as_str(), "interned url");
                Ok(Interned { id, created: true })
            }
        }
    }

    /// Returns the identifier of `url` if it has been interned.
    ///
    /// Never writes. May miss a mapping that is being created concurrently.
    ///
    /// # Errors
    ///
    /// Same as [`get_or_create`](Self::get_or_create), apart from
    /// [`Error::LockPoisoned`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn lookup(&self, url: &str) -> Result<Option<Uid>> {
        let canonical = canonicalize(url)?;
        match self.probe(&canonical)? {
            Probe::Found(id) => Ok(Some(id)),
            Probe::Vacant(_) => Ok(None),
        }
    }

    /// Returns the canonical URL stored under `id`.
    ///
    /// Non-URL identifiers always resolve to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the key-value store fails or holds a
    /// value that is not UTF-8.
    pub fn resolve(&self, id: Uid) -> Result<Option<String>> {
        if !id.is_url() {
            return Ok(None);
        }
        match self.kv.get(id.to_raw()).map_err(Error::storage)? {
            Some(bytes) => String::from_utf8(bytes).map(Some).map_err(Error::storage),
            None => Ok(None),
        }
    }

    fn probe(&self, url: &CanonicalUrl) -> Result<Probe> {
        let domain_hash = self.hasher.domain_hash(url.domain());
        let mut file_hash = self.hasher.file_hash(url.as_str());

        for _ in 0..self.max_probes {
            let id = Uid::from_url_hashes(domain_hash, file_hash);
            match self.kv.get(id.to_raw()).map_err(Error::storage)? {
                None => return Ok(Probe::Vacant(id)),
                Some(stored) if stored == url.as_str().as_bytes() => return Ok(Probe::Found(id)),
                Some(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(id = %id, "url slot taken, probing next");
                    file_hash = file_hash.wrapping_add(1);
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(url = url.as_str(), probes = self.max_probes, "probe limit exceeded");
        Err(Error::ProbeLimitExceeded {
            probes: self.max_probes,
        })
    }
}

impl<S, H> core::fmt::Debug for UrlStore<S, H>
where
    S: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UrlStore")
            .field("kv", &self.kv)
            .field("max_probes", &self.max_probes)
            .finish_non_exhaustive()
    }
}
