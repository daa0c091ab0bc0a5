use std::{
    collections::HashMap,
    convert::Infallible,
    sync::{Arc, PoisonError, RwLock},
};

/// The durable key-value contract consumed by [`UrlStore`].
///
/// Only independent `get` and `put` are required; the store serializes its
/// own read-then-write sequences. Implementations report failures through
/// their own error type, which the store boxes into
/// [`Error::Storage`](crate::Error::Storage).
///
/// [`UrlStore`]: crate::store::UrlStore
pub trait KvStore {
    type Error: core::error::Error + Send + Sync + 'static;

    /// Returns the value stored under `key`, if any.
    fn get(&self, key: u64) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&self, key: u64, value: &[u8]) -> Result<(), Self::Error>;
}

impl<S: KvStore + ?Sized> KvStore for &S {
    type Error = S::Error;

    fn get(&self, key: u64) -> Result<Option<Vec<u8>>, Self::Error> {
        (**self).get(key)
    }

    fn put(&self, key: u64, value: &[u8]) -> Result<(), Self::Error> {
        (**self).put(key, value)
    }
}

impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    type Error = S::Error;

    fn get(&self, key: u64) -> Result<Option<Vec<u8>>, Self::Error> {
        (**self).get(key)
    }

    fn put(&self, key: u64, value: &[u8]) -> Result<(), Self::Error> {
        (**self).put(key, value)
    }
}

/// An in-process [`KvStore`] backed by a `HashMap`.
///
/// Nothing is persisted. Useful for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    map: RwLock<HashMap<u64, Vec<u8>>>,
}

impl MemoryKvStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.map.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvStore for MemoryKvStore {
    type Error = Infallible;

    fn get(&self, key: u64) -> Result<Option<Vec<u8>>, Self::Error> {
        // A panic elsewhere cannot leave a half-written entry behind.
        let map = self.map.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(&key).cloned())
    }

    fn put(&self, key: u64, value: &[u8]) -> Result<(), Self::Error> {
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(key, value.to_vec());
        Ok(())
    }
}
