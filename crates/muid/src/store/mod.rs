//! URL interning.
//!
//! [`UrlStore`] assigns every distinct canonical URL its own URL-layout
//! [`Uid`](crate::Uid) and persists the mapping through a [`KvStore`].

mod canonical;
mod hasher;
mod kv;
mod url_store;

pub use canonical::*;
pub use hasher::*;
pub use kv::*;
pub use url_store::*;
