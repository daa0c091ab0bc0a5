//! # muid
//!
//! Compact 64-bit identifiers for a fixed catalog of entity types.
//!
//! - [`Uid`]: the identifier, with its bit layouts in [`id::layout`]
//! - [`alphanumeric`]: the fixed 11-character string form
//! - [`IdGenerator`]: a lock-free per-second allocator
//! - [`store::UrlStore`]: interns URLs into the same id space (feature
//!   `store`)
//! - [`path`]: three-level directory fan-out keyed by id
//!
//! ## Example
//!
//! ```
//! use muid::{IdGenerator, MonotonicClock, Uid, UidType};
//!
//! let generator = IdGenerator::new(MonotonicClock::new());
//! let id = generator.allocate(UidType::Record, 1).unwrap();
//!
//! let s = id.to_string();
//! let back: Uid = s.parse().unwrap();
//! assert_eq!(back, id);
//! println!("{s} lives under {}", id.storage_path());
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod alphanumeric;
mod error;
mod generator;
pub mod id;
mod kind;
#[cfg(feature = "store")]
mod mutex;
pub mod path;
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[cfg(feature = "serde")]
pub mod serde;
#[cfg_attr(docsrs, doc(cfg(feature = "store")))]
#[cfg(feature = "store")]
pub mod store;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::{Decoded, Uid};
pub use crate::kind::*;
#[cfg(feature = "store")]
pub use crate::store::{MemoryKvStore, UrlStore};
pub use crate::time::*;
