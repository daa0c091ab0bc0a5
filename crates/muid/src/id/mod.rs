pub mod layout;
mod uid;

pub use uid::*;
