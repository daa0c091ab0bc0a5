mod atomic;
#[cfg(test)]
mod tests;

pub use atomic::*;
