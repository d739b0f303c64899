//! Policy Module
//!
//! Per-method cache policy and the hash algorithms it can select.

mod descriptor;
mod hash;

pub use descriptor::{CacheAnnotation, CachePolicy};
pub use hash::HashAlgorithm;
