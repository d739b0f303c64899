//! Key Module
//!
//! Method identities, argument stringification and cache key derivation.

mod arg;
mod deriver;
mod identity;


pub use arg::{KeyArg, Opaque};
pub use deriver::{derive_key, derive_qualified_key, serialize_call, CacheKey, ARG_SEPARATOR};
pub use identity::MethodIdentity;
