//! Key Deriver Module
//!
//! Builds `identity;arg1;arg2;...` and hashes it into a hex cache key.
//!
//! Separators inside argument text are not escaped: `("a;b")` and `("a", "b")`
//! serialize to the same text and therefore alias to the same key.

use std::fmt;

use crate::key::{KeyArg, MethodIdentity};
use crate::policy::HashAlgorithm;

/// Separator written between the identity and each argument.
pub const ARG_SEPARATOR: char = ';';

// == Cache Key ==
/// Hex-encoded digest identifying one (method, arguments) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// == Serialize Call ==
/// Produces the unhashed text for a call: the prefix, then `;arg` per argument.
pub fn serialize_call(prefix: &str, args: &[&dyn KeyArg]) -> String {
    let mut text = String::with_capacity(prefix.len() + args.len() * 8);
    text.push_str(prefix);
    for arg in args {
        text.push(ARG_SEPARATOR);
        text.push_str(&arg.key_text());
    }
    text
}

// == Derive Key ==
/// Derives the cache key for a call to `method` with `args`.
pub fn derive_key(
    method: &MethodIdentity,
    args: &[&dyn KeyArg],
    algorithm: HashAlgorithm,
) -> CacheKey {
    digest(&method.to_string(), args, algorithm)
}

/// Derives a key from the declaring-type-qualified name only, ignoring the
/// parameter signature. Overloads of the same name share this key space.
pub fn derive_qualified_key(method: &MethodIdentity, args: &[&dyn KeyArg]) -> CacheKey {
    digest(&method.qualified_name(), args, HashAlgorithm::Sha256)
}

fn digest(prefix: &str, args: &[&dyn KeyArg], algorithm: HashAlgorithm) -> CacheKey {
    let text = serialize_call(prefix, args);
    CacheKey(algorithm.digest_hex(text.as_bytes()))
}
