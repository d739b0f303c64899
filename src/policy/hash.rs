//! Hash Algorithm Module
//!
//! Selects the digest used to turn serialized call data into a cache key.

use std::fmt;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

// == Hash Algorithm ==
/// Digest algorithms available for cache key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha1,
    Sha384,
    Sha512,
    Md5,
}

impl HashAlgorithm {
    /// All supported algorithms, in declaration order.
    pub const ALL: [HashAlgorithm; 5] = [
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
        HashAlgorithm::Md5,
    ];

    // == From Name ==
    /// Resolves an algorithm from its annotation name.
    ///
    /// Matching is case-sensitive. Unrecognized names resolve to SHA256
    /// rather than failing.
    pub fn from_name(name: &str) -> Self {
        Self::parse_exact(name).unwrap_or_default()
    }

    /// Resolves an algorithm only if the name is one of the known set.
    pub fn parse_exact(name: &str) -> Option<Self> {
        match name {
            "SHA256" => Some(HashAlgorithm::Sha256),
            "SHA1" => Some(HashAlgorithm::Sha1),
            "SHA384" => Some(HashAlgorithm::Sha384),
            "SHA512" => Some(HashAlgorithm::Sha512),
            "MD5" => Some(HashAlgorithm::Md5),
            _ => None,
        }
    }

    /// Annotation name of the algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Sha384 => "SHA384",
            HashAlgorithm::Sha512 => "SHA512",
            HashAlgorithm::Md5 => "MD5",
        }
    }

    /// Digest size in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
            HashAlgorithm::Md5 => 16,
        }
    }

    // == Digest ==
    /// Hashes `data` and returns the lowercase hex encoding of the digest.
    pub fn digest_hex(&self, data: &[u8]) -> String {
        match self {
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
            HashAlgorithm::Sha1 => hex::encode(Sha1::digest(data)),
            HashAlgorithm::Sha384 => hex::encode(Sha384::digest(data)),
            HashAlgorithm::Sha512 => hex::encode(Sha512::digest(data)),
            HashAlgorithm::Md5 => hex::encode(Md5::digest(data)),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
