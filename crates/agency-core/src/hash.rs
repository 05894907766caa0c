//! Pure synchronous hashing for content addressing
//!
//! Hashing is deterministic and side-effect free, so it lives outside any
//! effect or engine plumbing. The algorithm is declared once through the
//! `ALGORITHM` constant; every identifier in the workspace flows through
//! [`hash`] or [`hasher`].
//!
//! Current algorithm: **SHA-256** (32-byte output)
//!
//! Identifiers that cover structured records are built with
//! [`CanonicalHasher`], which writes a domain tag followed by length-prefixed
//! fields. Length prefixes make the encoding injective, so two different
//! field layouts can never produce the same byte stream.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// 32-byte digest produced by the system hash algorithm.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    /// All-zero digest.
    pub const ZERO: Hash32 = Hash32([0u8; 32]);

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex encoding of the digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({})", &self.to_hex()[..16])
    }
}

impl From<[u8; 32]> for Hash32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Synchronous trait for cryptographic hashing
pub trait HashAlgorithm: Send + Sync + fmt::Debug {
    /// Hash arbitrary bytes to a 32-byte digest
    fn hash(&self, data: &[u8]) -> [u8; 32];

    /// Create an incremental hasher for multi-part hashing
    fn hasher(&self) -> Box<dyn Hasher>;
}

/// Incremental hashing of multi-part data
pub trait Hasher: Send {
    /// Update the hasher with more data
    fn update(&mut self, data: &[u8]);

    /// Finalize the hasher and return the 32-byte digest
    fn finalize(self: Box<Self>) -> [u8; 32];
}

/// SHA-256 (NIST FIPS 180-4)
#[derive(Debug, Clone, Copy)]
pub struct Sha256Algorithm;

impl HashAlgorithm for Sha256Algorithm {
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        Sha256::digest(data).into()
    }

    fn hasher(&self) -> Box<dyn Hasher> {
        Box::new(Sha256Hasher(Sha256::new()))
    }
}

struct Sha256Hasher(Sha256);

impl Hasher for Sha256Hasher {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> [u8; 32] {
        self.0.finalize().into()
    }
}

/// The global hash algorithm. Single source of truth for the whole workspace.
pub const ALGORITHM: Sha256Algorithm = Sha256Algorithm;

/// Hash bytes with the global algorithm.
#[inline]
pub fn hash(data: &[u8]) -> [u8; 32] {
    ALGORITHM.hash(data)
}

/// Create an incremental hasher using the global algorithm.
#[inline]
pub fn hasher() -> Box<dyn Hasher> {
    ALGORITHM.hasher()
}

/// Builder for domain-tagged, length-prefixed record digests.
///
/// Every variable-length field is prefixed with its length as a big-endian
/// `u64`. Fixed-width integers are written big-endian without a prefix.
/// Cost is linear in the number of bytes written.
pub struct CanonicalHasher {
    inner: Box<dyn Hasher>,
}

impl CanonicalHasher {
    /// Start a digest for records of the given kind.
    pub fn new(tag: &str) -> Self {
        let mut inner = hasher();
        inner.update(&(tag.len() as u64).to_be_bytes());
        inner.update(tag.as_bytes());
        Self { inner }
    }

    /// Append a length-prefixed byte field.
    pub fn bytes(mut self, data: &[u8]) -> Self {
        self.inner.update(&(data.len() as u64).to_be_bytes());
        self.inner.update(data);
        self
    }

    /// Append a fixed 32-byte field.
    pub fn fixed32(mut self, data: &[u8; 32]) -> Self {
        self.inner.update(data);
        self
    }

    /// Append a single discriminant byte.
    pub fn tag_byte(mut self, byte: u8) -> Self {
        self.inner.update(&[byte]);
        self
    }

    /// Append a big-endian `u64`.
    pub fn u64(mut self, value: u64) -> Self {
        self.inner.update(&value.to_be_bytes());
        self
    }

    /// Finish and return the digest.
    pub fn finish(self) -> Hash32 {
        Hash32(self.inner.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_determinism() {
        assert_eq!(hash(b"hello world"), hash(b"hello world"));
    }

    #[test]
    fn test_incremental_hasher_equivalence() {
        let mut h = hasher();
        h.update(b"hello");
        h.update(b" ");
        h.update(b"world");
        assert_eq!(hash(b"hello world"), h.finalize());
    }

    #[test]
    fn test_sha256_known_vector() {
        let empty = Hash32(hash(b""));
        assert_eq!(
            empty.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_length_prefix_prevents_concatenation_collisions() {
        let a = CanonicalHasher::new("t").bytes(b"ab").bytes(b"c").finish();
        let b = CanonicalHasher::new("t").bytes(b"a").bytes(b"bc").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tag_separates_record_kinds() {
        let a = CanonicalHasher::new("delegation").bytes(b"x").finish();
        let b = CanonicalHasher::new("caveat").bytes(b"x").finish();
        assert_ne!(a, b);
    }
}
