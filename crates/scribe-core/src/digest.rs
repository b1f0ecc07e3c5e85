//! SHA-256 content digests used as optimistic-concurrency tokens.

use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Digest of a file's raw bytes at one instant.
///
/// Two file states are considered equal when their digests are equal. The
/// digest renders as 64 lowercase hexadecimal characters, the format existing
/// callers send back as `previous_hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Hashes the given bytes.
    #[must_use]
    pub fn of(bytes: impl AsRef<[u8]>) -> Self {
        Self(Sha256::digest(bytes.as_ref()).into())
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Renders the digest as lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Compares the hex rendering against a caller-supplied token.
    ///
    /// The comparison runs in constant time over the token bytes. The token is
    /// opaque text: a differently-cased rendering of the same digest does not
    /// match.
    #[must_use]
    pub fn matches(&self, expected: &str) -> bool {
        let actual = self.to_hex();
        bool::from(actual.as_bytes().ct_eq(expected.as_bytes()))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.to_hex())
    }
}

impl From<ContentDigest> for String {
    fn from(digest: ContentDigest) -> Self {
        digest.to_hex()
    }
}
