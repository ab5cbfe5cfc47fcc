//! Hashing System - Subject Digests
//!
//! The digest is the only source of "randomness" in an identicon.
//! Same subject bytes, same digest, every time.

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::generator::IdenticonError;

/// Number of digest bytes every generator step may rely on.
pub const DIGEST_LEN: usize = 20;

/// Hash function backing the digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-1, 160 bits, used as-is
    #[default]
    Sha1,
    /// SHA-256 truncated to its first 20 bytes
    Sha256,
}

/// Fixed 20-byte digest of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubjectDigest([u8; DIGEST_LEN]);

impl SubjectDigest {
    /// Take the first `DIGEST_LEN` bytes of a hash output.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdenticonError> {
        let head = bytes
            .get(..DIGEST_LEN)
            .ok_or(IdenticonError::InvalidDigest(bytes.len()))?;
        let mut out = [0u8; DIGEST_LEN];
        out.copy_from_slice(head);
        Ok(Self(out))
    }

    pub fn bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Byte at `index`. Panics past `DIGEST_LEN`, like slice indexing.
    pub fn byte(&self, index: usize) -> u8 {
        self.0[index]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for SubjectDigest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Hash raw subject bytes into a digest.
pub fn hash_subject(
    subject: &[u8],
    algorithm: HashAlgorithm,
) -> Result<SubjectDigest, IdenticonError> {
    match algorithm {
        HashAlgorithm::Sha1 => SubjectDigest::from_slice(&Sha1::digest(subject)),
        HashAlgorithm::Sha256 => SubjectDigest::from_slice(&Sha256::digest(subject)),
    }
}

/// Compute SHA-256 of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}
