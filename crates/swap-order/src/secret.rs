//! # Secret Pre-image
//!
//! Wrapper for the maker-supplied secret that zeroizes memory on drop.
//!
//! The secret is sensitive only until it is revealed on-chain (withdrawal of
//! the destination escrow makes it public). Until that point it must not
//! leak through logs, debug output, or lingering memory.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A hash-lock pre-image that zeroizes on drop.
///
/// Makers typically supply a passphrase; the commitment is computed over the
/// raw bytes, so arbitrary byte strings are accepted.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretPreimage {
    inner: Vec<u8>,
}

impl SecretPreimage {
    /// Wrap raw pre-image bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { inner: bytes }
    }

    /// Wrap a maker-supplied passphrase.
    pub fn from_utf8(s: &str) -> Self {
        Self {
            inner: s.as_bytes().to_vec(),
        }
    }

    /// Generate a 32-byte random secret.
    pub fn random() -> Self {
        let mut bytes = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { inner: bytes }
    }

    /// The pre-image bytes. Use immediately; avoid holding references.
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    /// Whether the pre-image is empty (rejected at order creation).
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for SecretPreimage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the actual secret
        f.write_str("SecretPreimage(***)")
    }
}

impl Serialize for SecretPreimage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&hex::encode(&self.inner))
    }
}

impl<'de> Deserialize<'de> for SecretPreimage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        Ok(Self::new(bytes))
    }
}
