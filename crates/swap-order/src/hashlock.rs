//! # Hash-Lock Primitive
//!
//! Produces the commitment that binds both escrows of a swap and validates a
//! pre-image against it before any withdrawal is constructed.
//!
//! The two ledgers expect different digest conventions: the EVM escrow
//! contracts check Keccak-256, the Move contracts check SHA-256. Callers pick
//! the family with [`HashFamily::for_chain`] and must never mix families
//! across an escrow's lifetime.

use crate::secret::SecretPreimage;
use serde::{Deserialize, Serialize};
use sha2::{Digest as Sha2Digest, Sha256};
use sha3::Keccak256;
use shared_types::{ChainId, Hash32};

/// The digest convention an escrow contract checks pre-images against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashFamily {
    /// Keccak-256 (EVM contract convention).
    Keccak256,
    /// SHA-256 (Move contract convention).
    Sha256,
}

impl HashFamily {
    /// The family the given chain's escrow contract expects.
    pub fn for_chain(chain: ChainId) -> Self {
        match chain {
            ChainId::Ethereum => HashFamily::Keccak256,
            ChainId::Sui => HashFamily::Sha256,
        }
    }

    /// Hash arbitrary bytes under this family.
    pub fn digest(&self, bytes: &[u8]) -> Hash32 {
        let mut out = [0u8; 32];
        match self {
            HashFamily::Keccak256 => {
                let mut hasher = Keccak256::new();
                hasher.update(bytes);
                out.copy_from_slice(&hasher.finalize());
            }
            HashFamily::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(bytes);
                out.copy_from_slice(&hasher.finalize());
            }
        }
        Hash32(out)
    }
}

/// Compute the commitment for a secret under the given family.
pub fn commit(family: HashFamily, secret: &SecretPreimage) -> Hash32 {
    family.digest(secret.as_bytes())
}

/// Check that a secret hashes to the given commitment.
///
/// Every withdrawal path calls this before building a transaction; a
/// mismatch is a fatal input error, never ignored.
pub fn verify(family: HashFamily, secret: &SecretPreimage, commitment: &Hash32) -> bool {
    commit(family, secret) == *commitment
}
