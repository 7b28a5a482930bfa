//! # Address Mapping Registry
//!
//! The order format only understands EVM-style addresses, so every Sui
//! identity that touches an order gets a proxy EVM identity: the address of
//! a freshly minted secp256k1 keypair. Mappings are 1:1, created lazily on
//! first sight, never mutated, and a proxy is never reused for a different
//! Sui identity.
//!
//! Lookups work by either side and are case-insensitive on the hex
//! renderings (addresses compare on decoded bytes).

#![warn(missing_docs)]
#![warn(clippy::all)]

use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use shared_types::{EvmAddress, SuiAddress};
use std::sync::Arc;
use swap_store::{RecordStore, RecordStoreExt, StoreError};
use thiserror::Error;
use tracing::info;

const BY_FOREIGN: &str = "address_mappings";
const BY_PROXY: &str = "address_mappings_by_proxy";

/// Registry failures.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Persistence failure.
    #[error("Registry storage error: {0}")]
    Store(#[from] StoreError),
}

/// One persisted identity association.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressMapping {
    /// The user's identity on the Sui-style ledger.
    pub sui_address: SuiAddress,
    /// The minted proxy identity on the EVM chain.
    pub evm_proxy: EvmAddress,
}

/// Lazily-populated Sui → EVM proxy identity registry.
pub struct MappingRegistry {
    store: Arc<dyn RecordStore>,
    // Serializes mint-if-absent so concurrent first sightings of the same
    // identity cannot mint two proxies.
    mint_lock: Mutex<()>,
}

impl MappingRegistry {
    /// Wrap a record store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            mint_lock: Mutex::new(()),
        }
    }

    /// Return the proxy for `foreign`, minting and persisting one on first
    /// sight.
    pub fn ensure_proxy(&self, foreign: &SuiAddress) -> Result<EvmAddress, RegistryError> {
        let _guard = self.mint_lock.lock();
        if let Some(mapping) = self
            .store
            .get::<AddressMapping>(BY_FOREIGN, &foreign.to_hex())?
        {
            return Ok(mapping.evm_proxy);
        }

        let proxy = mint_proxy_address();
        let mapping = AddressMapping {
            sui_address: *foreign,
            evm_proxy: proxy,
        };
        self.store
            .put_if_absent(BY_FOREIGN, &foreign.to_hex(), &mapping)?;
        self.store.put_if_absent(BY_PROXY, &proxy.to_hex(), &mapping)?;
        info!(foreign = %foreign, proxy = %proxy, "Minted proxy identity");
        Ok(proxy)
    }

    /// Look up the proxy for a Sui identity.
    pub fn lookup_by_foreign(&self, foreign: &SuiAddress) -> Result<Option<EvmAddress>, RegistryError> {
        Ok(self
            .store
            .get::<AddressMapping>(BY_FOREIGN, &foreign.to_hex())?
            .map(|m| m.evm_proxy))
    }

    /// Look up the Sui identity behind a proxy.
    pub fn lookup_by_proxy(&self, proxy: &EvmAddress) -> Result<Option<SuiAddress>, RegistryError> {
        Ok(self
            .store
            .get::<AddressMapping>(BY_PROXY, &proxy.to_hex())?
            .map(|m| m.sui_address))
    }
}

/// Derive a fresh EVM address: keccak of a new keypair's uncompressed public
/// key, last 20 bytes. The private key is discarded — the proxy only needs
/// to be a valid, unique address, it never signs.
fn mint_proxy_address() -> EvmAddress {
    let signing_key = SigningKey::random(&mut rand::thread_rng());
    let verifying_key = signing_key.verifying_key();
    let point = verifying_key.to_encoded_point(false);

    let mut hasher = Keccak256::new();
    hasher.update(&point.as_bytes()[1..]); // skip the 0x04 tag
    let digest = hasher.finalize();

    let mut addr = [0u8; 20];
    addr.copy_from_slice(&digest[12..]);
    EvmAddress(addr)
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
