//! Node configuration.
//!
//! Loaded from a JSON file when a path is given, otherwise defaults. The
//! listen port can be overridden with the `CROSSWAP_PORT` environment
//! variable either way.

use serde::{Deserialize, Serialize};
use shared_types::{EvmAddress, SuiAddress, TypeError};
use std::path::{Path, PathBuf};

/// Top-level node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// HTTP listen port.
    pub listen_port: u16,
    /// Backing file for the record store. `None` keeps everything in memory.
    pub data_file: Option<PathBuf>,
    /// The resolver's accounts on both chains.
    pub resolver: ResolverConfig,
    /// Upper bound on each escrow confirmation wait.
    pub confirmation_timeout_secs: u64,
    /// Accounts seeded into the dev ledgers at startup.
    pub funding: Vec<FundingEntry>,
}

/// Resolver account addresses, hex-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// 20-byte EVM address.
    pub evm_address: String,
    /// 32-byte Sui address.
    pub sui_address: String,
}

impl ResolverConfig {
    pub fn evm(&self) -> Result<EvmAddress, TypeError> {
        self.evm_address.parse()
    }

    pub fn sui(&self) -> Result<SuiAddress, TypeError> {
        self.sui_address.parse()
    }
}

/// One seeded balance on a dev ledger.
///
/// For the EVM ledger `asset` is a token address and `amount` a fungible
/// balance; for the Sui ledger `asset` is a coin type and `amount` is minted
/// as a single coin object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingEntry {
    /// Account address in the chain's own format.
    pub account: String,
    /// Numeric chain id.
    pub chain: u64,
    /// Token address or coin type.
    pub asset: String,
    /// Amount to seed.
    pub amount: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let resolver = ResolverConfig {
            evm_address: format!("0x{}", "ab".repeat(20)),
            sui_address: format!("0x{}", "cd".repeat(32)),
        };
        // Seed the default resolver with demo liquidity on both ledgers.
        let funding = vec![
            FundingEntry {
                account: resolver.evm_address.clone(),
                chain: 11_155_111,
                asset: format!("0x{}", "ee".repeat(20)),
                amount: 1_000_000,
            },
            FundingEntry {
                account: resolver.sui_address.clone(),
                chain: 101,
                asset: "0x2::sui::SUI".to_string(),
                amount: 1_000_000,
            },
        ];
        Self {
            listen_port: 3000,
            data_file: None,
            resolver,
            confirmation_timeout_secs: 60,
            funding,
        }
    }
}

impl NodeConfig {
    /// Read configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Load from `path` if given, else defaults; then apply env overrides.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        if let Ok(port) = std::env::var("CROSSWAP_PORT") {
            config.listen_port = port.parse()?;
        }
        Ok(config)
    }
}
