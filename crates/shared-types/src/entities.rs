//! # Shared Entities
//!
//! Chain identifiers, addresses, hashes, and transaction references.
//!
//! Addresses are carried as raw bytes internally and rendered as `0x`-hex.
//! Parsing is case-insensitive; two addresses that differ only in hex casing
//! compare equal because comparison happens on the decoded bytes.

use crate::errors::TypeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The two ledgers this deployment coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainId {
    /// EVM chain (Sepolia testnet numbering).
    Ethereum,
    /// Sui-style object ledger.
    Sui,
}

impl ChainId {
    /// Numeric chain id used in order payloads.
    pub fn numeric(&self) -> u64 {
        match self {
            ChainId::Ethereum => 11_155_111,
            ChainId::Sui => 101,
        }
    }

    /// Resolve a numeric chain id.
    pub fn from_numeric(id: u64) -> Result<Self, TypeError> {
        match id {
            11_155_111 => Ok(ChainId::Ethereum),
            101 => Ok(ChainId::Sui),
            other => Err(TypeError::UnknownChainId(other)),
        }
    }

    /// Confirmations required before a transaction is treated as final.
    pub fn required_confirmations(&self) -> u64 {
        match self {
            ChainId::Ethereum => 2,
            ChainId::Sui => 1,
        }
    }

    /// Estimated block/checkpoint interval in seconds.
    pub fn block_time_secs(&self) -> u64 {
        match self {
            ChainId::Ethereum => 12,
            ChainId::Sui => 1,
        }
    }

    /// The counterpart ledger in a two-chain swap.
    pub fn counterpart(&self) -> ChainId {
        match self {
            ChainId::Ethereum => ChainId::Sui,
            ChainId::Sui => ChainId::Ethereum,
        }
    }
}

fn decode_fixed<const N: usize>(s: &str) -> Option<[u8; N]> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    if stripped.len() != N * 2 {
        return None;
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(stripped.to_ascii_lowercase(), &mut out).ok()?;
    Some(out)
}

macro_rules! hex_bytes_type {
    ($name:ident, $len:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Lowercase `0x`-prefixed hex rendering.
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                decode_fixed::<$len>(s)
                    .map($name)
                    .ok_or_else(|| TypeError::InvalidAddress(s.to_string()))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_bytes_type!(EvmAddress, 20, "A 20-byte EVM account address.");
hex_bytes_type!(SuiAddress, 32, "A 32-byte Sui-style account address.");
hex_bytes_type!(Hash32, 32, "A 32-byte hash (commitment, order hash, escrow salt).");

/// The canonical order identifier: the order's commitment hash.
pub type OrderId = Hash32;

/// An opaque transaction reference (EVM tx hash or Sui digest).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxRef(pub String);

impl TxRef {
    /// Create a reference from a rendered hash/digest.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl fmt::Display for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxRef({})", self.0)
    }
}

/// A chain-qualified account identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountId {
    /// Account on the EVM chain.
    Evm(EvmAddress),
    /// Account on the Sui-style ledger.
    Sui(SuiAddress),
}

impl AccountId {
    /// The ledger this account lives on.
    pub fn chain(&self) -> ChainId {
        match self {
            AccountId::Evm(_) => ChainId::Ethereum,
            AccountId::Sui(_) => ChainId::Sui,
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountId::Evm(a) => a.fmt(f),
            AccountId::Sui(a) => a.fmt(f),
        }
    }
}

/// A chain-qualified asset reference.
///
/// EVM assets are token contract addresses; Sui assets are coin type tags
/// (e.g. `0x2::silver::SILVER`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetRef {
    /// ERC-20 style token contract.
    Token(EvmAddress),
    /// Move coin type tag.
    CoinType(String),
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetRef::Token(a) => a.fmt(f),
            AssetRef::CoinType(t) => f.write_str(t),
        }
    }
}
