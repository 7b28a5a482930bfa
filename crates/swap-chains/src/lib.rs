//! # Swap Chains
//!
//! The ledger boundary of the system: a uniform [`ChainAdapter`] port the
//! settlement engine drives, plus one in-memory adapter per supported chain.
//!
//! ## Module Structure
//!
//! ```text
//! swap-chains/
//! ├── adapter/   # ChainAdapter port, escrow immutables, receipts
//! ├── error/     # ChainError taxonomy
//! ├── evm/       # Fungible-balance EVM adapter (Keccak-256 hash locks)
//! └── sui/       # Coin-object Sui adapter (SHA-256 hash locks)
//! ```
//!
//! The two adapters deliberately differ where the ledgers differ: the EVM
//! adapter draws from fungible balances, the Sui adapter selects and splits
//! discrete coin objects; each verifies secrets under its own digest family.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod error;
pub mod evm;
pub mod sui;

pub use adapter::{
    AssetUnit, ChainAdapter, ConfirmationOutcome, DeployReceipt, EscrowImmutables, EscrowRef,
    EscrowRole,
};
pub use error::ChainError;
pub use evm::InMemoryEvmChain;
pub use sui::InMemorySuiChain;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
