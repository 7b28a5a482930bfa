//! # Shared Types
//!
//! Common value types for the Crosswap swap coordination suite.
//!
//! Every subsystem (order model, chain adapters, settlement, relayer) speaks
//! in terms of these definitions. Nothing here has behavior beyond parsing,
//! formatting, and per-chain constants.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entities;
pub mod errors;

pub use entities::{
    AccountId, AssetRef, ChainId, EvmAddress, Hash32, OrderId, SuiAddress, TxRef,
};
pub use errors::TypeError;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
