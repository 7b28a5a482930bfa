//! # Type Errors
//!
//! Parse and conversion failures for the shared value types.

use thiserror::Error;

/// Errors raised while parsing or converting shared value types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// Address string is not valid for the expected ledger.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Hash string is not 32 bytes of hex.
    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    /// Numeric chain id is not one of the configured chains.
    #[error("Unknown chain id: {0}")]
    UnknownChainId(u64),
}
