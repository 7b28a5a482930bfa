//! Chain adapter failure taxonomy.

use shared_types::TxRef;
use thiserror::Error;

/// Errors surfaced by a chain adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The depositor cannot cover the escrow amount.
    #[error("Insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds {
        /// Amount the escrow requires.
        needed: u64,
        /// Amount the account holds.
        available: u64,
    },

    /// The ledger rejected the transaction outright.
    #[error("Transaction submission failed: {0}")]
    SubmissionFailed(String),

    /// The revealed pre-image does not hash to the escrow's commitment.
    #[error("Secret does not match the escrow commitment")]
    InvalidSecret,

    /// No escrow exists under the given reference.
    #[error("Escrow not found: {0}")]
    EscrowNotFound(String),

    /// The escrow's claim window has closed.
    #[error("Escrow expired, claim window closed")]
    EscrowExpired,

    /// Cancellation attempted while the escrow is still claimable.
    #[error("Escrow not yet expired, cancellation unavailable")]
    EscrowNotExpired,

    /// The transaction did not reach the required confirmation depth in time.
    #[error("Confirmation timeout for {tx} after {waited_secs}s")]
    ConfirmationTimeout {
        /// The transaction that never confirmed.
        tx: TxRef,
        /// How long the adapter waited.
        waited_secs: u64,
    },

    /// The adapter cannot handle the referenced asset.
    #[error("Unsupported asset: {0}")]
    UnsupportedAsset(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = ChainError::InsufficientFunds {
            needed: 100,
            available: 5,
        };
        assert!(e.to_string().contains("needed 100"));

        let e = ChainError::ConfirmationTimeout {
            tx: TxRef::new("0xabc"),
            waited_secs: 30,
        };
        assert!(e.to_string().contains("0xabc"));
    }
}
