//! Settlement failure taxonomy.
//!
//! Every variant is settlement-fatal: the engine never retries and never
//! rolls back chain state. The failure tag is persisted verbatim in the
//! order's status record so operators can triage without log archaeology.

use shared_types::OrderId;
use swap_chains::ChainError;
use swap_registry::RegistryError;
use swap_store::StoreError;
use thiserror::Error;

/// Errors aborting a settlement run.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// Another worker already owns this order (lost the claim race).
    #[error("Order {0} already claimed by another resolver")]
    AlreadyClaimed(OrderId),

    /// No adapter is wired for the chain the order needs.
    #[error("No chain adapter for {0}")]
    UnsupportedChain(String),

    /// An order party's proxy address has no registered counterpart identity.
    #[error("Unmapped identity: {0}")]
    UnmappedIdentity(String),

    /// The relayer holds no secret record for this order.
    #[error("No secret recorded for order {0}")]
    SecretUnavailable(OrderId),

    /// The recorded secret does not reproduce the order's commitments.
    #[error("Recorded secret does not match commitments of order {0}")]
    SecretMismatch(OrderId),

    /// A confirmed transaction reverted on-chain.
    #[error("Transaction reverted: {0}")]
    TransactionReverted(String),

    /// Ledger-level failure (funds, submission, secrets, expiry, timeouts).
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Settlement ledger failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Address mapping registry failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl SettlementError {
    /// Stable tag prefixed to the persisted failure detail.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::AlreadyClaimed(_) => "AlreadyClaimed",
            Self::UnsupportedChain(_) => "UnsupportedChain",
            Self::UnmappedIdentity(_) => "UnmappedIdentity",
            Self::SecretUnavailable(_) => "SecretUnavailable",
            Self::SecretMismatch(_) => "SecretMismatch",
            Self::TransactionReverted(_) => "TransactionReverted",
            Self::Chain(ChainError::InsufficientFunds { .. }) => "InsufficientFunds",
            Self::Chain(ChainError::SubmissionFailed(_)) => "SubmissionFailed",
            Self::Chain(ChainError::InvalidSecret) => "InvalidSecret",
            Self::Chain(ChainError::EscrowNotFound(_)) => "EscrowNotFound",
            Self::Chain(ChainError::EscrowExpired) => "EscrowExpired",
            Self::Chain(ChainError::EscrowNotExpired) => "EscrowNotExpired",
            Self::Chain(ChainError::ConfirmationTimeout { .. }) => "ConfirmationTimeout",
            Self::Chain(ChainError::UnsupportedAsset(_)) => "UnsupportedAsset",
            Self::Store(_) => "StoreError",
            Self::Registry(_) => "RegistryError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Hash32;

    #[test]
    fn test_tags_are_stable() {
        let e = SettlementError::AlreadyClaimed(Hash32([0; 32]));
        assert_eq!(e.tag(), "AlreadyClaimed");

        let e = SettlementError::Chain(ChainError::InvalidSecret);
        assert_eq!(e.tag(), "InvalidSecret");

        let e = SettlementError::Chain(ChainError::ConfirmationTimeout {
            tx: shared_types::TxRef::new("0x1"),
            waited_secs: 5,
        });
        assert_eq!(e.tag(), "ConfirmationTimeout");
    }
}
