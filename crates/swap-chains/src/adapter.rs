//! # Chain Adapter Port
//!
//! The outbound interface the settlement engine drives ledgers through.
//! One implementation per chain; the engine never sees chain-specific
//! detail beyond what these types carry.

use crate::error::ChainError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{AccountId, AssetRef, ChainId, Hash32, OrderId, TxRef};
use std::fmt;
use swap_order::SecretPreimage;

/// Which leg of the swap an escrow backs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscrowRole {
    /// Holds the maker's funds on the source chain.
    Src,
    /// Holds the resolver's counter-value on the destination chain.
    Dst,
}

/// Opaque reference to a deployed escrow (EVM contract address or Sui
/// object id).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EscrowRef(pub String);

impl EscrowRef {
    /// Wrap a rendered address/object id.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl fmt::Display for EscrowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything an escrow is parameterized by. Fixed at deployment; the
/// escrow reference is derived from these fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowImmutables {
    /// The order this escrow settles.
    pub order_id: OrderId,
    /// Hash-lock commitment under this chain's digest family.
    pub commitment: Hash32,
    /// Escrowed amount.
    pub amount: u64,
    /// The escrowed asset.
    pub asset: AssetRef,
    /// Account funding the escrow.
    pub depositor: AccountId,
    /// Account paid on a valid secret reveal.
    pub beneficiary: AccountId,
    /// Absolute ledger time after which only cancellation is possible.
    pub deadline_secs: u64,
    /// Native-asset deposit incentivizing timely execution.
    pub safety_deposit: u64,
    /// Specific fundable unit to draw from, for ledgers whose balances
    /// are discrete objects. `None` lets the adapter choose.
    pub funding_unit: Option<String>,
}

/// Result of a successful escrow deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployReceipt {
    /// The funding transaction.
    pub tx: TxRef,
    /// Reference for later withdraw/cancel calls.
    pub escrow: EscrowRef,
}

/// A discrete spendable unit of an asset (a Sui coin object; EVM balances
/// report a single synthetic unit).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUnit {
    /// Ledger-level identifier of the unit.
    pub id: String,
    /// Value carried by the unit.
    pub amount: u64,
}

/// Terminal confirmation status of a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Reached the chain's required confirmation depth.
    Confirmed {
        /// Ledger time at confirmation.
        at: u64,
    },
    /// Included but reverted; no state change took effect.
    Reverted {
        /// Revert reason reported by the ledger.
        reason: String,
    },
}

/// Uniform ledger interface for the settlement engine.
///
/// Adapters are expected to be cheap to clone behind an `Arc` and safe to
/// drive from multiple settlement tasks concurrently.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// The ledger this adapter fronts.
    fn chain_id(&self) -> ChainId;

    /// Current ledger time in seconds.
    fn now(&self) -> u64;

    /// Deploy and fund an escrow. Debits the depositor.
    async fn deploy_escrow(
        &self,
        role: EscrowRole,
        immutables: EscrowImmutables,
    ) -> Result<DeployReceipt, ChainError>;

    /// Claim an escrow by revealing the secret. Pays the beneficiary.
    ///
    /// Verifies the pre-image under this chain's digest family and rejects
    /// claims after the deadline.
    async fn withdraw(
        &self,
        escrow: &EscrowRef,
        secret: &SecretPreimage,
    ) -> Result<TxRef, ChainError>;

    /// Cancel an expired escrow, returning funds to the depositor.
    async fn cancel(&self, escrow: &EscrowRef) -> Result<TxRef, ChainError>;

    /// Current balance of `asset` held by `account`.
    async fn query_balance(&self, account: &AccountId, asset: &AssetRef)
        -> Result<u64, ChainError>;

    /// Enumerate spendable units of `asset` sufficient to cover `amount`.
    ///
    /// Fails with [`ChainError::InsufficientFunds`] when the account cannot
    /// cover it.
    async fn find_fundable_assets(
        &self,
        account: &AccountId,
        asset: &AssetRef,
        amount: u64,
    ) -> Result<Vec<AssetUnit>, ChainError>;

    /// Wait until `tx` reaches the chain's required confirmation depth.
    async fn wait_for_confirmation(
        &self,
        tx: &TxRef,
        timeout_secs: u64,
    ) -> Result<ConfirmationOutcome, ChainError>;
}
