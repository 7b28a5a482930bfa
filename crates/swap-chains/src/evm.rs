//! In-memory EVM chain adapter.
//!
//! Models the EVM escrow factory: account balances are fungible, escrow
//! references are deterministic contract addresses derived from the escrow
//! immutables, and secrets verify under Keccak-256.

use crate::adapter::{
    AssetUnit, ChainAdapter, ConfirmationOutcome, DeployReceipt, EscrowImmutables, EscrowRef,
    EscrowRole,
};
use crate::error::ChainError;
use async_trait::async_trait;
use parking_lot::RwLock;
use sha3::{Digest, Keccak256};
use shared_types::{AccountId, AssetRef, ChainId, TxRef};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use swap_order::{verify, HashFamily, SecretPreimage};
use tracing::{debug, info};

/// Internal escrow record.
#[derive(Clone, Debug)]
struct EscrowData {
    immutables: EscrowImmutables,
    state: EscrowState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EscrowState {
    Locked,
    Claimed,
    Refunded,
}

/// In-memory EVM ledger.
///
/// In production this would submit transactions through an RPC provider.
pub struct InMemoryEvmChain {
    /// Deployed escrows by reference.
    escrows: RwLock<HashMap<EscrowRef, EscrowData>>,
    /// Fungible balances per (account, token).
    balances: RwLock<HashMap<(AccountId, AssetRef), u64>>,
    /// Submitted transactions.
    txs: RwLock<HashSet<TxRef>>,
    /// Transactions that never reach confirmation depth (test hook).
    held_txs: RwLock<HashSet<TxRef>>,
    /// While set, newly submitted transactions are held.
    hold_confirmations: AtomicBool,
    /// Ledger time (for timestamp simulation).
    current_time: RwLock<u64>,
    /// Monotonic counter salting tx references.
    tx_counter: AtomicU64,
}

impl InMemoryEvmChain {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            escrows: RwLock::new(HashMap::new()),
            balances: RwLock::new(HashMap::new()),
            txs: RwLock::new(HashSet::new()),
            held_txs: RwLock::new(HashSet::new()),
            hold_confirmations: AtomicBool::new(false),
            current_time: RwLock::new(1_700_000_000),
            tx_counter: AtomicU64::new(0),
        }
    }

    /// Initialize with funded accounts for testing.
    pub fn with_balances(balances: &[(AccountId, AssetRef, u64)]) -> Self {
        let chain = Self::new();
        {
            let mut map = chain.balances.write();
            for (account, asset, amount) in balances {
                map.insert((*account, asset.clone()), *amount);
            }
        }
        chain
    }

    /// Credit an account, adding to any existing balance.
    pub fn credit(&self, account: AccountId, asset: AssetRef, amount: u64) {
        let mut balances = self.balances.write();
        *balances.entry((account, asset)).or_insert(0) += amount;
    }

    /// Set current time for testing.
    pub fn set_time(&self, time: u64) {
        *self.current_time.write() = time;
    }

    /// Advance time for testing.
    pub fn advance_time(&self, secs: u64) {
        *self.current_time.write() += secs;
    }

    /// While enabled, new transactions never confirm (test hook).
    pub fn set_confirmation_hold(&self, hold: bool) {
        self.hold_confirmations.store(hold, Ordering::SeqCst);
    }

    fn submit_tx(&self, tag: &str, payload: &[u8]) -> TxRef {
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst);
        let mut hasher = Keccak256::new();
        hasher.update(tag.as_bytes());
        hasher.update(payload);
        hasher.update(n.to_le_bytes());
        let tx = TxRef::new(format!("0x{}", hex::encode(hasher.finalize())));

        self.txs.write().insert(tx.clone());
        if self.hold_confirmations.load(Ordering::SeqCst) {
            self.held_txs.write().insert(tx.clone());
        }
        tx
    }
}

impl Default for InMemoryEvmChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive the escrow's deterministic contract address from its immutables.
fn escrow_address(immutables: &EscrowImmutables) -> EscrowRef {
    let mut hasher = Keccak256::new();
    hasher.update(immutables.order_id.0);
    hasher.update(immutables.commitment.0);
    hasher.update(immutables.amount.to_le_bytes());
    hasher.update(immutables.asset.to_string().as_bytes());
    hasher.update(immutables.depositor.to_string().as_bytes());
    hasher.update(immutables.beneficiary.to_string().as_bytes());
    hasher.update(immutables.deadline_secs.to_le_bytes());
    let digest = hasher.finalize();
    EscrowRef::new(format!("0x{}", hex::encode(&digest[12..])))
}

#[async_trait]
impl ChainAdapter for InMemoryEvmChain {
    fn chain_id(&self) -> ChainId {
        ChainId::Ethereum
    }

    fn now(&self) -> u64 {
        *self.current_time.read()
    }

    async fn deploy_escrow(
        &self,
        role: EscrowRole,
        immutables: EscrowImmutables,
    ) -> Result<DeployReceipt, ChainError> {
        if !matches!(immutables.asset, AssetRef::Token(_)) {
            return Err(ChainError::UnsupportedAsset(immutables.asset.to_string()));
        }

        let key = (immutables.depositor, immutables.asset.clone());
        {
            let mut balances = self.balances.write();
            let available = balances.get(&key).copied().unwrap_or(0);
            if available < immutables.amount {
                return Err(ChainError::InsufficientFunds {
                    needed: immutables.amount,
                    available,
                });
            }
            balances.insert(key, available - immutables.amount);
        }

        let escrow = escrow_address(&immutables);
        let tx = self.submit_tx("deploy", escrow.0.as_bytes());

        info!(escrow = %escrow, role = ?role, order_id = %immutables.order_id, "Escrow deployed");

        self.escrows.write().insert(
            escrow.clone(),
            EscrowData {
                immutables,
                state: EscrowState::Locked,
            },
        );

        Ok(DeployReceipt { tx, escrow })
    }

    async fn withdraw(
        &self,
        escrow: &EscrowRef,
        secret: &SecretPreimage,
    ) -> Result<TxRef, ChainError> {
        debug!(escrow = %escrow, "Withdrawing escrow");

        let mut escrows = self.escrows.write();
        let data = escrows
            .get_mut(escrow)
            .ok_or_else(|| ChainError::EscrowNotFound(escrow.to_string()))?;

        if data.state != EscrowState::Locked {
            return Err(ChainError::SubmissionFailed(format!(
                "escrow in state {:?}",
                data.state
            )));
        }
        if !verify(HashFamily::Keccak256, secret, &data.immutables.commitment) {
            return Err(ChainError::InvalidSecret);
        }
        let current = *self.current_time.read();
        if current > data.immutables.deadline_secs {
            return Err(ChainError::EscrowExpired);
        }

        data.state = EscrowState::Claimed;
        let key = (data.immutables.beneficiary, data.immutables.asset.clone());
        let amount = data.immutables.amount;
        drop(escrows);

        let mut balances = self.balances.write();
        *balances.entry(key).or_insert(0) += amount;

        Ok(self.submit_tx("withdraw", escrow.0.as_bytes()))
    }

    async fn cancel(&self, escrow: &EscrowRef) -> Result<TxRef, ChainError> {
        debug!(escrow = %escrow, "Cancelling escrow");

        let mut escrows = self.escrows.write();
        let data = escrows
            .get_mut(escrow)
            .ok_or_else(|| ChainError::EscrowNotFound(escrow.to_string()))?;

        if data.state != EscrowState::Locked {
            return Err(ChainError::SubmissionFailed(format!(
                "escrow in state {:?}",
                data.state
            )));
        }
        let current = *self.current_time.read();
        if current <= data.immutables.deadline_secs {
            return Err(ChainError::EscrowNotExpired);
        }

        data.state = EscrowState::Refunded;
        let key = (data.immutables.depositor, data.immutables.asset.clone());
        let amount = data.immutables.amount;
        drop(escrows);

        let mut balances = self.balances.write();
        *balances.entry(key).or_insert(0) += amount;

        Ok(self.submit_tx("cancel", escrow.0.as_bytes()))
    }

    async fn query_balance(
        &self,
        account: &AccountId,
        asset: &AssetRef,
    ) -> Result<u64, ChainError> {
        if !matches!(asset, AssetRef::Token(_)) {
            return Err(ChainError::UnsupportedAsset(asset.to_string()));
        }
        Ok(self
            .balances
            .read()
            .get(&(*account, asset.clone()))
            .copied()
            .unwrap_or(0))
    }

    async fn find_fundable_assets(
        &self,
        account: &AccountId,
        asset: &AssetRef,
        amount: u64,
    ) -> Result<Vec<AssetUnit>, ChainError> {
        let available = self.query_balance(account, asset).await?;
        if available < amount {
            return Err(ChainError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        // Fungible balance: one synthetic unit covers any amount.
        Ok(vec![AssetUnit {
            id: format!("{account}:{asset}"),
            amount: available,
        }])
    }

    async fn wait_for_confirmation(
        &self,
        tx: &TxRef,
        timeout_secs: u64,
    ) -> Result<ConfirmationOutcome, ChainError> {
        if !self.txs.read().contains(tx) {
            return Err(ChainError::SubmissionFailed(format!(
                "unknown transaction {tx}"
            )));
        }
        if self.held_txs.read().contains(tx) {
            return Err(ChainError::ConfirmationTimeout {
                tx: tx.clone(),
                waited_secs: timeout_secs,
            });
        }
        Ok(ConfirmationOutcome::Confirmed { at: self.now() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{EvmAddress, Hash32};
    use swap_order::commit;

    fn depositor() -> AccountId {
        AccountId::Evm(EvmAddress([0x01; 20]))
    }

    fn beneficiary() -> AccountId {
        AccountId::Evm(EvmAddress([0x02; 20]))
    }

    fn token() -> AssetRef {
        AssetRef::Token(EvmAddress([0xEE; 20]))
    }

    fn funded_chain() -> InMemoryEvmChain {
        InMemoryEvmChain::with_balances(&[(depositor(), token(), 10_000)])
    }

    fn immutables(secret: &SecretPreimage, chain: &InMemoryEvmChain) -> EscrowImmutables {
        EscrowImmutables {
            order_id: Hash32([0xAB; 32]),
            commitment: commit(HashFamily::Keccak256, secret),
            amount: 1_000,
            asset: token(),
            depositor: depositor(),
            beneficiary: beneficiary(),
            deadline_secs: chain.now() + 121,
            safety_deposit: 10,
            funding_unit: None,
        }
    }

    #[tokio::test]
    async fn test_deploy_debits_depositor() {
        let chain = funded_chain();
        let secret = SecretPreimage::from_utf8("evm test secret");

        chain
            .deploy_escrow(EscrowRole::Src, immutables(&secret, &chain))
            .await
            .unwrap();

        let balance = chain.query_balance(&depositor(), &token()).await.unwrap();
        assert_eq!(balance, 9_000);
    }

    #[tokio::test]
    async fn test_deploy_insufficient_funds() {
        let chain = InMemoryEvmChain::with_balances(&[(depositor(), token(), 5)]);
        let secret = SecretPreimage::from_utf8("evm test secret");

        let result = chain
            .deploy_escrow(EscrowRole::Src, immutables(&secret, &chain))
            .await;
        assert!(matches!(
            result,
            Err(ChainError::InsufficientFunds { needed: 1_000, available: 5 })
        ));
    }

    #[tokio::test]
    async fn test_withdraw_with_valid_secret() {
        let chain = funded_chain();
        let secret = SecretPreimage::from_utf8("evm test secret");
        let receipt = chain
            .deploy_escrow(EscrowRole::Src, immutables(&secret, &chain))
            .await
            .unwrap();

        chain.withdraw(&receipt.escrow, &secret).await.unwrap();

        let balance = chain.query_balance(&beneficiary(), &token()).await.unwrap();
        assert_eq!(balance, 1_000);
    }

    #[tokio::test]
    async fn test_withdraw_with_wrong_secret_fails() {
        let chain = funded_chain();
        let secret = SecretPreimage::from_utf8("evm test secret");
        let receipt = chain
            .deploy_escrow(EscrowRole::Src, immutables(&secret, &chain))
            .await
            .unwrap();

        let wrong = SecretPreimage::from_utf8("not the secret");
        let result = chain.withdraw(&receipt.escrow, &wrong).await;
        assert!(matches!(result, Err(ChainError::InvalidSecret)));
    }

    #[tokio::test]
    async fn test_withdraw_after_deadline_fails() {
        let chain = funded_chain();
        let secret = SecretPreimage::from_utf8("evm test secret");
        let receipt = chain
            .deploy_escrow(EscrowRole::Src, immutables(&secret, &chain))
            .await
            .unwrap();

        chain.advance_time(200);

        let result = chain.withdraw(&receipt.escrow, &secret).await;
        assert!(matches!(result, Err(ChainError::EscrowExpired)));
    }

    #[tokio::test]
    async fn test_double_withdraw_fails() {
        let chain = funded_chain();
        let secret = SecretPreimage::from_utf8("evm test secret");
        let receipt = chain
            .deploy_escrow(EscrowRole::Src, immutables(&secret, &chain))
            .await
            .unwrap();

        chain.withdraw(&receipt.escrow, &secret).await.unwrap();
        let result = chain.withdraw(&receipt.escrow, &secret).await;
        assert!(matches!(result, Err(ChainError::SubmissionFailed(_))));
    }

    #[tokio::test]
    async fn test_cancel_before_deadline_fails() {
        let chain = funded_chain();
        let secret = SecretPreimage::from_utf8("evm test secret");
        let receipt = chain
            .deploy_escrow(EscrowRole::Src, immutables(&secret, &chain))
            .await
            .unwrap();

        let result = chain.cancel(&receipt.escrow).await;
        assert!(matches!(result, Err(ChainError::EscrowNotExpired)));
    }

    #[tokio::test]
    async fn test_cancel_after_deadline_refunds() {
        let chain = funded_chain();
        let secret = SecretPreimage::from_utf8("evm test secret");
        let receipt = chain
            .deploy_escrow(EscrowRole::Src, immutables(&secret, &chain))
            .await
            .unwrap();

        chain.advance_time(200);
        chain.cancel(&receipt.escrow).await.unwrap();

        let balance = chain.query_balance(&depositor(), &token()).await.unwrap();
        assert_eq!(balance, 10_000);
    }

    #[tokio::test]
    async fn test_confirmation_hold_times_out() {
        let chain = funded_chain();
        let secret = SecretPreimage::from_utf8("evm test secret");

        chain.set_confirmation_hold(true);
        let receipt = chain
            .deploy_escrow(EscrowRole::Src, immutables(&secret, &chain))
            .await
            .unwrap();

        let result = chain.wait_for_confirmation(&receipt.tx, 30).await;
        assert!(matches!(result, Err(ChainError::ConfirmationTimeout { .. })));
    }

    #[tokio::test]
    async fn test_confirmation_default() {
        let chain = funded_chain();
        let secret = SecretPreimage::from_utf8("evm test secret");
        let receipt = chain
            .deploy_escrow(EscrowRole::Src, immutables(&secret, &chain))
            .await
            .unwrap();

        let outcome = chain.wait_for_confirmation(&receipt.tx, 30).await.unwrap();
        assert!(matches!(outcome, ConfirmationOutcome::Confirmed { .. }));
    }

    #[tokio::test]
    async fn test_coin_asset_unsupported() {
        let chain = funded_chain();
        let asset = AssetRef::CoinType("0x2::sui::SUI".to_string());
        let result = chain.query_balance(&depositor(), &asset).await;
        assert!(matches!(result, Err(ChainError::UnsupportedAsset(_))));
    }

    #[tokio::test]
    async fn test_fundable_assets_single_unit() {
        let chain = funded_chain();
        let units = chain
            .find_fundable_assets(&depositor(), &token(), 500)
            .await
            .unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].amount, 10_000);
    }
}
