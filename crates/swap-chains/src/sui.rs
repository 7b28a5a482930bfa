//! In-memory Sui chain adapter.
//!
//! Models a Move-based ledger: balances are discrete coin objects that must
//! be selected and split to fund an escrow, escrow references are object
//! ids, and secrets verify under SHA-256.

use crate::adapter::{
    AssetUnit, ChainAdapter, ConfirmationOutcome, DeployReceipt, EscrowImmutables, EscrowRef,
    EscrowRole,
};
use crate::error::ChainError;
use async_trait::async_trait;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use shared_types::{AccountId, AssetRef, ChainId, TxRef};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use swap_order::{verify, HashFamily, SecretPreimage};
use tracing::{debug, info};

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

/// In-memory Sui ledger.
///
/// In production this would build programmable transaction blocks against a
/// fullnode.
pub struct InMemorySuiChain {
    /// Deployed escrows by object id.
    escrows: RwLock<HashMap<EscrowRef, EscrowData>>,
    /// Coin objects per (owner, coin type).
    coins: RwLock<HashMap<(AccountId, String), Vec<AssetUnit>>>,
    /// Submitted transactions.
    txs: RwLock<HashSet<TxRef>>,
    /// Transactions that never reach confirmation depth (test hook).
    held_txs: RwLock<HashSet<TxRef>>,
    /// While set, newly submitted transactions are held.
    hold_confirmations: AtomicBool,
    /// Ledger time (for timestamp simulation).
    current_time: RwLock<u64>,
    /// Monotonic counter salting tx digests and minted object ids.
    counter: AtomicU64,
}

impl InMemorySuiChain {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            escrows: RwLock::new(HashMap::new()),
            coins: RwLock::new(HashMap::new()),
            txs: RwLock::new(HashSet::new()),
            held_txs: RwLock::new(HashSet::new()),
            hold_confirmations: AtomicBool::new(false),
            current_time: RwLock::new(1_700_000_000),
            counter: AtomicU64::new(0),
        }
    }

    /// Initialize with owned coin objects for testing.
    pub fn with_coins(coins: &[(AccountId, &str, &[(&str, u64)])]) -> Self {
        let chain = Self::new();
        {
            let mut map = chain.coins.write();
            for (owner, coin_type, objects) in coins {
                let units = objects
                    .iter()
                    .map(|(id, amount)| AssetUnit {
                        id: (*id).to_string(),
                        amount: *amount,
                    })
                    .collect();
                map.insert((*owner, (*coin_type).to_string()), units);
            }
        }
        chain
    }

    /// Mint a fresh coin object of the given type into an account.
    pub fn fund(&self, owner: AccountId, coin_type: &str, amount: u64) {
        let unit = AssetUnit {
            id: self.mint_object_id("coin"),
            amount,
        };
        self.coins
            .write()
            .entry((owner, coin_type.to_string()))
            .or_default()
            .push(unit);
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
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let mut hasher = Sha256::new();
        hasher.update(tag.as_bytes());
        hasher.update(payload);
        hasher.update(n.to_le_bytes());
        let tx = TxRef::new(hex::encode(hasher.finalize()));

        self.txs.write().insert(tx.clone());
        if self.hold_confirmations.load(Ordering::SeqCst) {
            self.held_txs.write().insert(tx.clone());
        }
        tx
    }

    fn mint_object_id(&self, tag: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{tag}-{n}")
    }

    /// Credit `amount` of `coin_type` to `owner` as a fresh coin object.
    fn mint_coin(&self, owner: AccountId, coin_type: &str, amount: u64) -> String {
        let id = self.mint_object_id("coin");
        self.coins
            .write()
            .entry((owner, coin_type.to_string()))
            .or_default()
            .push(AssetUnit {
                id: id.clone(),
                amount,
            });
        id
    }

    fn coin_type_of(asset: &AssetRef) -> Result<&str, ChainError> {
        match asset {
            AssetRef::CoinType(t) => Ok(t),
            AssetRef::Token(_) => Err(ChainError::UnsupportedAsset(asset.to_string())),
        }
    }
}

impl Default for InMemorySuiChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive the escrow's object id from its immutables.
fn escrow_object_id(immutables: &EscrowImmutables) -> EscrowRef {
    let mut hasher = Sha256::new();
    hasher.update(immutables.order_id.0);
    hasher.update(immutables.commitment.0);
    hasher.update(immutables.amount.to_le_bytes());
    hasher.update(immutables.asset.to_string().as_bytes());
    hasher.update(immutables.depositor.to_string().as_bytes());
    hasher.update(immutables.beneficiary.to_string().as_bytes());
    hasher.update(immutables.deadline_secs.to_le_bytes());
    EscrowRef::new(format!("0x{}", hex::encode(hasher.finalize())))
}

#[async_trait]
impl ChainAdapter for InMemorySuiChain {
    fn chain_id(&self) -> ChainId {
        ChainId::Sui
    }

    fn now(&self) -> u64 {
        *self.current_time.read()
    }

    async fn deploy_escrow(
        &self,
        role: EscrowRole,
        immutables: EscrowImmutables,
    ) -> Result<DeployReceipt, ChainError> {
        let coin_type = Self::coin_type_of(&immutables.asset)?.to_string();
        let key = (immutables.depositor, coin_type.clone());

        // Select and consume coin objects covering the amount. A named
        // funding unit is spent first; remaining value comes back to the
        // depositor as a change coin (the split).
        let change = {
            let mut coins = self.coins.write();
            let owned = coins.entry(key).or_default();

            let mut selected: Vec<usize> = Vec::new();
            let mut gathered: u64 = 0;
            if let Some(unit_id) = &immutables.funding_unit {
                if let Some(idx) = owned.iter().position(|c| &c.id == unit_id) {
                    gathered += owned[idx].amount;
                    selected.push(idx);
                }
            }
            for (idx, coin) in owned.iter().enumerate() {
                if gathered >= immutables.amount {
                    break;
                }
                if selected.contains(&idx) {
                    continue;
                }
                gathered += coin.amount;
                selected.push(idx);
            }

            if gathered < immutables.amount {
                return Err(ChainError::InsufficientFunds {
                    needed: immutables.amount,
                    available: gathered,
                });
            }

            selected.sort_unstable();
            for idx in selected.into_iter().rev() {
                owned.remove(idx);
            }
            gathered - immutables.amount
        };
        if change > 0 {
            self.mint_coin(immutables.depositor, &coin_type, change);
        }

        let escrow = escrow_object_id(&immutables);
        let tx = self.submit_tx("deploy", escrow.0.as_bytes());

        info!(escrow = %escrow, role = ?role, order_id = %immutables.order_id, "Escrow object created");

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
        debug!(escrow = %escrow, "Withdrawing escrow object");

        let (beneficiary, coin_type, amount) = {
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
            if !verify(HashFamily::Sha256, secret, &data.immutables.commitment) {
                return Err(ChainError::InvalidSecret);
            }
            let current = *self.current_time.read();
            if current > data.immutables.deadline_secs {
                return Err(ChainError::EscrowExpired);
            }

            data.state = EscrowState::Claimed;
            let coin_type = Self::coin_type_of(&data.immutables.asset)?.to_string();
            (data.immutables.beneficiary, coin_type, data.immutables.amount)
        };

        self.mint_coin(beneficiary, &coin_type, amount);
        Ok(self.submit_tx("withdraw", escrow.0.as_bytes()))
    }

    async fn cancel(&self, escrow: &EscrowRef) -> Result<TxRef, ChainError> {
        debug!(escrow = %escrow, "Cancelling escrow object");

        let (depositor, coin_type, amount) = {
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
            let coin_type = Self::coin_type_of(&data.immutables.asset)?.to_string();
            (data.immutables.depositor, coin_type, data.immutables.amount)
        };

        self.mint_coin(depositor, &coin_type, amount);
        Ok(self.submit_tx("cancel", escrow.0.as_bytes()))
    }

    async fn query_balance(
        &self,
        account: &AccountId,
        asset: &AssetRef,
    ) -> Result<u64, ChainError> {
        let coin_type = Self::coin_type_of(asset)?;
        Ok(self
            .coins
            .read()
            .get(&(*account, coin_type.to_string()))
            .map(|owned| owned.iter().map(|c| c.amount).sum())
            .unwrap_or(0))
    }

    async fn find_fundable_assets(
        &self,
        account: &AccountId,
        asset: &AssetRef,
        amount: u64,
    ) -> Result<Vec<AssetUnit>, ChainError> {
        let coin_type = Self::coin_type_of(asset)?;
        let coins = self.coins.read();
        let owned = coins
            .get(&(*account, coin_type.to_string()))
            .cloned()
            .unwrap_or_default();

        let mut selected = Vec::new();
        let mut gathered = 0u64;
        for coin in owned {
            if gathered >= amount {
                break;
            }
            gathered += coin.amount;
            selected.push(coin);
        }

        if gathered < amount {
            return Err(ChainError::InsufficientFunds {
                needed: amount,
                available: gathered,
            });
        }
        Ok(selected)
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
