//! # Order Settlement Status Ledger
//!
//! Durable mapping from order id to settlement state. Multiple resolver
//! workers share this ledger; the `Pending → Filling` transition is a
//! compare-and-swap under a store-level lock so exactly one worker owns any
//! given order. Everything after the claim is single-writer: only the
//! orchestrator that won the claim mutates the record, and it writes a
//! terminal phase exactly once.

use crate::ports::{RecordStore, RecordStoreExt, StoreError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared_types::{OrderId, TxRef};
use std::sync::Arc;
use tracing::debug;

const COLLECTION: &str = "settlement_statuses";

/// Settlement lifecycle phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementPhase {
    /// Dispatched, no resolver has claimed it.
    #[default]
    Pending,
    /// A resolver owns the order and is driving settlement.
    Filling,
    /// Terminal: all four transaction references recorded.
    Filled,
    /// Terminal: settlement aborted; partial state preserved.
    Failed,
}

impl SettlementPhase {
    /// Whether the phase admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Failed)
    }
}

/// The transaction references accumulated during a settlement run.
///
/// Populated incrementally; on failure whatever was obtained before the
/// error is preserved (on-chain steps cannot be rolled back).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRefSet {
    /// Source escrow funding transaction.
    pub src_escrow_tx: Option<TxRef>,
    /// Destination escrow funding transaction.
    pub dst_escrow_tx: Option<TxRef>,
    /// Destination withdrawal (the secret-revealing transaction).
    pub dst_claim_tx: Option<TxRef>,
    /// Source withdrawal (resolver claiming its counter-value).
    pub src_claim_tx: Option<TxRef>,
}

impl TxRefSet {
    /// Whether every settlement step produced a reference.
    pub fn is_complete(&self) -> bool {
        self.src_escrow_tx.is_some()
            && self.dst_escrow_tx.is_some()
            && self.dst_claim_tx.is_some()
            && self.src_claim_tx.is_some()
    }
}

/// Persisted settlement status for one order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SettlementStatus {
    /// The order this status tracks.
    pub order_id: OrderId,
    /// Current phase.
    pub phase: SettlementPhase,
    /// Transaction references obtained so far.
    pub tx_refs: TxRefSet,
    /// Failure taxonomy tag plus human-readable detail (terminal failures).
    pub error_detail: Option<String>,
}

impl SettlementStatus {
    fn pending(order_id: OrderId) -> Self {
        Self {
            order_id,
            phase: SettlementPhase::Pending,
            tx_refs: TxRefSet::default(),
            error_detail: None,
        }
    }
}

/// Shared settlement status ledger.
pub struct StatusStore {
    store: Arc<dyn RecordStore>,
    // Serializes read-modify-write cycles across workers in this process.
    claim_lock: Mutex<()>,
}

impl StatusStore {
    /// Wrap a record store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            claim_lock: Mutex::new(()),
        }
    }

    /// Create the `Pending` record when an order is dispatched. Idempotent:
    /// an existing record (any phase) is left untouched.
    pub fn create_pending(&self, order_id: OrderId) -> Result<(), StoreError> {
        let _guard = self.claim_lock.lock();
        match self
            .store
            .put_if_absent(COLLECTION, &order_id.to_hex(), &SettlementStatus::pending(order_id))
        {
            Ok(()) => Ok(()),
            Err(StoreError::AlreadyExists { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Compare-and-swap claim: `Pending → Filling`.
    ///
    /// Returns `true` if this caller now owns the settlement, `false` if the
    /// order is unknown, already claimed, or already terminal.
    pub fn try_claim(&self, order_id: &OrderId) -> Result<bool, StoreError> {
        let _guard = self.claim_lock.lock();
        let key = order_id.to_hex();
        let Some(mut status) = self.store.get::<SettlementStatus>(COLLECTION, &key)? else {
            return Ok(false);
        };
        if status.phase != SettlementPhase::Pending {
            debug!(order_id = %order_id, phase = ?status.phase, "Claim lost, order not pending");
            return Ok(false);
        }
        status.phase = SettlementPhase::Filling;
        self.store.put(COLLECTION, &key, &status)?;
        Ok(true)
    }

    /// Record terminal success with the full reference set.
    pub fn complete(&self, order_id: &OrderId, tx_refs: TxRefSet) -> Result<(), StoreError> {
        let _guard = self.claim_lock.lock();
        let status = SettlementStatus {
            order_id: *order_id,
            phase: SettlementPhase::Filled,
            tx_refs,
            error_detail: None,
        };
        self.store.put(COLLECTION, &order_id.to_hex(), &status)
    }

    /// Record terminal failure, preserving partial references.
    pub fn fail(
        &self,
        order_id: &OrderId,
        tx_refs: TxRefSet,
        error_detail: String,
    ) -> Result<(), StoreError> {
        let _guard = self.claim_lock.lock();
        let status = SettlementStatus {
            order_id: *order_id,
            phase: SettlementPhase::Failed,
            tx_refs,
            error_detail: Some(error_detail),
        };
        self.store.put(COLLECTION, &order_id.to_hex(), &status)
    }

    /// Read-only status query; identical results absent intervening writes.
    pub fn get(&self, order_id: &OrderId) -> Result<Option<SettlementStatus>, StoreError> {
        self.store.get(COLLECTION, &order_id.to_hex())
    }
}
