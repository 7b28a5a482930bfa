//! # Settlement Orchestrator
//!
//! Drives one order from claim to terminal status across both ledgers.
//!
//! The run is strictly sequential and never retried: each chain mutation is
//! a step of [`FillState`], a failure at any step aborts the run, and the
//! terminal status (with whatever transaction references were obtained) is
//! written exactly once. Escrows stranded by a failure are recovered through
//! the adapters' cancellation path after their deadlines, not by the
//! orchestrator.

use crate::error::SettlementError;
use crate::machine::{FillProgress, FillState};
use crate::secrets::SecretProvider;
use shared_types::{AccountId, AssetRef, ChainId, EvmAddress, SuiAddress};
use std::collections::HashMap;
use std::sync::Arc;
use swap_chains::{ChainAdapter, ConfirmationOutcome, EscrowImmutables, EscrowRole};
use swap_order::{verify, HashFamily, SwapOrder};
use swap_registry::MappingRegistry;
use swap_store::{StatusStore, TxRefSet};
use tracing::{info, instrument, warn};

/// The resolver's own accounts, one per supported ledger.
#[derive(Clone, Copy, Debug)]
pub struct ResolverIdentity {
    /// EVM-side account.
    pub evm: EvmAddress,
    /// Sui-side account.
    pub sui: SuiAddress,
}

impl ResolverIdentity {
    /// The resolver's account on `chain`.
    pub fn account_on(&self, chain: ChainId) -> AccountId {
        match chain {
            ChainId::Ethereum => AccountId::Evm(self.evm),
            ChainId::Sui => AccountId::Sui(self.sui),
        }
    }
}

/// Tunables for a settlement run.
#[derive(Clone, Copy, Debug)]
pub struct SettlementConfig {
    /// Upper bound on each confirmation wait.
    pub confirmation_timeout_secs: u64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_secs: 60,
        }
    }
}

/// Executes fills for one resolver.
pub struct SettlementOrchestrator {
    statuses: Arc<StatusStore>,
    registry: Arc<MappingRegistry>,
    secrets: Arc<dyn SecretProvider>,
    adapters: HashMap<ChainId, Arc<dyn ChainAdapter>>,
    resolver: ResolverIdentity,
    config: SettlementConfig,
}

impl SettlementOrchestrator {
    /// Assemble an orchestrator; adapters are attached with
    /// [`Self::with_adapter`].
    pub fn new(
        statuses: Arc<StatusStore>,
        registry: Arc<MappingRegistry>,
        secrets: Arc<dyn SecretProvider>,
        resolver: ResolverIdentity,
    ) -> Self {
        Self {
            statuses,
            registry,
            secrets,
            adapters: HashMap::new(),
            resolver,
            config: SettlementConfig::default(),
        }
    }

    /// Attach a chain adapter.
    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn ChainAdapter>) -> Self {
        self.adapters.insert(adapter.chain_id(), adapter);
        self
    }

    /// Override the default tunables.
    #[must_use]
    pub fn with_config(mut self, config: SettlementConfig) -> Self {
        self.config = config;
        self
    }

    /// Settle one order end to end.
    ///
    /// Claims the order first; losing the claim returns
    /// [`SettlementError::AlreadyClaimed`] without touching the status record
    /// (the owning worker's writes must not be clobbered). Any other outcome
    /// writes a terminal status exactly once.
    #[instrument(skip_all, fields(order_id = %order.order_id))]
    pub async fn settle(&self, order: &SwapOrder) -> Result<TxRefSet, SettlementError> {
        if !self.statuses.try_claim(&order.order_id)? {
            return Err(SettlementError::AlreadyClaimed(order.order_id));
        }

        let mut refs = TxRefSet::default();
        match self.run_inner(order, &mut refs).await {
            Ok(()) => {
                self.statuses.complete(&order.order_id, refs.clone())?;
                info!("Order settled");
                Ok(refs)
            }
            Err(e) => {
                warn!(error = %e, tag = e.tag(), "Settlement failed");
                self.statuses
                    .fail(&order.order_id, refs, format!("{}: {}", e.tag(), e))?;
                Err(e)
            }
        }
    }

    async fn run_inner(
        &self,
        order: &SwapOrder,
        refs: &mut TxRefSet,
    ) -> Result<(), SettlementError> {
        let params = &order.params;
        let src = self.adapter(params.src_chain)?;
        let dst = self.adapter(params.dst_chain)?;
        let mut progress = FillProgress::new();

        progress.advance(FillState::LocatingIdentities)?;
        let maker_src = self.account_on(params.src_chain, &params.maker)?;
        let receiver_dst = self.account_on(params.dst_chain, &params.receiver)?;
        let resolver_src = self.resolver.account_on(params.src_chain);
        let resolver_dst = self.resolver.account_on(params.dst_chain);

        // Source leg: lock the maker's funds, resolver as beneficiary.
        progress.advance(FillState::FundingSource)?;
        let src_escrow = EscrowImmutables {
            order_id: order.order_id,
            commitment: params.commitment,
            amount: params.making_amount,
            asset: params.maker_asset.clone(),
            depositor: maker_src,
            beneficiary: resolver_src,
            deadline_secs: src.now() + params.time_locks.src_cancellation,
            safety_deposit: params.src_safety_deposit,
            funding_unit: None,
        };
        let src_receipt = src.deploy_escrow(EscrowRole::Src, src_escrow).await?;
        refs.src_escrow_tx = Some(src_receipt.tx.clone());
        info!(escrow = %src_receipt.escrow, "Source escrow funded");

        progress.advance(FillState::AwaitingSrcConfirmation)?;
        self.await_confirmation(src.as_ref(), &src_receipt.tx).await?;

        // Destination leg: resolver locks its counter-value for the receiver.
        // Object ledgers need a concrete unit to draw from.
        progress.advance(FillState::FundingDestination)?;
        let funding_unit = match &params.taker_asset {
            AssetRef::CoinType(_) => dst
                .find_fundable_assets(&resolver_dst, &params.taker_asset, params.taking_amount)
                .await?
                .into_iter()
                .next()
                .map(|unit| unit.id),
            AssetRef::Token(_) => None,
        };
        let dst_escrow = EscrowImmutables {
            order_id: order.order_id,
            commitment: params.dst_commitment,
            amount: params.taking_amount,
            asset: params.taker_asset.clone(),
            depositor: resolver_dst,
            beneficiary: receiver_dst,
            deadline_secs: dst.now() + params.time_locks.dst_cancellation,
            safety_deposit: params.dst_safety_deposit,
            funding_unit,
        };
        let dst_receipt = dst.deploy_escrow(EscrowRole::Dst, dst_escrow).await?;
        refs.dst_escrow_tx = Some(dst_receipt.tx.clone());
        info!(escrow = %dst_receipt.escrow, "Destination escrow funded");

        progress.advance(FillState::AwaitingDstConfirmation)?;
        self.await_confirmation(dst.as_ref(), &dst_receipt.tx).await?;

        // Both escrows confirmed; the secret may now be revealed. Verify it
        // against both commitments before it touches a ledger.
        progress.advance(FillState::WithdrawingDestination)?;
        let secret = self.secrets.secret_for(&order.order_id).await?;
        let src_family = HashFamily::for_chain(params.src_chain);
        let dst_family = HashFamily::for_chain(params.dst_chain);
        if !verify(src_family, &secret, &params.commitment)
            || !verify(dst_family, &secret, &params.dst_commitment)
        {
            return Err(SettlementError::SecretMismatch(order.order_id));
        }
        let dst_claim = dst.withdraw(&dst_receipt.escrow, &secret).await?;
        refs.dst_claim_tx = Some(dst_claim);
        info!("Destination withdrawn, secret revealed");

        progress.advance(FillState::ClaimingSource)?;
        let src_claim = src.withdraw(&src_receipt.escrow, &secret).await?;
        refs.src_claim_tx = Some(src_claim);

        progress.advance(FillState::Settled)?;
        Ok(())
    }

    async fn await_confirmation(
        &self,
        adapter: &dyn ChainAdapter,
        tx: &shared_types::TxRef,
    ) -> Result<(), SettlementError> {
        match adapter
            .wait_for_confirmation(tx, self.config.confirmation_timeout_secs)
            .await?
        {
            ConfirmationOutcome::Confirmed { .. } => Ok(()),
            ConfirmationOutcome::Reverted { reason } => {
                Err(SettlementError::TransactionReverted(reason))
            }
        }
    }

    fn adapter(&self, chain: ChainId) -> Result<&Arc<dyn ChainAdapter>, SettlementError> {
        self.adapters
            .get(&chain)
            .ok_or_else(|| SettlementError::UnsupportedChain(format!("{chain:?}")))
    }

    /// Resolve an order-format (EVM) address to the chain-local account,
    /// going through the mapping registry for the object ledger.
    fn account_on(
        &self,
        chain: ChainId,
        evm_form: &EvmAddress,
    ) -> Result<AccountId, SettlementError> {
        match chain {
            ChainId::Ethereum => Ok(AccountId::Evm(*evm_form)),
            ChainId::Sui => {
                let sui = self
                    .registry
                    .lookup_by_proxy(evm_form)?
                    .ok_or_else(|| SettlementError::UnmappedIdentity(evm_form.to_hex()))?;
                Ok(AccountId::Sui(sui))
            }
        }
    }
}
