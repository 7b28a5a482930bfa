//! # Resolver Worker
//!
//! Long-running task that consumes order dispatches and runs settlements.
//!
//! Every worker sees every order for the source chains it serves; the
//! settlement ledger's claim is what keeps two workers off the same order.
//! A worker that loses its subscription re-subscribes under backoff; events
//! dispatched in the gap are simply missed.

use crate::orchestrator::SettlementOrchestrator;
use crate::SettlementError;
use shared_bus::{
    EventFilter, EventPublisher, EventTopic, InMemoryDispatchBus, OrderFilledEvent,
    ReconnectPolicy, SwapEvent,
};
use shared_types::ChainId;
use std::sync::Arc;
use swap_order::SwapOrder;
use tracing::{debug, error, info, warn};

/// One resolver's dispatch consumer.
pub struct ResolverWorker {
    name: String,
    bus: Arc<InMemoryDispatchBus>,
    orchestrator: Arc<SettlementOrchestrator>,
    src_chains: Vec<ChainId>,
    reconnect: ReconnectPolicy,
}

impl ResolverWorker {
    /// Create a worker serving orders whose source chain is in `src_chains`.
    pub fn new(
        name: impl Into<String>,
        bus: Arc<InMemoryDispatchBus>,
        orchestrator: Arc<SettlementOrchestrator>,
        src_chains: Vec<ChainId>,
    ) -> Self {
        Self {
            name: name.into(),
            bus,
            orchestrator,
            src_chains,
            reconnect: ReconnectPolicy::standard(),
        }
    }

    /// Spawn the worker onto the runtime.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Consume dispatches until the bus goes away for good.
    pub async fn run(self) {
        let mut backoff = self.reconnect.start();
        loop {
            let filter = EventFilter::topics(vec![EventTopic::Orders])
                .with_src_chains(self.src_chains.clone());
            let mut sub = self.bus.subscribe(filter);
            backoff.reset();
            info!(worker = %self.name, chains = ?self.src_chains, "Worker subscribed");

            while let Some(event) = sub.recv().await {
                if let SwapEvent::NewOrder(dispatch) = event {
                    self.handle_order(&dispatch.order).await;
                }
            }

            let delay = backoff.next_delay();
            warn!(
                worker = %self.name,
                attempt = backoff.attempts(),
                delay_ms = delay.as_millis() as u64,
                "Subscription closed, re-subscribing"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn handle_order(&self, order: &SwapOrder) {
        if let Err(e) = order.verify_id() {
            warn!(worker = %self.name, error = %e, "Dropping order with bad id");
            return;
        }

        match self.orchestrator.settle(order).await {
            Ok(refs) => {
                info!(worker = %self.name, order_id = %order.order_id, "Fill complete");
                self.bus
                    .publish(SwapEvent::OrderFilled(OrderFilledEvent {
                        order_id: order.order_id,
                        src_chain: order.params.src_chain,
                        src_escrow_tx: refs.src_escrow_tx,
                        dst_escrow_tx: refs.dst_escrow_tx,
                        dst_claim_tx: refs.dst_claim_tx,
                        src_claim_tx: refs.src_claim_tx,
                    }))
                    .await;
            }
            Err(SettlementError::AlreadyClaimed(order_id)) => {
                debug!(worker = %self.name, order_id = %order_id, "Order claimed elsewhere, skipping");
            }
            Err(e) => {
                // Terminal status already recorded by the orchestrator
                error!(worker = %self.name, order_id = %order.order_id, tag = e.tag(), error = %e, "Fill failed");
            }
        }
    }
}
