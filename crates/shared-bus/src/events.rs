//! # Swap Events
//!
//! Defines the event types that flow over the dispatch bus.

use serde::{Deserialize, Serialize};
use shared_types::{ChainId, OrderId, TxRef};
use swap_order::SwapOrder;

/// Broadcast when the relayer accepts a signed order for dispatch.
///
/// Carries the complete order so resolvers can evaluate it without a
/// round-trip back to the relayer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderEvent {
    /// The validated order, id already verified against its parameters.
    pub order: SwapOrder,
    /// Maker's signature over the order's signable payload, hex-encoded.
    /// The relayer verified it before dispatch; resolvers treat it as
    /// opaque provenance.
    pub signature: String,
}

/// Broadcast when a resolver finishes settling an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderFilledEvent {
    /// The settled order.
    pub order_id: OrderId,
    /// Source chain of the settled order.
    pub src_chain: ChainId,
    /// Source escrow funding transaction.
    pub src_escrow_tx: Option<TxRef>,
    /// Destination escrow funding transaction.
    pub dst_escrow_tx: Option<TxRef>,
    /// Destination withdrawal (reveals the secret on-chain).
    pub dst_claim_tx: Option<TxRef>,
    /// Source withdrawal (resolver claiming its counter-value).
    pub src_claim_tx: Option<TxRef>,
}

/// All events that can be published to the dispatch bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SwapEvent {
    /// A new order is available for filling.
    /// Source: Relayer | Target: all resolver workers
    NewOrder(NewOrderEvent),

    /// An order reached terminal `Filled`.
    /// Source: the winning resolver | Target: relayer bookkeeping
    OrderFilled(OrderFilledEvent),
}

impl SwapEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::NewOrder(_) => EventTopic::Orders,
            Self::OrderFilled(_) => EventTopic::Fills,
        }
    }

    /// Source chain of the order this event concerns.
    #[must_use]
    pub fn src_chain(&self) -> ChainId {
        match self {
            Self::NewOrder(e) => e.order.params.src_chain,
            Self::OrderFilled(e) => e.src_chain,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// New orders awaiting a fill.
    Orders,
    /// Completed settlements.
    Fills,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
///
/// Resolver workers typically filter `Orders` down to the source chains
/// they hold inventory on.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source chains to include. Empty means all chains.
    pub src_chains: Vec<ChainId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            src_chains: Vec::new(),
        }
    }

    /// Create a filter for orders originating on specific chains.
    #[must_use]
    pub fn from_chains(chains: Vec<ChainId>) -> Self {
        Self {
            topics: Vec::new(),
            src_chains: chains,
        }
    }

    /// Restrict an existing filter to specific source chains.
    #[must_use]
    pub fn with_src_chains(mut self, chains: Vec<ChainId>) -> Self {
        self.src_chains = chains;
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &SwapEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let chain_match = self.src_chains.is_empty() || self.src_chains.contains(&event.src_chain());

        topic_match && chain_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Hash32;

    fn filled(src_chain: ChainId) -> SwapEvent {
        SwapEvent::OrderFilled(OrderFilledEvent {
            order_id: Hash32([7; 32]),
            src_chain,
            src_escrow_tx: Some(TxRef::new("s")),
            dst_escrow_tx: Some(TxRef::new("d")),
            dst_claim_tx: Some(TxRef::new("dc")),
            src_claim_tx: Some(TxRef::new("sc")),
        })
    }

    #[test]
    fn test_event_topic_mapping() {
        assert_eq!(filled(ChainId::Ethereum).topic(), EventTopic::Fills);
    }

    #[test]
    fn test_filter_all() {
        assert!(EventFilter::all().matches(&filled(ChainId::Sui)));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Orders]);
        assert!(!filter.matches(&filled(ChainId::Ethereum)));
    }

    #[test]
    fn test_filter_by_src_chain() {
        let filter = EventFilter::from_chains(vec![ChainId::Ethereum]);
        assert!(filter.matches(&filled(ChainId::Ethereum)));
        assert!(!filter.matches(&filled(ChainId::Sui)));
    }

    #[test]
    fn test_filter_topic_and_chain() {
        let filter =
            EventFilter::topics(vec![EventTopic::Fills]).with_src_chains(vec![ChainId::Sui]);
        assert!(filter.matches(&filled(ChainId::Sui)));
        assert!(!filter.matches(&filled(ChainId::Ethereum)));
    }
}
