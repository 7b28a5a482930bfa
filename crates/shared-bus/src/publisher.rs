//! Publishing side of the dispatch bus.

use crate::events::{EventFilter, SwapEvent};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Write half of the bus. The relayer dispatches orders through it and
/// resolvers report fills back over the same channel.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event, returning how many live subscribers saw it.
    async fn publish(&self, event: SwapEvent) -> usize;

    /// Running count of publish attempts since construction.
    fn events_published(&self) -> u64;
}

/// Single-process dispatch bus over `tokio::sync::broadcast`.
///
/// Every subscriber receives every event; filtering happens on the receive
/// side. A multi-node deployment would put an external broker behind the
/// same traits.
pub struct InMemoryDispatchBus {
    sender: broadcast::Sender<SwapEvent>,
    /// Live subscriptions per filter key, for observability and tests.
    listener_counts: Arc<RwLock<HashMap<String, usize>>>,
    events_published: AtomicU64,
    capacity: usize,
}

impl InMemoryDispatchBus {
    /// Bus with the default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus with an explicit channel capacity. Slow subscribers lag and lose
    /// the oldest events once the channel is this far ahead of them.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            listener_counts: Arc::new(RwLock::new(HashMap::new())),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Open a filtered subscription. Events published before this call are
    /// not replayed.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let filter_key = format!("{:?}", filter.topics);
        *self.listener_counts.write().entry(filter_key.clone()).or_insert(0) += 1;

        debug!(topics = ?filter.topics, chains = ?filter.src_chains, "Subscription opened");
        Subscription::new(receiver, filter, self.listener_counts.clone(), filter_key)
    }

    /// Subscription wrapped as a `tokio_stream::Stream`.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Number of currently attached receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Configured channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryDispatchBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryDispatchBus {
    async fn publish(&self, event: SwapEvent) -> usize {
        let topic = event.topic();
        let src_chain = event.src_chain();
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(topic = ?topic, src_chain = ?src_chain, receivers, "Event published");
                receivers
            }
            Err(_) => {
                // broadcast::send only fails when nobody is listening
                warn!(topic = ?topic, src_chain = ?src_chain, "Event dropped, no receivers");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
