//! Receiving side of the dispatch bus.

use crate::events::{EventFilter, SwapEvent};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The dispatch bus was closed.
    #[error("Dispatch bus closed")]
    Closed,
}

/// Capability to open filtered subscriptions.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Subscribe to events matching `filter`.
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}

/// A live subscription. Dropping it releases the bus-side bookkeeping.
///
/// Lag is survivable: when the channel overruns this subscriber, the oldest
/// events are discarded and receiving continues from the gap.
pub struct Subscription {
    receiver: broadcast::Receiver<SwapEvent>,
    filter: EventFilter,
    listener_counts: Arc<RwLock<HashMap<String, usize>>>,
    filter_key: String,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<SwapEvent>,
        filter: EventFilter,
        listener_counts: Arc<RwLock<HashMap<String, usize>>>,
        filter_key: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            listener_counts,
            filter_key,
        }
    }

    /// Next event matching the filter, or `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<SwapEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, events dropped");
                }
            }
        }
    }

    /// Non-blocking receive. `Ok(None)` means nothing is queued right now.
    pub fn try_recv(&mut self) -> Result<Option<SwapEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
            }
        }
    }

    /// The filter this subscription was opened with.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut counts = self.listener_counts.write();
        if let Some(count) = counts.get_mut(&self.filter_key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                counts.remove(&self.filter_key);
            }
        }
        debug!(filter = %self.filter_key, "Subscription dropped");
    }
}

/// `tokio_stream::Stream` wrapper over a [`Subscription`], for use with
/// stream combinators.
pub struct EventStream {
    subscription: Subscription,
}

impl EventStream {
    /// Wrap a subscription.
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// The underlying subscription's filter.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        self.subscription.filter()
    }
}

impl Stream for EventStream {
    type Item = SwapEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.subscription.try_recv() {
            Ok(Some(event)) => Poll::Ready(Some(event)),
            Ok(None) => {
                // Nothing queued; yield and get polled again.
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Err(SubscriptionError::Closed) => Poll::Ready(None),
        }
    }
}
