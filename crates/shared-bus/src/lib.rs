//! # Shared Bus - Order Dispatch Channel
//!
//! Fan-out channel connecting the relayer to its resolver workers.
//!
//! ## Dispatch flow
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │   Relayer    │                    │  Resolver N  │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │ Dispatch Bus │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Delivery is at-most-once per subscriber: a worker that lags past the
//! channel capacity loses the skipped events and must rely on the
//! settlement ledger to avoid double-fills. Workers that drop their
//! subscription reconnect with [`ReconnectPolicy`] backoff.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod reconnect;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, NewOrderEvent, OrderFilledEvent, SwapEvent};
pub use publisher::{EventPublisher, InMemoryDispatchBus};
pub use reconnect::{ReconnectPolicy, ReconnectState};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
