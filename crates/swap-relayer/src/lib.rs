//! # Swap Relayer
//!
//! Order intake and dispatch for cross-chain swaps. The relayer builds
//! and seals orders from maker requests, holds the hash-lock pre-image
//! until settlement asks for it, dispatches signed orders onto the event
//! bus, and answers status and quote queries over HTTP.
//!
//! ## Module Structure
//!
//! ```text
//! swap-relayer/
//! ├── service.rs    - Order pipeline: create, submit, status, fills
//! ├── quote.rs      - Indicative pricing with auction presets
//! ├── http.rs       - Axum router over the services
//! └── error.rs      - RelayerError and its HTTP rendering
//! ```

pub mod error;
pub mod http;
pub mod quote;
pub mod service;

pub use error::RelayerError;
pub use http::{router, AppState, CreateOrderResponse, SubmitOrderRequest};
pub use quote::{Quote, QuotePreset, QuotePresets, QuoteRequest, QuoteService};
pub use service::{spawn_fill_listener, CreateOrderRequest, RelayerSecretStore, RelayerService};

/// Crate version, reported by the health endpoint.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
