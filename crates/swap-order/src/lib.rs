//! # Swap Order
//!
//! The cross-chain order descriptor and the hashed-secret commitment scheme
//! underneath it.
//!
//! ## Module Structure
//!
//! ```text
//! swap-order/
//! ├── hashlock/   # Commitment family selection, commit, verify
//! ├── secret/     # Zeroizing pre-image wrapper
//! └── order/      # SwapOrder, time-lock schedule, canonical order hash
//! ```
//!
//! An order is identified by the keccak hash of its canonical encoding; the
//! same fields always produce the same id, and reconstructing an order from
//! its serialized form yields an identical id.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod hashlock;
pub mod order;
pub mod secret;

pub use hashlock::{commit, verify, HashFamily};
pub use order::{OrderError, OrderParams, SwapOrder, TimeLockSchedule};
pub use secret::SecretPreimage;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
