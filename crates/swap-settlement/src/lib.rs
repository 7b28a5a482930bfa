//! # Swap Settlement
//!
//! The resolver side of the system: claims dispatched orders and executes
//! the two-escrow fill across both ledgers.
//!
//! ## Module Structure
//!
//! ```text
//! swap-settlement/
//! ├── machine/       # Fill-flow state machine (step ordering rules)
//! ├── orchestrator/  # One-order settlement run, terminal status writes
//! ├── secrets/       # Secret disclosure port
//! ├── worker/        # Dispatch consumer loop per resolver
//! └── error/         # Settlement failure taxonomy
//! ```
//!
//! Two ordering rules are load-bearing and enforced by the state machine:
//! the destination escrow is funded only after the source escrow confirms,
//! and the secret is submitted to the source chain only after the
//! destination withdrawal succeeds.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod machine;
pub mod orchestrator;
pub mod secrets;
pub mod worker;

pub use error::SettlementError;
pub use machine::{FillProgress, FillState};
pub use orchestrator::{ResolverIdentity, SettlementConfig, SettlementOrchestrator};
pub use secrets::{InMemorySecretProvider, SecretProvider};
pub use worker::ResolverWorker;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
