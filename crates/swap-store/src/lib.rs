//! # Swap Store
//!
//! Durable persistence for the relayer and resolver workers.
//!
//! The storage contract is deliberately small: keyed get/put plus an
//! append-only list per named collection, JSON-encoded records. Two adapters
//! implement it — an in-memory map for tests and a single-document JSON file
//! (write-temp-then-rename) for the node process.
//!
//! On top of the raw port sits [`StatusStore`], the shared order settlement
//! ledger. It owns the one cross-worker mutual-exclusion point in the
//! system: the compare-and-swap claim that moves an order from `Pending` to
//! `Filling` for exactly one resolver.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod ports;
pub mod status;

pub use adapters::{InMemoryStore, JsonFileStore};
pub use ports::{RecordStore, RecordStoreExt, StoreError};
pub use status::{SettlementPhase, SettlementStatus, StatusStore, TxRefSet};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
