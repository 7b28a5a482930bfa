//! # Crosswap Test Suite
//!
//! Cross-crate tests that exercise the full coordination stack the way the
//! node wires it: relayer services, the dispatch bus, resolver workers, the
//! settlement orchestrator, and both dev ledgers in one process.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── settlement_flows.rs   # Order → fill → ledger effects, both directions
//!     └── relayer_flows.rs      # HTTP-service journeys, persistence, races
//! ```
//!
//! Per-crate behavior (hash commitments, escrow mechanics, state machine
//! legality, status CAS) is covered by each crate's own unit tests; these
//! tests only assert what emerges from the crates working together.

pub mod integration;
