//! Cross-crate integration flows.

pub mod relayer_flows;
pub mod settlement_flows;
