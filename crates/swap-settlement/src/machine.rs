//! Fill-flow state machine.
//!
//! The settlement steps are strictly ordered: the destination escrow is
//! never funded before the source escrow confirms (the resolver must see
//! the maker's funds locked first), and the secret is never submitted to
//! the source chain before the destination withdrawal succeeds (revealing
//! it on-chain any earlier would let the resolver be front-run).

use crate::error::SettlementError;
use serde::{Deserialize, Serialize};
use swap_chains::ChainError;

/// Steps of a single fill, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillState {
    /// Claim won, nothing executed yet.
    Claimed,
    /// Resolving order parties to chain-local accounts.
    LocatingIdentities,
    /// Source escrow deployment submitted.
    FundingSource,
    /// Waiting for source escrow confirmation depth.
    AwaitingSrcConfirmation,
    /// Destination escrow deployment submitted.
    FundingDestination,
    /// Waiting for destination escrow confirmation depth.
    AwaitingDstConfirmation,
    /// Revealing the secret on the destination chain (pays the receiver).
    WithdrawingDestination,
    /// Claiming the source escrow with the now-public secret.
    ClaimingSource,
    /// Terminal: all four transactions recorded.
    Settled,
    /// Terminal: aborted, partial chain state preserved.
    Failed,
}

impl FillState {
    /// Whether this state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::Failed)
    }

    /// The sole legal successor on the happy path, if any.
    fn next(&self) -> Option<FillState> {
        match self {
            Self::Claimed => Some(Self::LocatingIdentities),
            Self::LocatingIdentities => Some(Self::FundingSource),
            Self::FundingSource => Some(Self::AwaitingSrcConfirmation),
            Self::AwaitingSrcConfirmation => Some(Self::FundingDestination),
            Self::FundingDestination => Some(Self::AwaitingDstConfirmation),
            Self::AwaitingDstConfirmation => Some(Self::WithdrawingDestination),
            Self::WithdrawingDestination => Some(Self::ClaimingSource),
            Self::ClaimingSource => Some(Self::Settled),
            Self::Settled | Self::Failed => None,
        }
    }

    /// Whether moving to `to` is legal from this state.
    pub fn can_transition_to(&self, to: FillState) -> bool {
        if to == Self::Failed {
            return !self.is_terminal();
        }
        self.next() == Some(to)
    }
}

/// Tracks the current step of one settlement run.
#[derive(Clone, Copy, Debug)]
pub struct FillProgress {
    state: FillState,
}

impl FillProgress {
    /// Start at `Claimed` (the CAS already succeeded).
    pub fn new() -> Self {
        Self {
            state: FillState::Claimed,
        }
    }

    /// Current step.
    pub fn state(&self) -> FillState {
        self.state
    }

    /// Move to the next step, rejecting out-of-order jumps.
    pub fn advance(&mut self, to: FillState) -> Result<(), SettlementError> {
        if !self.state.can_transition_to(to) {
            return Err(SettlementError::Chain(ChainError::SubmissionFailed(
                format!("illegal fill transition {:?} -> {:?}", self.state, to),
            )));
        }
        self.state = to;
        Ok(())
    }
}

impl Default for FillProgress {
    fn default() -> Self {
        Self::new()
    }
}
