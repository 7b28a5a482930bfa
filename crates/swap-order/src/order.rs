//! # Order Model
//!
//! The cross-chain order descriptor and its canonical hash.
//!
//! An order is created once by the relayer, signed by the maker, and never
//! mutated. Its identifier is the Keccak-256 hash of the canonical field
//! encoding, so any party can recompute and check it.

use crate::hashlock::{commit, HashFamily};
use crate::secret::SecretPreimage;
use serde::{Deserialize, Serialize};
use shared_types::{AssetRef, ChainId, EvmAddress, Hash32, OrderId};
use thiserror::Error;

/// Order construction and validation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Making or taking amount is zero.
    #[error("Order amounts must be non-zero")]
    ZeroAmount,

    /// Source and destination chain are the same ledger.
    #[error("Source and destination chain must differ")]
    SameChain,

    /// The time-lock schedule violates the cancellation ordering rule.
    #[error("Invalid time locks: source cancellation {src_cancellation}s must be after destination cancellation {dst_cancellation}s")]
    InvalidTimeLocks {
        /// Source-side cancellation offset.
        src_cancellation: u64,
        /// Destination-side cancellation offset.
        dst_cancellation: u64,
    },

    /// The maker supplied an empty secret.
    #[error("Secret pre-image must not be empty")]
    EmptySecret,

    /// A deserialized order's id does not match its fields.
    #[error("Order id mismatch: declared {declared}, computed {computed}")]
    IdMismatch {
        /// Id carried by the order.
        declared: OrderId,
        /// Id recomputed from the fields.
        computed: OrderId,
    },
}

/// Relative time-lock schedule for the escrow pair, in seconds from escrow
/// deployment.
///
/// The ordering rule is the atomicity guarantee: the source escrow must stay
/// claimable strictly longer than the destination escrow, so the resolver
/// always has time to claim the source leg after revealing the secret on the
/// destination leg.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLockSchedule {
    /// Resolver may withdraw the source escrow after this offset.
    pub src_withdrawal: u64,
    /// Anyone may withdraw the source escrow for the resolver after this offset.
    pub src_public_withdrawal: u64,
    /// Maker may cancel the source escrow after this offset.
    pub src_cancellation: u64,
    /// Anyone may cancel the source escrow after this offset.
    pub src_public_cancellation: u64,
    /// Receiver may withdraw the destination escrow after this offset.
    pub dst_withdrawal: u64,
    /// Anyone may withdraw the destination escrow after this offset.
    pub dst_public_withdrawal: u64,
    /// Resolver may cancel the destination escrow after this offset.
    pub dst_cancellation: u64,
}

impl TimeLockSchedule {
    /// The schedule used for single-fill swaps.
    pub fn standard() -> Self {
        Self {
            src_withdrawal: 10,
            src_public_withdrawal: 120,
            src_cancellation: 121,
            src_public_cancellation: 122,
            dst_withdrawal: 10,
            dst_public_withdrawal: 100,
            dst_cancellation: 101,
        }
    }

    /// Check the cancellation ordering rule.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.src_cancellation <= self.dst_cancellation {
            return Err(OrderError::InvalidTimeLocks {
                src_cancellation: self.src_cancellation,
                dst_cancellation: self.dst_cancellation,
            });
        }
        Ok(())
    }
}

impl Default for TimeLockSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

/// Everything that goes into an order except its derived identifier.
///
/// `maker` and `receiver` are always EVM-format addresses: the order format
/// only understands one ledger's address scheme, so a Sui party appears here
/// through its minted proxy identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderParams {
    /// Party initiating the swap (source-side owner of funds).
    pub maker: EvmAddress,
    /// Party receiving the destination-side funds.
    pub receiver: EvmAddress,
    /// Asset the maker gives up.
    pub maker_asset: AssetRef,
    /// Asset the maker receives.
    pub taker_asset: AssetRef,
    /// Amount of `maker_asset` locked on the source chain.
    pub making_amount: u64,
    /// Amount of `taker_asset` locked on the destination chain.
    pub taking_amount: u64,
    /// Chain the maker's funds start on.
    pub src_chain: ChainId,
    /// Chain the maker's counter-value is delivered on.
    pub dst_chain: ChainId,
    /// Hash-lock commitment under the source chain's digest family.
    pub commitment: Hash32,
    /// The same secret's commitment under the destination chain's family.
    pub dst_commitment: Hash32,
    /// Relative time-lock schedule for both escrows.
    pub time_locks: TimeLockSchedule,
    /// Random salt so identical economic terms produce distinct orders.
    pub salt: u64,
    /// Maker nonce.
    pub nonce: u64,
    /// Native-asset deposit backing the source escrow.
    pub src_safety_deposit: u64,
    /// Native-asset deposit backing the destination escrow.
    pub dst_safety_deposit: u64,
}

impl OrderParams {
    /// Derive both commitments from the maker's secret.
    pub fn commitments_for(
        secret: &SecretPreimage,
        src_chain: ChainId,
        dst_chain: ChainId,
    ) -> (Hash32, Hash32) {
        (
            commit(HashFamily::for_chain(src_chain), secret),
            commit(HashFamily::for_chain(dst_chain), secret),
        )
    }

    /// Canonical byte encoding hashed into the order id and signed by the
    /// maker.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        // bincode over a fixed field order; serde renders hashes/addresses
        // as lowercase hex, so casing cannot perturb the id.
        bincode::serialize(self).unwrap_or_default()
    }

    /// The order id: Keccak-256 of the canonical encoding.
    pub fn compute_id(&self) -> OrderId {
        HashFamily::Keccak256.digest(&self.canonical_bytes())
    }
}

/// An immutable cross-chain swap order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOrder {
    /// Canonical hash of the order fields; the swap's unique identifier.
    pub order_id: OrderId,
    /// The order fields.
    pub params: OrderParams,
}

impl SwapOrder {
    /// Validate the params and seal them under their canonical id.
    pub fn new(params: OrderParams) -> Result<Self, OrderError> {
        if params.making_amount == 0 || params.taking_amount == 0 {
            return Err(OrderError::ZeroAmount);
        }
        if params.src_chain == params.dst_chain {
            return Err(OrderError::SameChain);
        }
        params.time_locks.validate()?;

        let order_id = params.compute_id();
        Ok(Self { order_id, params })
    }

    /// Recompute the id and check it matches (used after deserialization).
    pub fn verify_id(&self) -> Result<(), OrderError> {
        let computed = self.params.compute_id();
        if computed != self.order_id {
            return Err(OrderError::IdMismatch {
                declared: self.order_id,
                computed,
            });
        }
        Ok(())
    }

    /// The payload the maker signs to authorize this order.
    pub fn signable_payload(&self) -> Vec<u8> {
        self.params.canonical_bytes()
    }

    /// The commitment the escrow on `chain` must be locked under.
    pub fn commitment_for(&self, chain: ChainId) -> Hash32 {
        if chain == self.params.src_chain {
            self.params.commitment
        } else {
            self.params.dst_commitment
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_params(salt: u64) -> OrderParams {
        let secret = SecretPreimage::from_utf8("sample order secret");
        let (commitment, dst_commitment) =
            OrderParams::commitments_for(&secret, ChainId::Ethereum, ChainId::Sui);
        OrderParams {
            maker: EvmAddress([0x11; 20]),
            receiver: EvmAddress([0x22; 20]),
            maker_asset: AssetRef::Token(EvmAddress([0x33; 20])),
            taker_asset: AssetRef::CoinType("0x2::silver::SILVER".to_string()),
            making_amount: 1_000_000,
            taking_amount: 1_500_000,
            src_chain: ChainId::Ethereum,
            dst_chain: ChainId::Sui,
            commitment,
            dst_commitment,
            time_locks: TimeLockSchedule::standard(),
            salt,
            nonce: 7,
            src_safety_deposit: 1_000,
            dst_safety_deposit: 1_000,
        }
    }

    #[test]
    fn test_order_id_deterministic() {
        let a = SwapOrder::new(sample_params(42)).unwrap();
        let b = SwapOrder::new(sample_params(42)).unwrap();
        assert_eq!(a.order_id, b.order_id);
    }

    #[test]
    fn test_distinct_salt_distinct_id() {
        let a = SwapOrder::new(sample_params(1)).unwrap();
        let b = SwapOrder::new(sample_params(2)).unwrap();
        assert_ne!(a.order_id, b.order_id);
    }

    #[test]
    fn test_serialization_round_trip_preserves_id() {
        let order = SwapOrder::new(sample_params(42)).unwrap();
        let json = serde_json::to_string(&order).unwrap();
        let back: SwapOrder = serde_json::from_str(&json).unwrap();
        assert_eq!(back.order_id, order.order_id);
        assert!(back.verify_id().is_ok());
    }

    #[test]
    fn test_tampered_order_fails_verification() {
        let mut order = SwapOrder::new(sample_params(42)).unwrap();
        order.params.taking_amount += 1;
        assert!(matches!(
            order.verify_id(),
            Err(OrderError::IdMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut params = sample_params(1);
        params.making_amount = 0;
        assert!(matches!(SwapOrder::new(params), Err(OrderError::ZeroAmount)));
    }

    #[test]
    fn test_same_chain_rejected() {
        let mut params = sample_params(1);
        params.dst_chain = ChainId::Ethereum;
        assert!(matches!(SwapOrder::new(params), Err(OrderError::SameChain)));
    }

    #[test]
    fn test_timelock_ordering_enforced() {
        let mut params = sample_params(1);
        params.time_locks.src_cancellation = 50;
        params.time_locks.dst_cancellation = 101;
        assert!(matches!(
            SwapOrder::new(params),
            Err(OrderError::InvalidTimeLocks { .. })
        ));
    }

    #[test]
    fn test_commitment_for_leg() {
        let order = SwapOrder::new(sample_params(1)).unwrap();
        assert_eq!(order.commitment_for(ChainId::Ethereum), order.params.commitment);
        assert_eq!(order.commitment_for(ChainId::Sui), order.params.dst_commitment);
    }

    #[test]
    fn test_standard_schedule_valid() {
        assert!(TimeLockSchedule::standard().validate().is_ok());
    }
}
