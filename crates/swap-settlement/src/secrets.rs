//! Secret disclosure port.
//!
//! The maker entrusts its pre-image to the relayer at order creation; the
//! settlement engine pulls it through this port when the time comes to
//! withdraw. The engine verifies the pre-image against the order's
//! commitments before submitting it anywhere.

use crate::error::SettlementError;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::OrderId;
use std::collections::HashMap;
use swap_order::SecretPreimage;

/// Source of maker secrets, keyed by order id.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// The pre-image for `order_id`, or [`SettlementError::SecretUnavailable`].
    async fn secret_for(&self, order_id: &OrderId) -> Result<SecretPreimage, SettlementError>;
}

/// Map-backed provider for tests and single-process wiring.
#[derive(Default)]
pub struct InMemorySecretProvider {
    secrets: RwLock<HashMap<OrderId, Vec<u8>>>,
}

impl InMemorySecretProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a secret for an order.
    pub fn insert(&self, order_id: OrderId, secret: &SecretPreimage) {
        self.secrets
            .write()
            .insert(order_id, secret.as_bytes().to_vec());
    }
}

#[async_trait]
impl SecretProvider for InMemorySecretProvider {
    async fn secret_for(&self, order_id: &OrderId) -> Result<SecretPreimage, SettlementError> {
        self.secrets
            .read()
            .get(order_id)
            .map(|bytes| SecretPreimage::new(bytes.clone()))
            .ok_or(SettlementError::SecretUnavailable(*order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Hash32;

    #[tokio::test]
    async fn test_insert_then_fetch() {
        let provider = InMemorySecretProvider::new();
        let secret = SecretPreimage::from_utf8("stored secret");
        provider.insert(Hash32([1; 32]), &secret);

        let got = provider.secret_for(&Hash32([1; 32])).await.unwrap();
        assert_eq!(got.as_bytes(), secret.as_bytes());
    }

    #[tokio::test]
    async fn test_missing_secret() {
        let provider = InMemorySecretProvider::new();
        let result = provider.secret_for(&Hash32([2; 32])).await;
        assert!(matches!(result, Err(SettlementError::SecretUnavailable(_))));
    }
}
