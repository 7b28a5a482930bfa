//! # Relayer Service
//!
//! Order intake and dispatch. The relayer is the trusted coordinator: it
//! builds orders from maker requests, keeps the maker's secret until the
//! fill needs it, broadcasts signed orders to resolver workers, and tracks
//! settlement outcomes.

use crate::error::RelayerError;
use async_trait::async_trait;
use serde::Deserialize;
use shared_bus::{
    EventFilter, EventPublisher, EventTopic, InMemoryDispatchBus, NewOrderEvent, OrderFilledEvent,
    SwapEvent,
};
use shared_types::{AssetRef, ChainId, EvmAddress, OrderId, SuiAddress};
use std::sync::Arc;
use swap_order::{OrderError, OrderParams, SecretPreimage, SwapOrder};
use swap_registry::MappingRegistry;
use swap_settlement::{SecretProvider, SettlementError};
use swap_store::{RecordStore, RecordStoreExt, SettlementStatus, StatusStore};
use tracing::{info, warn};

const ORDERS: &str = "orders";
const ORDER_SECRETS: &str = "order_secrets";
const FILLED_ORDERS: &str = "filled_orders";

/// Maker's order creation request.
///
/// Party addresses and assets are given in the native format of the chain
/// they live on; the relayer normalizes Sui identities to proxy addresses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Maker address in source-chain format.
    pub maker: String,
    /// Receiver address in destination-chain format.
    pub receiver: String,
    /// Asset given up, in source-chain format.
    pub maker_asset: String,
    /// Asset received, in destination-chain format.
    pub taker_asset: String,
    /// Amount locked on the source chain.
    pub making_amount: u64,
    /// Amount delivered on the destination chain.
    pub taking_amount: u64,
    /// Numeric source chain id.
    pub src_chain: u64,
    /// Numeric destination chain id.
    pub dst_chain: u64,
    /// Maker's hash-lock pre-image (passphrase).
    pub secret: String,
    /// Maker nonce.
    #[serde(default)]
    pub nonce: u64,
    /// Source-side safety deposit.
    #[serde(default = "default_safety_deposit")]
    pub src_safety_deposit: u64,
    /// Destination-side safety deposit.
    #[serde(default = "default_safety_deposit")]
    pub dst_safety_deposit: u64,
}

fn default_safety_deposit() -> u64 {
    1_000
}

/// The relayer's order pipeline.
pub struct RelayerService {
    store: Arc<dyn RecordStore>,
    statuses: Arc<StatusStore>,
    registry: Arc<MappingRegistry>,
    bus: Arc<InMemoryDispatchBus>,
}

impl RelayerService {
    /// Assemble the service over shared infrastructure.
    pub fn new(
        store: Arc<dyn RecordStore>,
        statuses: Arc<StatusStore>,
        registry: Arc<MappingRegistry>,
        bus: Arc<InMemoryDispatchBus>,
    ) -> Self {
        Self {
            store,
            statuses,
            registry,
            bus,
        }
    }

    /// Build, validate, and persist a new order. Returns the sealed order;
    /// the secret stays with the relayer.
    pub fn create_order(&self, req: CreateOrderRequest) -> Result<SwapOrder, RelayerError> {
        let src_chain = ChainId::from_numeric(req.src_chain)?;
        let dst_chain = ChainId::from_numeric(req.dst_chain)?;

        let secret = SecretPreimage::from_utf8(&req.secret);
        if secret.is_empty() {
            return Err(RelayerError::Order(OrderError::EmptySecret));
        }

        let maker = self.normalize_party(&req.maker, src_chain)?;
        let receiver = self.normalize_party(&req.receiver, dst_chain)?;
        let maker_asset = parse_asset(&req.maker_asset, src_chain)?;
        let taker_asset = parse_asset(&req.taker_asset, dst_chain)?;

        let (commitment, dst_commitment) =
            OrderParams::commitments_for(&secret, src_chain, dst_chain);
        let order = SwapOrder::new(OrderParams {
            maker,
            receiver,
            maker_asset,
            taker_asset,
            making_amount: req.making_amount,
            taking_amount: req.taking_amount,
            src_chain,
            dst_chain,
            commitment,
            dst_commitment,
            time_locks: Default::default(),
            salt: u64::from(rand::random::<u32>()),
            nonce: req.nonce,
            src_safety_deposit: req.src_safety_deposit,
            dst_safety_deposit: req.dst_safety_deposit,
        })?;

        let key = order.order_id.to_hex();
        self.store.put(ORDERS, &key, &order)?;
        self.store.put(ORDER_SECRETS, &key, &secret)?;
        info!(order_id = %order.order_id, src = ?src_chain, dst = ?dst_chain, "Order created");
        Ok(order)
    }

    /// Accept a signed order and dispatch it to resolvers.
    ///
    /// The order must have been created here (the relayer needs the secret
    /// on file to complete any fill).
    pub async fn submit_order(
        &self,
        order: SwapOrder,
        signature: String,
    ) -> Result<(), RelayerError> {
        order.verify_id()?;
        let key = order.order_id.to_hex();
        if self.store.get::<SwapOrder>(ORDERS, &key)?.is_none() {
            return Err(RelayerError::UnknownOrder(order.order_id));
        }

        self.statuses.create_pending(order.order_id)?;
        let order_id = order.order_id;
        let receivers = self
            .bus
            .publish(SwapEvent::NewOrder(NewOrderEvent { order, signature }))
            .await;
        if receivers == 0 {
            warn!(order_id = %order_id, "Order dispatched with no resolvers listening");
        } else {
            info!(order_id = %order_id, receivers, "Order dispatched");
        }
        Ok(())
    }

    /// Look up an order's settlement status.
    pub fn order_status(&self, order_id: &OrderId) -> Result<SettlementStatus, RelayerError> {
        self.statuses
            .get(order_id)?
            .ok_or(RelayerError::UnknownOrder(*order_id))
    }

    /// Record a resolver's fill notification.
    pub fn handle_order_filled(&self, event: &OrderFilledEvent) -> Result<(), RelayerError> {
        self.store
            .put(FILLED_ORDERS, &event.order_id.to_hex(), event)?;
        info!(order_id = %event.order_id, "Fill recorded");
        Ok(())
    }

    /// Previously created order, if any.
    pub fn get_order(&self, order_id: &OrderId) -> Result<Option<SwapOrder>, RelayerError> {
        Ok(self.store.get(ORDERS, &order_id.to_hex())?)
    }

    /// Parse a party address in `chain`'s native format down to the order
    /// format, minting a proxy for first-seen Sui identities.
    fn normalize_party(&self, address: &str, chain: ChainId) -> Result<EvmAddress, RelayerError> {
        match chain {
            ChainId::Ethereum => Ok(address.parse::<EvmAddress>()?),
            ChainId::Sui => {
                let sui = address.parse::<SuiAddress>()?;
                Ok(self.registry.ensure_proxy(&sui)?)
            }
        }
    }
}

fn parse_asset(asset: &str, chain: ChainId) -> Result<AssetRef, RelayerError> {
    match chain {
        ChainId::Ethereum => Ok(AssetRef::Token(asset.parse::<EvmAddress>()?)),
        ChainId::Sui => {
            if asset.is_empty() {
                return Err(RelayerError::InvalidRequest("empty coin type".into()));
            }
            Ok(AssetRef::CoinType(asset.to_string()))
        }
    }
}

/// Spawn a background task mirroring fill events into the store.
pub fn spawn_fill_listener(
    service: Arc<RelayerService>,
    bus: Arc<InMemoryDispatchBus>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut sub = bus.subscribe(EventFilter::topics(vec![EventTopic::Fills]));
        while let Some(event) = sub.recv().await {
            if let SwapEvent::OrderFilled(filled) = event {
                if let Err(e) = service.handle_order_filled(&filled) {
                    warn!(order_id = %filled.order_id, error = %e, "Failed to record fill");
                }
            }
        }
    })
}

/// Serves maker secrets to the settlement engine from the relayer's records.
pub struct RelayerSecretStore {
    store: Arc<dyn RecordStore>,
}

impl RelayerSecretStore {
    /// Wrap the shared record store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SecretProvider for RelayerSecretStore {
    async fn secret_for(&self, order_id: &OrderId) -> Result<SecretPreimage, SettlementError> {
        self.store
            .get::<SecretPreimage>(ORDER_SECRETS, &order_id.to_hex())?
            .ok_or(SettlementError::SecretUnavailable(*order_id))
    }
}
