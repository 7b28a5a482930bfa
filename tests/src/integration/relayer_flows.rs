//! # Relayer Flow Tests
//!
//! Maker-facing journeys at the service layer: quoting, order creation,
//! submission, and what survives a process restart when the record store
//! is file-backed.

#[cfg(test)]
mod tests {
    use shared_bus::InMemoryDispatchBus;
    use shared_types::{ChainId, TxRef};
    use std::path::Path;
    use std::sync::Arc;
    use swap_order::{verify, HashFamily};
    use swap_registry::MappingRegistry;
    use swap_relayer::{
        CreateOrderRequest, QuoteRequest, QuoteService, RelayerSecretStore, RelayerService,
    };
    use swap_settlement::SecretProvider;
    use swap_store::{
        JsonFileStore, RecordStore, SettlementPhase, StatusStore, TxRefSet,
    };

    fn open_store(path: &Path) -> Arc<dyn RecordStore> {
        Arc::new(JsonFileStore::open(path).unwrap())
    }

    fn relayer_on(store: Arc<dyn RecordStore>) -> RelayerService {
        RelayerService::new(
            store.clone(),
            Arc::new(StatusStore::new(store.clone())),
            Arc::new(MappingRegistry::new(store)),
            Arc::new(InMemoryDispatchBus::new()),
        )
    }

    fn request(secret: &str) -> CreateOrderRequest {
        CreateOrderRequest {
            maker: format!("0x{}", "11".repeat(20)),
            receiver: format!("0x{}", "22".repeat(32)),
            maker_asset: format!("0x{}", "ee".repeat(20)),
            taker_asset: "0x2::silver::SILVER".to_string(),
            making_amount: 1_000,
            taking_amount: 1_500,
            src_chain: ChainId::Ethereum.numeric(),
            dst_chain: ChainId::Sui.numeric(),
            secret: secret.to_string(),
            nonce: 0,
            src_safety_deposit: 10,
            dst_safety_deposit: 10,
        }
    }

    #[tokio::test]
    async fn test_quote_then_order_journey() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir.path().join("data.json"));
        let relayer = relayer_on(store.clone());
        let quoter = QuoteService::new(store);

        // Quote first, then place an order at the quoted amount.
        let quote = quoter
            .quote(QuoteRequest {
                amount: 1_000,
                src_chain: ChainId::Ethereum.numeric(),
                dst_chain: ChainId::Sui.numeric(),
            })
            .unwrap();
        assert_eq!(quote.converted_amount, 1_500);

        let mut req = request("journey secret");
        req.taking_amount = quote.converted_amount;
        let order = relayer.create_order(req).unwrap();

        // Submission with no resolvers listening still records Pending.
        relayer
            .submit_order(order.clone(), "0xsig".to_string())
            .await
            .unwrap();
        let status = relayer.order_status(&order.order_id).unwrap();
        assert_eq!(status.phase, SettlementPhase::Pending);
    }

    #[tokio::test]
    async fn test_orders_and_secrets_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let order = {
            let relayer = relayer_on(open_store(&path));
            relayer.create_order(request("durable secret")).unwrap()
        };

        // A fresh process over the same file can serve the order and still
        // produce the matching pre-image for settlement.
        let store = open_store(&path);
        let relayer = relayer_on(store.clone());
        let reloaded = relayer.get_order(&order.order_id).unwrap().unwrap();
        assert_eq!(reloaded.order_id, order.order_id);

        let secrets = RelayerSecretStore::new(store);
        let secret = secrets.secret_for(&order.order_id).await.unwrap();
        assert!(verify(
            HashFamily::Keccak256,
            &secret,
            &order.params.commitment
        ));
        assert!(verify(
            HashFamily::Sha256,
            &secret,
            &order.params.dst_commitment
        ));
    }

    #[tokio::test]
    async fn test_statuses_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let order_id = {
            let relayer = relayer_on(open_store(&path));
            let order = relayer.create_order(request("status secret")).unwrap();
            relayer
                .submit_order(order.clone(), "0xsig".to_string())
                .await
                .unwrap();

            // A resolver completes the fill before the restart.
            let statuses = StatusStore::new(open_store(&path));
            assert!(statuses.try_claim(&order.order_id).unwrap());
            statuses
                .complete(
                    &order.order_id,
                    TxRefSet {
                        src_escrow_tx: Some(TxRef::new("0xaa")),
                        dst_escrow_tx: Some(TxRef::new("0xbb")),
                        dst_claim_tx: Some(TxRef::new("0xcc")),
                        src_claim_tx: Some(TxRef::new("0xdd")),
                    },
                )
                .unwrap();
            order.order_id
        };

        let relayer = relayer_on(open_store(&path));
        let status = relayer.order_status(&order_id).unwrap();
        assert_eq!(status.phase, SettlementPhase::Filled);
        assert!(status.tx_refs.is_complete());
    }
}
