//! # Settlement Flow Tests
//!
//! The full stack wired the way the node wires it: orders enter through
//! [`RelayerService`], travel the dispatch bus to a chain-specialized
//! resolver worker, and settle across both dev ledgers. Assertions are on
//! ledger effects and recorded statuses, not on intermediate machinery.

#[cfg(test)]
mod tests {
    use shared_bus::{InMemoryDispatchBus, OrderFilledEvent};
    use shared_types::{AccountId, AssetRef, ChainId, EvmAddress, OrderId, SuiAddress};
    use std::sync::Arc;
    use std::time::Duration;
    use swap_chains::{ChainAdapter, InMemoryEvmChain, InMemorySuiChain};
    use swap_registry::MappingRegistry;
    use swap_relayer::{
        spawn_fill_listener, CreateOrderRequest, RelayerSecretStore, RelayerService,
    };
    use swap_settlement::{ResolverIdentity, ResolverWorker, SettlementOrchestrator};
    use swap_store::{
        InMemoryStore, RecordStore, RecordStoreExt, SettlementPhase, SettlementStatus, StatusStore,
    };
    use tokio::time::sleep;

    const SILVER: &str = "0x2::silver::SILVER";

    fn token_hex() -> String {
        format!("0x{}", "ee".repeat(20))
    }

    fn token() -> AssetRef {
        AssetRef::Token(EvmAddress([0xEE; 20]))
    }

    struct Stack {
        store: Arc<dyn RecordStore>,
        statuses: Arc<StatusStore>,
        registry: Arc<MappingRegistry>,
        relayer: Arc<RelayerService>,
        evm: Arc<InMemoryEvmChain>,
        sui: Arc<InMemorySuiChain>,
        resolver: ResolverIdentity,
    }

    /// Wire the whole process: two workers, fill listener, empty ledgers.
    async fn stack() -> Stack {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        let statuses = Arc::new(StatusStore::new(store.clone()));
        let registry = Arc::new(MappingRegistry::new(store.clone()));
        let bus = Arc::new(InMemoryDispatchBus::new());
        let evm = Arc::new(InMemoryEvmChain::new());
        let sui = Arc::new(InMemorySuiChain::new());
        let resolver = ResolverIdentity {
            evm: EvmAddress([0x30; 20]),
            sui: SuiAddress([0x40; 32]),
        };

        let secrets = Arc::new(RelayerSecretStore::new(store.clone()));
        let orchestrator = Arc::new(
            SettlementOrchestrator::new(
                statuses.clone(),
                registry.clone(),
                secrets,
                resolver,
            )
            .with_adapter(evm.clone())
            .with_adapter(sui.clone()),
        );
        ResolverWorker::new(
            "flow-eth",
            bus.clone(),
            orchestrator.clone(),
            vec![ChainId::Ethereum],
        )
        .spawn();
        ResolverWorker::new("flow-sui", bus.clone(), orchestrator, vec![ChainId::Sui]).spawn();

        let relayer = Arc::new(RelayerService::new(
            store.clone(),
            statuses.clone(),
            registry.clone(),
            bus.clone(),
        ));
        spawn_fill_listener(relayer.clone(), bus);

        // Let the workers subscribe before anything is dispatched.
        sleep(Duration::from_millis(50)).await;

        Stack {
            store,
            statuses,
            registry,
            relayer,
            evm,
            sui,
            resolver,
        }
    }

    fn eth_to_sui_request(secret: &str) -> CreateOrderRequest {
        CreateOrderRequest {
            maker: format!("0x{}", "11".repeat(20)),
            receiver: format!("0x{}", "22".repeat(32)),
            maker_asset: token_hex(),
            taker_asset: SILVER.to_string(),
            making_amount: 1_000,
            taking_amount: 2_000,
            src_chain: ChainId::Ethereum.numeric(),
            dst_chain: ChainId::Sui.numeric(),
            secret: secret.to_string(),
            nonce: 0,
            src_safety_deposit: 10,
            dst_safety_deposit: 10,
        }
    }

    async fn wait_for_terminal(statuses: &StatusStore, order_id: &OrderId) -> SettlementStatus {
        for _ in 0..200 {
            if let Some(status) = statuses.get(order_id).unwrap() {
                if matches!(
                    status.phase,
                    SettlementPhase::Filled | SettlementPhase::Failed
                ) {
                    return status;
                }
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("order {order_id} never reached a terminal phase");
    }

    async fn wait_for_fill_record(store: &Arc<dyn RecordStore>, order_id: &OrderId) -> OrderFilledEvent {
        for _ in 0..100 {
            if let Some(event) = store
                .get::<OrderFilledEvent>("filled_orders", &order_id.to_hex())
                .unwrap()
            {
                return event;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("fill for {order_id} was never recorded");
    }

    #[tokio::test]
    async fn test_eth_to_sui_order_settles_end_to_end() {
        let stack = stack().await;
        let maker = AccountId::Evm(EvmAddress([0x11; 20]));
        let receiver = AccountId::Sui(SuiAddress([0x22; 32]));
        stack.evm.credit(maker, token(), 10_000);
        stack.sui.fund(stack.resolver.account_on(ChainId::Sui), SILVER, 3_000);

        let order = stack
            .relayer
            .create_order(eth_to_sui_request("flow secret one"))
            .unwrap();
        stack
            .relayer
            .submit_order(order.clone(), "0xsig".to_string())
            .await
            .unwrap();

        let status = wait_for_terminal(&stack.statuses, &order.order_id).await;
        assert_eq!(status.phase, SettlementPhase::Filled);
        assert!(status.tx_refs.is_complete());

        // Maker paid on Ethereum, receiver collected on Sui, resolver holds
        // the claimed source funds.
        let maker_left = stack.evm.query_balance(&maker, &token()).await.unwrap();
        assert_eq!(maker_left, 9_000);
        let received = stack
            .sui
            .query_balance(&receiver, &AssetRef::CoinType(SILVER.to_string()))
            .await
            .unwrap();
        assert_eq!(received, 2_000);
        let claimed = stack
            .evm
            .query_balance(&stack.resolver.account_on(ChainId::Ethereum), &token())
            .await
            .unwrap();
        assert_eq!(claimed, 1_000);

        // The fill listener mirrored the resolver's notification.
        let fill = wait_for_fill_record(&stack.store, &order.order_id).await;
        assert_eq!(fill.src_chain, ChainId::Ethereum);
    }

    #[tokio::test]
    async fn test_sui_to_eth_order_settles_end_to_end() {
        let stack = stack().await;
        let maker = AccountId::Sui(SuiAddress([0x55; 32]));
        let receiver = AccountId::Evm(EvmAddress([0x66; 20]));
        // Two coins so the source escrow has to top up and mint change.
        stack.sui.fund(maker, SILVER, 600);
        stack.sui.fund(maker, SILVER, 600);
        stack
            .evm
            .credit(stack.resolver.account_on(ChainId::Ethereum), token(), 10_000);

        let order = stack
            .relayer
            .create_order(CreateOrderRequest {
                maker: format!("0x{}", "55".repeat(32)),
                receiver: format!("0x{}", "66".repeat(20)),
                maker_asset: SILVER.to_string(),
                taker_asset: token_hex(),
                making_amount: 1_000,
                taking_amount: 1_500,
                src_chain: ChainId::Sui.numeric(),
                dst_chain: ChainId::Ethereum.numeric(),
                secret: "flow secret reverse".to_string(),
                nonce: 0,
                src_safety_deposit: 10,
                dst_safety_deposit: 10,
            })
            .unwrap();
        stack
            .relayer
            .submit_order(order.clone(), "0xsig".to_string())
            .await
            .unwrap();

        let status = wait_for_terminal(&stack.statuses, &order.order_id).await;
        assert_eq!(status.phase, SettlementPhase::Filled);

        let received = stack.evm.query_balance(&receiver, &token()).await.unwrap();
        assert_eq!(received, 1_500);
        let claimed = stack
            .sui
            .query_balance(
                &stack.resolver.account_on(ChainId::Sui),
                &AssetRef::CoinType(SILVER.to_string()),
            )
            .await
            .unwrap();
        assert_eq!(claimed, 1_000);
        // Change from the 600+600 coins used to fund 1000
        let maker_left = stack
            .sui
            .query_balance(&maker, &AssetRef::CoinType(SILVER.to_string()))
            .await
            .unwrap();
        assert_eq!(maker_left, 200);
    }

    #[tokio::test]
    async fn test_source_confirmation_timeout_never_funds_destination() {
        let stack = stack().await;
        let maker = AccountId::Evm(EvmAddress([0x11; 20]));
        stack.evm.credit(maker, token(), 10_000);
        stack.sui.fund(stack.resolver.account_on(ChainId::Sui), SILVER, 3_000);
        stack.evm.set_confirmation_hold(true);

        let order = stack
            .relayer
            .create_order(eth_to_sui_request("flow secret timeout"))
            .unwrap();
        stack
            .relayer
            .submit_order(order.clone(), "0xsig".to_string())
            .await
            .unwrap();

        let status = wait_for_terminal(&stack.statuses, &order.order_id).await;
        assert_eq!(status.phase, SettlementPhase::Failed);
        assert!(status
            .error_detail
            .unwrap()
            .starts_with("ConfirmationTimeout"));
        assert!(status.tx_refs.src_escrow_tx.is_some());
        assert!(status.tx_refs.dst_escrow_tx.is_none());

        // The resolver's destination liquidity was never touched.
        let untouched = stack
            .sui
            .query_balance(
                &stack.resolver.account_on(ChainId::Sui),
                &AssetRef::CoinType(SILVER.to_string()),
            )
            .await
            .unwrap();
        assert_eq!(untouched, 3_000);
    }

    #[tokio::test]
    async fn test_duplicate_submission_fills_once() {
        let stack = stack().await;
        let maker = AccountId::Evm(EvmAddress([0x11; 20]));
        let receiver = AccountId::Sui(SuiAddress([0x22; 32]));
        stack.evm.credit(maker, token(), 10_000);
        stack.sui.fund(stack.resolver.account_on(ChainId::Sui), SILVER, 5_000);

        let order = stack
            .relayer
            .create_order(eth_to_sui_request("flow secret duplicate"))
            .unwrap();
        stack
            .relayer
            .submit_order(order.clone(), "0xsig".to_string())
            .await
            .unwrap();
        stack
            .relayer
            .submit_order(order.clone(), "0xsig".to_string())
            .await
            .unwrap();

        let status = wait_for_terminal(&stack.statuses, &order.order_id).await;
        assert_eq!(status.phase, SettlementPhase::Filled);

        // Give a losing second fill every chance to (wrongly) run.
        sleep(Duration::from_millis(100)).await;
        let maker_left = stack.evm.query_balance(&maker, &token()).await.unwrap();
        assert_eq!(maker_left, 9_000);
        let received = stack
            .sui
            .query_balance(&receiver, &AssetRef::CoinType(SILVER.to_string()))
            .await
            .unwrap();
        assert_eq!(received, 2_000);
    }

    #[tokio::test]
    async fn test_repeat_receiver_reuses_proxy() {
        let stack = stack().await;
        let receiver_sui = SuiAddress([0x22; 32]);

        let first = stack
            .relayer
            .create_order(eth_to_sui_request("proxy reuse a"))
            .unwrap();
        let second = stack
            .relayer
            .create_order(CreateOrderRequest {
                nonce: 1,
                ..eth_to_sui_request("proxy reuse b")
            })
            .unwrap();

        assert_ne!(first.order_id, second.order_id);
        assert_eq!(first.params.receiver, second.params.receiver);

        let mapped = stack
            .registry
            .lookup_by_foreign(&receiver_sui)
            .unwrap()
            .unwrap();
        assert_eq!(mapped, first.params.receiver);
        assert_eq!(
            stack.registry.lookup_by_proxy(&mapped).unwrap().unwrap(),
            receiver_sui
        );
    }
}
