//! # Crosswap Relayer Node
//!
//! The main entry point. One process hosts the whole coordination stack:
//!
//! ```text
//! HTTP (axum)
//!   ├── RelayerService ──publish NewOrder──→ InMemoryDispatchBus
//!   └── QuoteService                              │
//!                                    ┌────────────┴────────────┐
//!                                    ↓                         ↓
//!                          ResolverWorker (eth src)  ResolverWorker (sui src)
//!                                    │                         │
//!                                    └──→ SettlementOrchestrator
//!                                              │
//!                                    InMemoryEvmChain / InMemorySuiChain
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file path from the first CLI argument, optional)
//! 2. Open the record store (JSON file or in-memory)
//! 3. Seed dev-ledger liquidity from the funding table
//! 4. Spawn one resolver worker per source chain, plus the fill listener
//! 5. Serve HTTP until Ctrl+C

mod config;

use crate::config::NodeConfig;
use anyhow::Context;
use shared_bus::InMemoryDispatchBus;
use shared_types::{AccountId, AssetRef, ChainId};
use std::net::SocketAddr;
use std::sync::Arc;
use swap_chains::{InMemoryEvmChain, InMemorySuiChain};
use swap_registry::MappingRegistry;
use swap_relayer::{spawn_fill_listener, QuoteService, RelayerSecretStore, RelayerService};
use swap_settlement::{
    ResolverIdentity, ResolverWorker, SettlementConfig, SettlementOrchestrator,
};
use swap_store::{InMemoryStore, JsonFileStore, RecordStore, StatusStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Apply the funding table to the dev ledgers.
fn seed_ledgers(
    config: &NodeConfig,
    evm: &InMemoryEvmChain,
    sui: &InMemorySuiChain,
) -> anyhow::Result<()> {
    for entry in &config.funding {
        match ChainId::from_numeric(entry.chain)? {
            ChainId::Ethereum => {
                let account = AccountId::Evm(entry.account.parse()?);
                let asset = AssetRef::Token(entry.asset.parse()?);
                evm.credit(account, asset, entry.amount);
            }
            ChainId::Sui => {
                let account = AccountId::Sui(entry.account.parse()?);
                sui.fund(account, &entry.asset, entry.amount);
            }
        }
        info!(
            account = %entry.account,
            chain = entry.chain,
            asset = %entry.asset,
            amount = entry.amount,
            "Seeded ledger balance"
        );
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args().nth(1);
    let config =
        NodeConfig::load(config_path.as_deref()).context("Failed to load configuration")?;

    info!("===========================================");
    info!("  Crosswap Relayer Node v{}", swap_relayer::VERSION);
    info!("===========================================");

    // Shared persistence.
    let store: Arc<dyn RecordStore> = match &config.data_file {
        Some(path) => Arc::new(
            JsonFileStore::open(path)
                .with_context(|| format!("Failed to open record store at {}", path.display()))?,
        ),
        None => Arc::new(InMemoryStore::new()),
    };
    let statuses = Arc::new(StatusStore::new(store.clone()));
    let registry = Arc::new(MappingRegistry::new(store.clone()));
    let bus = Arc::new(InMemoryDispatchBus::new());

    // Dev ledgers and the resolver's identity on each.
    let evm = Arc::new(InMemoryEvmChain::new());
    let sui = Arc::new(InMemorySuiChain::new());
    seed_ledgers(&config, &evm, &sui)?;
    let resolver = ResolverIdentity {
        evm: config.resolver.evm()?,
        sui: config.resolver.sui()?,
    };

    // Settlement: one orchestrator shared by one worker per source chain.
    let secrets = Arc::new(RelayerSecretStore::new(store.clone()));
    let orchestrator = Arc::new(
        SettlementOrchestrator::new(statuses.clone(), registry.clone(), secrets, resolver)
            .with_adapter(evm)
            .with_adapter(sui)
            .with_config(SettlementConfig {
                confirmation_timeout_secs: config.confirmation_timeout_secs,
            }),
    );
    ResolverWorker::new(
        "resolver-eth",
        bus.clone(),
        orchestrator.clone(),
        vec![ChainId::Ethereum],
    )
    .spawn();
    ResolverWorker::new("resolver-sui", bus.clone(), orchestrator, vec![ChainId::Sui]).spawn();

    // Relayer services and the HTTP surface.
    let relayer = Arc::new(RelayerService::new(store.clone(), statuses, registry, bus.clone()));
    spawn_fill_listener(relayer.clone(), bus);
    let quoter = Arc::new(QuoteService::new(store));
    let app = swap_relayer::router(relayer, quoter);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Relayer listening. Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}
