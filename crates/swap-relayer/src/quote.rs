//! # Quote Service
//!
//! Indicative pricing for a prospective swap. The rate is a placeholder
//! constant, not market data; the endpoint exists so makers can exercise
//! the full order flow and so quotes are on record before orders arrive.

use crate::error::RelayerError;
use serde::{Deserialize, Serialize};
use shared_types::ChainId;
use std::sync::Arc;
use swap_store::{RecordStore, RecordStoreExt};
use tracing::info;
use uuid::Uuid;

const QUOTES: &str = "quotes";

/// Placeholder exchange rate applied to every pair.
const PLACEHOLDER_RATE: f64 = 1.5;

/// Quote request from a maker.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Amount of the source asset.
    pub amount: u64,
    /// Numeric source chain id.
    pub src_chain: u64,
    /// Numeric destination chain id.
    pub dst_chain: u64,
}

/// Auction-duration preset offered with a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotePreset {
    /// Auction duration in seconds.
    pub auction_duration_secs: u64,
    /// Initial rate adjustment in basis points.
    pub initial_rate_bump: u32,
}

/// Preset triplet keyed by urgency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotePresets {
    /// Shortest auction, highest bump.
    pub fast: QuotePreset,
    /// Default.
    pub medium: QuotePreset,
    /// Longest auction, lowest bump.
    pub slow: QuotePreset,
}

impl Default for QuotePresets {
    fn default() -> Self {
        Self {
            fast: QuotePreset {
                auction_duration_secs: 120,
                initial_rate_bump: 500,
            },
            medium: QuotePreset {
                auction_duration_secs: 300,
                initial_rate_bump: 300,
            },
            slow: QuotePreset {
                auction_duration_secs: 600,
                initial_rate_bump: 100,
            },
        }
    }
}

/// A persisted indicative quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    /// Unique quote identifier.
    pub quote_id: String,
    /// Source amount quoted.
    pub amount: u64,
    /// Indicative destination amount.
    pub converted_amount: u64,
    /// Rate applied.
    pub rate: f64,
    /// Source chain.
    pub src_chain: ChainId,
    /// Destination chain.
    pub dst_chain: ChainId,
    /// Offered auction presets.
    pub presets: QuotePresets,
}

/// Produces and records quotes.
pub struct QuoteService {
    store: Arc<dyn RecordStore>,
}

impl QuoteService {
    /// Wrap the shared record store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Price a prospective swap and persist the quote.
    pub fn quote(&self, req: QuoteRequest) -> Result<Quote, RelayerError> {
        let src_chain = ChainId::from_numeric(req.src_chain)?;
        let dst_chain = ChainId::from_numeric(req.dst_chain)?;
        if src_chain == dst_chain {
            return Err(RelayerError::InvalidRequest(
                "source and destination chain must differ".into(),
            ));
        }

        let converted_amount = (req.amount as f64 * PLACEHOLDER_RATE) as u64;
        let quote = Quote {
            quote_id: Uuid::new_v4().to_string(),
            amount: req.amount,
            converted_amount,
            rate: PLACEHOLDER_RATE,
            src_chain,
            dst_chain,
            presets: QuotePresets::default(),
        };

        self.store.put(QUOTES, &quote.quote_id, &quote)?;
        info!(quote_id = %quote.quote_id, amount = req.amount, converted = converted_amount, "Quote issued");
        Ok(quote)
    }

    /// Fetch a previously issued quote.
    pub fn get(&self, quote_id: &str) -> Result<Option<Quote>, RelayerError> {
        Ok(self.store.get(QUOTES, quote_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swap_store::InMemoryStore;

    fn quotes() -> QuoteService {
        QuoteService::new(Arc::new(InMemoryStore::new()))
    }

    #[test]
    fn test_quote_applies_rate() {
        let service = quotes();
        let quote = service
            .quote(QuoteRequest {
                amount: 1_000,
                src_chain: ChainId::Ethereum.numeric(),
                dst_chain: ChainId::Sui.numeric(),
            })
            .unwrap();

        assert_eq!(quote.converted_amount, 1_500);
        assert_eq!(quote.presets, QuotePresets::default());
    }

    #[test]
    fn test_quote_persisted() {
        let service = quotes();
        let quote = service
            .quote(QuoteRequest {
                amount: 42,
                src_chain: ChainId::Sui.numeric(),
                dst_chain: ChainId::Ethereum.numeric(),
            })
            .unwrap();

        let stored = service.get(&quote.quote_id).unwrap().unwrap();
        assert_eq!(stored.amount, 42);
    }

    #[test]
    fn test_same_chain_rejected() {
        let service = quotes();
        let result = service.quote(QuoteRequest {
            amount: 1,
            src_chain: ChainId::Ethereum.numeric(),
            dst_chain: ChainId::Ethereum.numeric(),
        });
        assert!(matches!(result, Err(RelayerError::InvalidRequest(_))));
    }

    #[test]
    fn test_unknown_chain_rejected() {
        let service = quotes();
        let result = service.quote(QuoteRequest {
            amount: 1,
            src_chain: 7,
            dst_chain: ChainId::Sui.numeric(),
        });
        assert!(matches!(result, Err(RelayerError::InvalidField(_))));
    }
}
