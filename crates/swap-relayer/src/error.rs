//! Relayer request-surface errors and their HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use shared_types::{OrderId, TypeError};
use swap_order::OrderError;
use swap_registry::RegistryError;
use swap_store::StoreError;
use thiserror::Error;

/// Errors produced by the relayer service.
#[derive(Debug, Error)]
pub enum RelayerError {
    /// A request field failed to parse as an address, hash, or chain id.
    #[error("Invalid request field: {0}")]
    InvalidField(#[from] TypeError),

    /// Order validation failure.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Mapping registry failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Submit or status query referenced an order the relayer never created.
    #[error("Unknown order: {0}")]
    UnknownOrder(OrderId),

    /// Malformed request body.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl IntoResponse for RelayerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidField(_) | Self::Order(_) | Self::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::UnknownOrder(_) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Registry(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
