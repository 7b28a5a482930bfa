//! # HTTP Surface
//!
//! The relayer's REST endpoints. Thin request/response shims over
//! [`RelayerService`] and [`QuoteService`]; all validation beyond field
//! parsing lives in the services.

use crate::error::RelayerError;
use crate::quote::{Quote, QuoteRequest, QuoteService};
use crate::service::{CreateOrderRequest, RelayerService};
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared_types::OrderId;
use std::sync::Arc;
use swap_order::SwapOrder;
use swap_store::SettlementStatus;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Order pipeline.
    pub relayer: Arc<RelayerService>,
    /// Quote pipeline.
    pub quoter: Arc<QuoteService>,
}

/// Build the relayer router.
pub fn router(relayer: Arc<RelayerService>, quoter: Arc<QuoteService>) -> Router {
    let state = AppState { relayer, quoter };

    Router::new()
        .route("/relayer/createOrder", post(create_order))
        .route("/relayer/submitOrder", post(submit_order))
        .route("/relayer/checkOrderStatus", get(check_order_status))
        .route("/quoter/quote/receive", post(receive_quote))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Response to a successful order creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    /// The order's canonical id.
    pub order_id: OrderId,
    /// The sealed order for the maker to sign.
    pub order: SwapOrder,
}

async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, RelayerError> {
    let order = state.relayer.create_order(req)?;
    Ok(Json(CreateOrderResponse {
        order_id: order.order_id,
        order,
    }))
}

/// Signed order submission.
#[derive(Debug, Deserialize)]
pub struct SubmitOrderRequest {
    /// The order as returned by `createOrder`.
    pub order: SwapOrder,
    /// Maker's signature over the order's signable payload.
    pub signature: String,
}

async fn submit_order(
    State(state): State<AppState>,
    Json(req): Json<SubmitOrderRequest>,
) -> Result<Json<Value>, RelayerError> {
    let order_id = req.order.order_id;
    state.relayer.submit_order(req.order, req.signature).await?;
    Ok(Json(json!({
        "status": "dispatched",
        "orderId": order_id,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusQuery {
    order_id: String,
}

async fn check_order_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<SettlementStatus>, RelayerError> {
    let order_id: OrderId = query
        .order_id
        .parse()
        .map_err(RelayerError::InvalidField)?;
    Ok(Json(state.relayer.order_status(&order_id)?))
}

async fn receive_quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<Quote>, RelayerError> {
    Ok(Json(state.quoter.quote(req)?))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}
