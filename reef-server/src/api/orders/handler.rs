//! Order API Handlers
//!
//! Thin transport layer over the FulfillmentEngine: deserialization,
//! delegation, error mapping. Success bodies are the order itself;
//! rejections carry the typed order error in the envelope.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::order::{CreateOrderInput, DeliveryLocation, Order, OrderStatus};

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Guest contact (room number or phone) for self-service lookup;
    /// without it the active set is returned
    pub contact: Option<String>,
}

/// POST /api/orders - Create an order
///
/// Called by the guest-facing ordering flow; the order starts `PENDING`.
pub async fn create(
    State(state): State<ServerState>,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<Json<Order>> {
    let order = state.engine.create_order(input)?;
    Ok(Json(order))
}

/// GET /api/orders - List active orders, or orders for a guest contact
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = match query.contact {
        Some(contact) => state.engine.list_orders_by_guest_contact(&contact)?,
        None => state.engine.list_active_orders()?,
    };
    Ok(Json(orders))
}

/// GET /api/orders/:id - Get a single order
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.engine.get_order(&id)?;
    Ok(Json(order))
}

/// Body for the advance command
#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    /// The status the caller believes the order is in
    pub expected_status: OrderStatus,
}

/// POST /api/orders/:id/advance - Advance one step along the flow
///
/// Rejected with 409 `STALE_TRANSITION` when `expected_status` no longer
/// matches the persisted status.
pub async fn advance(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(req): Json<AdvanceRequest>,
) -> AppResult<Json<Order>> {
    let order = state.engine.advance(&id, req.expected_status)?;
    Ok(Json(order))
}

/// Body for the delivery choice command
#[derive(Debug, Deserialize)]
pub struct DeliveryChoiceRequest {
    pub location: DeliveryLocation,
}

/// POST /api/orders/:id/delivery - Record the guest's delivery choice
pub async fn choose_delivery(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(req): Json<DeliveryChoiceRequest>,
) -> AppResult<Json<Order>> {
    let order = state.engine.choose_delivery(&id, req.location)?;
    Ok(Json(order))
}

/// POST /api/orders/:id/cancel - Cancel from any non-terminal status
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.engine.cancel(&id)?;
    Ok(Json(order))
}
