//! Order API Module
//!
//! Commands and queries for the fulfillment pipeline. All mutations go
//! through the FulfillmentEngine.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new()
        // Create (guest ordering flow) and list (active / by guest contact)
        .route("/api/orders", post(handler::create).get(handler::list))
        // Order detail
        .route("/api/orders/{id}", get(handler::get_by_id))
        // Gated transition commands
        .route("/api/orders/{id}/advance", post(handler::advance))
        .route("/api/orders/{id}/delivery", post(handler::choose_delivery))
        .route("/api/orders/{id}/cancel", post(handler::cancel))
}
