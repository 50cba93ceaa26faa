//! API route modules
//!
//! # Structure
//!
//! - [`health`] - liveness check and instance epoch
//! - [`orders`] - order commands and queries
//! - [`events`] - SSE change feed

pub mod events;
pub mod health;
pub mod orders;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// Build the fully configured application router
///
/// Used by both the HTTP server and in-process oneshot clients.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(orders::router())
        .merge(events::router())
        .merge(health::router())
        // CORS - the tracking page is served from the resort site
        .layer(CorsLayer::permissive())
        // Trace - request tracing
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
