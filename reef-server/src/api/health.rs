//! Health check route
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/health | GET | Liveness, version and engine epoch |
//!
//! Clients compare `epoch` across polls to detect server restarts and
//! force a full refetch.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

/// Health route - public, no authentication
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// Status (ok | error)
    status: &'static str,
    /// Crate version
    version: &'static str,
    /// Engine instance epoch (changes on restart)
    epoch: String,
    /// Server time (Unix milliseconds)
    timestamp: i64,
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        epoch: state.engine.epoch().to_string(),
        timestamp: shared::util::now_millis(),
    })
}
