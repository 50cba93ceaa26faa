//! Order fulfillment pipeline
//!
//! This module implements the order pipeline around the shared status
//! flow table:
//!
//! - **store**: redb persistence, the source of truth for order state
//! - **engine**: command processing gated on expected current status
//! - **broadcast**: per-topic fan-out of committed transitions
//! - **money**: decimal helpers for order totals
//!
//! # Data Flow
//!
//! ```text
//! Command → FulfillmentEngine → OrderStore (redb, one write txn)
//!                 │
//!                 └─ after commit → ChangeBroadcaster → subscribed sessions
//! ```
//!
//! Push delivery is best-effort; each session's reconciliation poller
//! re-fetches authoritative state to bound staleness.

pub mod broadcast;
pub mod engine;
pub mod money;
pub mod store;

// Re-exports
pub use broadcast::ChangeBroadcaster;
pub use engine::{EngineError, EngineResult, FulfillmentEngine};
pub use store::{OrderStore, StoreError, StoreResult};

// Re-export shared types for convenience
pub use shared::order::{
    CreateOrderInput, DeliveryLocation, Order, OrderChanged, OrderError, OrderItem, OrderStatus,
    Topic,
};
