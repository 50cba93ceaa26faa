//! Shared types for the Reef room-service suite
//!
//! Domain types used by both the fulfillment server and the terminal
//! clients: the order model, the status flow table, change events and
//! topics, and the order error taxonomy.

pub mod order;
pub mod util;

// Re-exports
pub use order::{
    CreateOrderInput, DeliveryLocation, MenuItem, Order, OrderChanged, OrderError, OrderItem,
    OrderItemInput, OrderStatus, Topic,
};
pub use serde::{Deserialize, Serialize};
