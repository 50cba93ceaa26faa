//! Order domain types
//!
//! This module provides the types for the order fulfillment pipeline:
//!
//! - **model**: the order record and its line items
//! - **flow**: the static status flow table
//! - **event**: change events and broadcast topics
//! - **error**: the error taxonomy shared by the engine and its clients
//! - **input**: guest-facing order creation inputs

pub mod error;
pub mod event;
pub mod flow;
pub mod input;
pub mod model;

// Re-exports
pub use error::OrderError;
pub use event::{OrderChanged, Topic};
pub use input::{CreateOrderInput, MenuItem, OrderItemInput};
pub use model::{DeliveryLocation, Order, OrderItem, OrderStatus};
