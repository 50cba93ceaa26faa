//! Order model - one guest food order and its line items

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Order status - linear progression with one conditional skip
///
/// `Delivering` is skipped entirely when the guest collects at the
/// restaurant. `Cancelled` is reachable from any non-terminal status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Accepted,
    Preparing,
    Ready,
    Delivering,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Terminal statuses accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Accepted => write!(f, "ACCEPTED"),
            OrderStatus::Preparing => write!(f, "PREPARING"),
            OrderStatus::Ready => write!(f, "READY"),
            OrderStatus::Delivering => write!(f, "DELIVERING"),
            OrderStatus::Delivered => write!(f, "DELIVERED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Where the guest receives the order, chosen while the order is `Ready`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryLocation {
    /// Staff bring the order to the guest's room
    Room,
    /// Guest collects in person at the restaurant
    Restaurant,
}

impl fmt::Display for DeliveryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryLocation::Room => write!(f, "ROOM"),
            DeliveryLocation::Restaurant => write!(f, "RESTAURANT"),
        }
    }
}

/// One line item, owned by its order (created together, never reassigned)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Catalog id of the ordered dish
    pub menu_item_id: String,
    /// Name snapshot captured at order time
    pub name: String,
    /// Quantity (positive)
    pub quantity: u32,
    /// Unit price captured at order time; later catalog edits never
    /// affect existing orders
    pub unit_price: f64,
}

/// One guest food order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Opaque unique id, assigned at creation
    pub order_id: String,
    /// Human-facing monotonically increasing number
    pub order_number: u64,
    pub guest_name: String,
    pub room_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    /// Mutated only by the fulfillment engine
    pub status: OrderStatus,
    /// Null until the guest chooses; immutable once set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_location: Option<DeliveryLocation>,
    pub items: Vec<OrderItem>,
    /// Computed once at creation from line items
    pub total_amount: f64,
    /// Instant each status was entered (sparse, append-only)
    #[serde(default)]
    pub status_timestamps: HashMap<OrderStatus, i64>,
    pub created_at: i64,
    /// Last mutation timestamp
    pub updated_at: i64,
}

impl Order {
    /// Whether the order still accepts transitions
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Record entry into a status; existing entries are never overwritten
    pub fn record_status(&mut self, status: OrderStatus, at: i64) {
        self.status_timestamps.entry(status).or_insert(at);
    }

    /// Instant the order entered the given status, if it has
    pub fn status_entered_at(&self, status: OrderStatus) -> Option<i64> {
        self.status_timestamps.get(&status).copied()
    }
}
