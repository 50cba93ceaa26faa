//! Guest-facing order creation inputs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Menu catalog entry as seen by the fulfillment engine
///
/// Looked up at order-creation time only; name and price are captured
/// into the order's line items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub unit_price: f64,
}

/// One requested line item
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemInput {
    #[validate(length(min = 1))]
    pub menu_item_id: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

/// Order creation request from the guest-facing ordering flow
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrderInput {
    #[validate(length(min = 1, max = 120))]
    pub guest_name: String,
    #[validate(length(min = 1, max = 16))]
    pub room_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub special_instructions: Option<String>,
    #[validate(length(min = 1), nested)]
    pub items: Vec<OrderItemInput>,
}
