//! Change events pushed to subscribed sessions

use super::model::{DeliveryLocation, Order, OrderStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broadcast topic - one order id, or the global active-orders feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Changes for a single order (guest tracking)
    Order(String),
    /// Changes for every order (kitchen dashboard)
    Active,
}

impl Topic {
    /// Parse the wire form used by the event feed endpoint
    pub fn parse(s: &str) -> Self {
        match s {
            "active" => Topic::Active,
            other => Topic::Order(other.to_string()),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Order(id) => write!(f, "{id}"),
            Topic::Active => write!(f, "active"),
        }
    }
}

/// Order change event - pushed to subscribers of the order's own topic
/// and of the active feed after every committed transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderChanged {
    /// Event unique id
    pub event_id: String,
    /// Global sequence allocated inside the storage commit; per-order
    /// sequence order therefore equals commit order. Subscribers keep the
    /// highest sequence seen per order and discard anything older.
    pub sequence: u64,
    pub order_id: String,
    pub order_number: u64,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_location: Option<DeliveryLocation>,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
}

impl OrderChanged {
    /// Build the event for an order's freshly committed state
    pub fn from_order(order: &Order, sequence: u64) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            order_id: order.order_id.clone(),
            order_number: order.order_number,
            status: order.status,
            delivery_location: order.delivery_location,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Whether this event belongs on the given topic
    pub fn matches(&self, topic: &Topic) -> bool {
        match topic {
            Topic::Active => true,
            Topic::Order(id) => self.order_id == *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_parse() {
        assert_eq!(Topic::parse("active"), Topic::Active);
        assert_eq!(
            Topic::parse("order-7"),
            Topic::Order("order-7".to_string())
        );
    }

    #[test]
    fn test_event_topic_matching() {
        let event = OrderChanged {
            event_id: "e1".to_string(),
            sequence: 1,
            order_id: "order-7".to_string(),
            order_number: 7,
            status: OrderStatus::Accepted,
            delivery_location: None,
            timestamp: 0,
        };

        assert!(event.matches(&Topic::Active));
        assert!(event.matches(&Topic::Order("order-7".to_string())));
        assert!(!event.matches(&Topic::Order("order-8".to_string())));
    }
}
