//! Order error taxonomy shared by the engine and its clients
//!
//! The engine returns these verbatim; sessions decide the recovery:
//! `StaleTransition` means refetch and re-render, never blind retry.
//! Serialized into API error envelopes so clients can recover without
//! string matching.

use super::model::{DeliveryLocation, OrderStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by the fulfillment engine
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderError {
    /// Unknown order id - surfaced to the caller, never retried
    #[error("order {order_id} not found")]
    NotFound { order_id: String },

    /// The caller's view of the order is out of date - it must refetch
    /// current state before deciding whether to re-issue the command
    #[error("stale transition on order {order_id}: expected {expected}, found {actual}")]
    StaleTransition {
        order_id: String,
        expected: OrderStatus,
        actual: OrderStatus,
    },

    /// The order already reached `Delivered` or `Cancelled`
    #[error("order {order_id} is in terminal status {status}")]
    TerminalState {
        order_id: String,
        status: OrderStatus,
    },

    /// Delivery choice attempted outside the valid window (`Ready` with
    /// no prior choice). Carries persisted state so a duplicate
    /// same-value submission can be treated as a no-op by the client.
    #[error("delivery choice rejected for order {order_id} in status {status}")]
    InvalidChoice {
        order_id: String,
        status: OrderStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        delivery_location: Option<DeliveryLocation>,
    },
}

impl OrderError {
    /// Machine-readable code used in API envelopes and logs
    pub fn code(&self) -> &'static str {
        match self {
            OrderError::NotFound { .. } => "ORDER_NOT_FOUND",
            OrderError::StaleTransition { .. } => "STALE_TRANSITION",
            OrderError::TerminalState { .. } => "TERMINAL_STATE",
            OrderError::InvalidChoice { .. } => "INVALID_CHOICE",
        }
    }

    /// The order id the error refers to
    pub fn order_id(&self) -> &str {
        match self {
            OrderError::NotFound { order_id }
            | OrderError::StaleTransition { order_id, .. }
            | OrderError::TerminalState { order_id, .. }
            | OrderError::InvalidChoice { order_id, .. } => order_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_round_trip() {
        let err = OrderError::StaleTransition {
            order_id: "order-1".to_string(),
            expected: OrderStatus::Pending,
            actual: OrderStatus::Accepted,
        };

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"STALE_TRANSITION\""));

        let back: OrderError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn test_invalid_choice_carries_persisted_state() {
        let err = OrderError::InvalidChoice {
            order_id: "order-1".to_string(),
            status: OrderStatus::Ready,
            delivery_location: Some(DeliveryLocation::Restaurant),
        };

        let json = serde_json::to_string(&err).unwrap();
        let back: OrderError = serde_json::from_str(&json).unwrap();
        match back {
            OrderError::InvalidChoice {
                delivery_location, ..
            } => assert_eq!(delivery_location, Some(DeliveryLocation::Restaurant)),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
