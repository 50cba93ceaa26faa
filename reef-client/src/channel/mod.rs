//! Channel abstraction between sessions and the fulfillment server
//!
//! Sessions are written against [`OrderChannel`]; the two implementations
//! are [`LocalChannel`] (in-process, tower oneshot against the server
//! router) and [`HttpChannel`] (reqwest against a remote server).

mod http;
mod local;

pub use http::HttpChannel;
pub use local::{LocalChannel, LocalChannelBuilder};

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::{ClientError, ClientResult};
use shared::order::{
    CreateOrderInput, DeliveryLocation, Order, OrderChanged, OrderError, OrderStatus, Topic,
};

/// Stream of pushed change events for one subscription
pub type EventStream = Pin<Box<dyn Stream<Item = OrderChanged> + Send>>;

/// Commands, queries and subscriptions against the fulfillment server
#[async_trait]
pub trait OrderChannel: Send + Sync {
    async fn create_order(&self, input: CreateOrderInput) -> ClientResult<Order>;
    async fn get_order(&self, order_id: &str) -> ClientResult<Order>;
    async fn list_active(&self) -> ClientResult<Vec<Order>>;
    async fn list_by_guest_contact(&self, contact: &str) -> ClientResult<Vec<Order>>;
    async fn advance(&self, order_id: &str, expected: OrderStatus) -> ClientResult<Order>;
    async fn choose_delivery(
        &self,
        order_id: &str,
        location: DeliveryLocation,
    ) -> ClientResult<Order>;
    async fn cancel(&self, order_id: &str) -> ClientResult<Order>;

    /// Subscribe to pushed change events for a topic
    ///
    /// Delivery is best-effort; the reconciliation poller covers gaps.
    async fn subscribe(&self, topic: Topic) -> ClientResult<EventStream>;
}

// ========== Wire types shared by both implementations ==========

#[derive(Debug, Serialize)]
pub(crate) struct AdvanceBody {
    pub expected_status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeliveryChoiceBody {
    pub location: DeliveryLocation,
}

/// Error envelope returned by the server for rejected requests
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub error: Option<OrderError>,
}

/// Map a non-success response to a client error
///
/// Engine rejections round-trip as typed [`OrderError`] values; anything
/// else degrades to a status-based mapping.
pub(crate) fn error_from_response(status: ::http::StatusCode, body: &[u8]) -> ClientError {
    if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body) {
        if let Some(order_error) = envelope.error {
            return ClientError::Order(order_error);
        }
        return match status {
            ::http::StatusCode::NOT_FOUND => ClientError::NotFound(envelope.message),
            ::http::StatusCode::BAD_REQUEST => ClientError::Validation(envelope.message),
            _ => ClientError::Internal(format!("{}: {}", envelope.code, envelope.message)),
        };
    }

    let text = String::from_utf8_lossy(body).to_string();
    match status {
        ::http::StatusCode::NOT_FOUND => ClientError::NotFound(text),
        ::http::StatusCode::BAD_REQUEST => ClientError::Validation(text),
        _ => ClientError::Internal(text),
    }
}

/// Convert a broadcast receiver into an event stream
///
/// Lag gaps are logged and skipped; the poller repairs whatever was
/// missed.
pub(crate) fn receiver_into_stream(rx: broadcast::Receiver<OrderChanged>) -> EventStream {
    Box::pin(futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => return Some((event, rx)),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Subscription lagged, events dropped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }))
}

/// Percent-encode a query value (RFC 3986 unreserved bytes pass through)
pub(crate) fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}
