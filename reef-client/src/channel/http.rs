//! Network channel implementation
//!
//! Plain JSON over HTTP for commands and queries; the server's SSE feed
//! for push subscriptions. A dropped or lagging feed is not an error -
//! the reconciliation poller re-fetches whatever was missed.

use std::collections::VecDeque;
use std::time::Duration;

use futures::StreamExt;
use serde::de::DeserializeOwned;

use super::{AdvanceBody, DeliveryChoiceBody, EventStream, OrderChannel, error_from_response};
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use shared::order::{CreateOrderInput, DeliveryLocation, Order, OrderChanged, OrderStatus, Topic};

/// Default request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Network channel against a remote fulfillment server
pub struct HttpChannel {
    base_url: String,
    http: reqwest::Client,
}

impl HttpChannel {
    /// Create a channel for the given server base URL
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn parse<T: DeserializeOwned>(&self, response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(error_from_response(status, &body));
        }

        serde_json::from_slice(&body)
            .map_err(|e| ClientError::InvalidResponse(format!("JSON parse error: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.http.get(self.url(path)).send().await?;
        self.parse(response).await
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        self.parse(response).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.http.post(self.url(path)).send().await?;
        self.parse(response).await
    }
}

#[async_trait]
impl OrderChannel for HttpChannel {
    async fn create_order(&self, input: CreateOrderInput) -> ClientResult<Order> {
        self.post_json("/api/orders", &input).await
    }

    async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        self.get_json(&format!("/api/orders/{order_id}")).await
    }

    async fn list_active(&self) -> ClientResult<Vec<Order>> {
        self.get_json("/api/orders").await
    }

    async fn list_by_guest_contact(&self, contact: &str) -> ClientResult<Vec<Order>> {
        let response = self
            .http
            .get(self.url("/api/orders"))
            .query(&[("contact", contact)])
            .send()
            .await?;
        self.parse(response).await
    }

    async fn advance(&self, order_id: &str, expected: OrderStatus) -> ClientResult<Order> {
        let body = AdvanceBody {
            expected_status: expected,
        };
        self.post_json(&format!("/api/orders/{order_id}/advance"), &body)
            .await
    }

    async fn choose_delivery(
        &self,
        order_id: &str,
        location: DeliveryLocation,
    ) -> ClientResult<Order> {
        let body = DeliveryChoiceBody { location };
        self.post_json(&format!("/api/orders/{order_id}/delivery"), &body)
            .await
    }

    async fn cancel(&self, order_id: &str) -> ClientResult<Order> {
        self.post_empty(&format!("/api/orders/{order_id}/cancel"))
            .await
    }

    async fn subscribe(&self, topic: Topic) -> ClientResult<EventStream> {
        let response = self
            .http
            .get(self.url("/api/orders/events"))
            .query(&[("topic", topic.to_string())])
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Internal(format!(
                "Event feed returned {status}"
            )));
        }

        let bytes = response.bytes_stream();
        let stream = futures::stream::unfold(
            (bytes, SseParser::new()),
            |(mut bytes, mut parser)| async move {
                loop {
                    if let Some(data) = parser.next_event() {
                        match serde_json::from_str::<OrderChanged>(&data) {
                            Ok(event) => return Some((event, (bytes, parser))),
                            Err(e) => {
                                tracing::warn!(error = %e, "Malformed event payload, skipping");
                                continue;
                            }
                        }
                    }
                    match bytes.next().await {
                        Some(Ok(chunk)) => parser.feed(&chunk),
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Event stream transport error");
                            return None;
                        }
                        None => return None,
                    }
                }
            },
        );

        Ok(Box::pin(stream))
    }
}

/// Minimal SSE parser
///
/// Accumulates raw bytes and yields the data payload of each complete
/// event (events are separated by a blank line). Comment and event-name
/// lines are ignored; multi-line data payloads are joined with newlines.
struct SseParser {
    buffer: String,
    ready: VecDeque<String>,
}

impl SseParser {
    fn new() -> Self {
        Self {
            buffer: String::new(),
            ready: VecDeque::new(),
        }
    }

    fn feed(&mut self, chunk: &[u8]) {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        while let Some(pos) = self.buffer.find("\n\n") {
            let raw: String = self.buffer.drain(..pos + 2).collect();
            let data: Vec<&str> = raw
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(|d| d.strip_prefix(' ').unwrap_or(d))
                .collect();
            if !data.is_empty() {
                self.ready.push_back(data.join("\n"));
            }
        }
    }

    fn next_event(&mut self) -> Option<String> {
        self.ready.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sse_parser_single_event() {
        let mut parser = SseParser::new();
        parser.feed(b"event: order_changed\ndata: {\"x\":1}\n\n");
        assert_eq!(parser.next_event().unwrap(), "{\"x\":1}");
        assert!(parser.next_event().is_none());
    }

    #[test]
    fn test_sse_parser_event_split_across_chunks() {
        let mut parser = SseParser::new();
        parser.feed(b"data: {\"sta");
        assert!(parser.next_event().is_none());
        parser.feed(b"tus\":\"READY\"}\n\ndata: second\n\n");
        assert_eq!(parser.next_event().unwrap(), "{\"status\":\"READY\"}");
        assert_eq!(parser.next_event().unwrap(), "second");
    }

    #[test]
    fn test_sse_parser_ignores_keepalive_comments() {
        let mut parser = SseParser::new();
        parser.feed(b": keep-alive\n\ndata: payload\n\n");
        assert_eq!(parser.next_event().unwrap(), "payload");
        assert!(parser.next_event().is_none());
    }
}
