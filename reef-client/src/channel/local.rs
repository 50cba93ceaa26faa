//! In-process channel implementation
//!
//! Uses Tower oneshot for HTTP calls against the server's router and a
//! direct hook into the server's change broadcaster for subscriptions.
//! Zero network overhead - all communication happens in-process.

use axum::Router;
use axum::body::Body;
use http::Request;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tower::ServiceExt;

use super::{
    AdvanceBody, DeliveryChoiceBody, EventStream, OrderChannel, encode_query_value,
    error_from_response, receiver_into_stream,
};
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use shared::order::{CreateOrderInput, DeliveryLocation, Order, OrderChanged, OrderStatus, Topic};

/// Hook handing out topic subscriptions from the server's broadcaster
pub type EventSource =
    Box<dyn Fn(&Topic) -> broadcast::Receiver<OrderChanged> + Send + Sync>;

/// In-process channel (oneshot HTTP + broadcaster hook)
///
/// # Example
///
/// ```ignore
/// let router = reef_server::api::router(state.clone());
/// let broadcaster = state.broadcaster.clone();
/// let channel = LocalChannel::builder()
///     .with_router(router)
///     .with_event_source(move |topic| broadcaster.subscribe(topic.clone()))
///     .build()?;
/// ```
pub struct LocalChannel {
    router: Router,
    event_source: EventSource,
}

impl LocalChannel {
    pub fn builder() -> LocalChannelBuilder {
        LocalChannelBuilder::default()
    }

    fn get_request(&self, path: &str) -> Request<Body> {
        Request::builder()
            .method(http::Method::GET)
            .uri(path)
            .body(Body::empty())
            .expect("request construction cannot fail for a valid path")
    }

    fn post_request<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<Request<Body>> {
        let bytes = serde_json::to_vec(body)?;
        Ok(Request::builder()
            .method(http::Method::POST)
            .uri(path)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("request construction cannot fail for a valid path"))
    }

    fn post_empty_request(&self, path: &str) -> Request<Body> {
        Request::builder()
            .method(http::Method::POST)
            .uri(path)
            .body(Body::empty())
            .expect("request construction cannot fail for a valid path")
    }

    /// Drive the request through the router and decode the response
    async fn execute<T: DeserializeOwned>(&self, request: Request<Body>) -> ClientResult<T> {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| ClientError::Internal(format!("Oneshot call failed: {e}")))?;

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| ClientError::Internal(format!("Failed to read body: {e}")))?;

        if !status.is_success() {
            return Err(error_from_response(status, &body));
        }

        serde_json::from_slice(&body)
            .map_err(|e| ClientError::InvalidResponse(format!("JSON parse error: {e}")))
    }
}

#[async_trait]
impl OrderChannel for LocalChannel {
    async fn create_order(&self, input: CreateOrderInput) -> ClientResult<Order> {
        self.execute(self.post_request("/api/orders", &input)?).await
    }

    async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        self.execute(self.get_request(&format!("/api/orders/{order_id}")))
            .await
    }

    async fn list_active(&self) -> ClientResult<Vec<Order>> {
        self.execute(self.get_request("/api/orders")).await
    }

    async fn list_by_guest_contact(&self, contact: &str) -> ClientResult<Vec<Order>> {
        let path = format!("/api/orders?contact={}", encode_query_value(contact));
        self.execute(self.get_request(&path)).await
    }

    async fn advance(&self, order_id: &str, expected: OrderStatus) -> ClientResult<Order> {
        let body = AdvanceBody {
            expected_status: expected,
        };
        self.execute(self.post_request(&format!("/api/orders/{order_id}/advance"), &body)?)
            .await
    }

    async fn choose_delivery(
        &self,
        order_id: &str,
        location: DeliveryLocation,
    ) -> ClientResult<Order> {
        let body = DeliveryChoiceBody { location };
        self.execute(self.post_request(&format!("/api/orders/{order_id}/delivery"), &body)?)
            .await
    }

    async fn cancel(&self, order_id: &str) -> ClientResult<Order> {
        self.execute(self.post_empty_request(&format!("/api/orders/{order_id}/cancel")))
            .await
    }

    async fn subscribe(&self, topic: Topic) -> ClientResult<EventStream> {
        Ok(receiver_into_stream((self.event_source)(&topic)))
    }
}

/// Builder for [`LocalChannel`]
#[derive(Default)]
pub struct LocalChannelBuilder {
    router: Option<Router>,
    event_source: Option<EventSource>,
}

impl LocalChannelBuilder {
    /// Fully configured application router (state already applied)
    pub fn with_router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Subscription hook, usually `broadcaster.subscribe`
    pub fn with_event_source<F>(mut self, source: F) -> Self
    where
        F: Fn(&Topic) -> broadcast::Receiver<OrderChanged> + Send + Sync + 'static,
    {
        self.event_source = Some(Box::new(source));
        self
    }

    pub fn build(self) -> ClientResult<LocalChannel> {
        let router = self
            .router
            .ok_or_else(|| ClientError::Config("Router not configured".into()))?;
        let event_source = self
            .event_source
            .ok_or_else(|| ClientError::Config("Event source not configured".into()))?;
        Ok(LocalChannel {
            router,
            event_source,
        })
    }
}
