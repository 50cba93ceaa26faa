//! Server-sent event feed for order changes
//!
//! Push transport for remote sessions. Delivery is best-effort: a
//! consumer that falls behind loses the oldest events and the stream
//! continues; each session's reconciliation poller covers the gap.

use std::convert::Infallible;

use axum::{
    Router,
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::Stream;
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::core::ServerState;
use shared::order::Topic;

/// Event feed route
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/orders/events", get(subscribe))
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// "active" for the global feed, or an order id (default "active")
    pub topic: Option<String>,
}

/// GET /api/orders/events?topic=active|{order_id} - Subscribe to changes
pub async fn subscribe(
    State(state): State<ServerState>,
    Query(query): Query<EventsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let topic = Topic::parse(query.topic.as_deref().unwrap_or("active"));
    tracing::debug!(topic = %topic, "Event feed subscriber attached");

    let rx = state.broadcaster.subscribe(topic);

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let Ok(json) = serde_json::to_string(&event) else {
                        continue;
                    };
                    let sse_event = Event::default().event("order_changed").data(json);
                    return Some((Ok(sse_event), rx));
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Event feed subscriber lagged, events dropped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
