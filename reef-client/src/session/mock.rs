//! Scripted channel for session tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::channel::{EventStream, OrderChannel, receiver_into_stream};
use crate::error::{ClientError, ClientResult};
use shared::order::{
    CreateOrderInput, DeliveryLocation, Order, OrderChanged, OrderError, OrderStatus, Topic,
};

/// Fully scripted in-memory channel
///
/// Queries serve from the internal order map; `advance` and
/// `choose_delivery` pop pre-scripted results. Every call is recorded so
/// tests can assert how often a command was issued.
pub(crate) struct MockChannel {
    orders: Mutex<HashMap<String, Order>>,
    advance_results: Mutex<VecDeque<ClientResult<Order>>>,
    choose_results: Mutex<VecDeque<ClientResult<Order>>>,
    advance_calls: Mutex<Vec<OrderStatus>>,
    events_tx: broadcast::Sender<OrderChanged>,
}

impl MockChannel {
    pub fn with_orders(orders: Vec<Order>) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        Self {
            orders: Mutex::new(
                orders
                    .into_iter()
                    .map(|o| (o.order_id.clone(), o))
                    .collect(),
            ),
            advance_results: Mutex::new(VecDeque::new()),
            choose_results: Mutex::new(VecDeque::new()),
            advance_calls: Mutex::new(Vec::new()),
            events_tx,
        }
    }

    /// Insert or replace the authoritative record served by queries
    pub fn set_order(&self, order: Order) {
        self.orders
            .lock()
            .unwrap()
            .insert(order.order_id.clone(), order);
    }

    /// Queue the result of the next `advance` call
    pub fn script_advance(&self, result: ClientResult<Order>) {
        self.advance_results.lock().unwrap().push_back(result);
    }

    /// Queue the result of the next `choose_delivery` call
    pub fn script_choose(&self, result: ClientResult<Order>) {
        self.choose_results.lock().unwrap().push_back(result);
    }

    /// Expected statuses passed to `advance`, in call order
    pub fn advance_calls(&self) -> Vec<OrderStatus> {
        self.advance_calls.lock().unwrap().clone()
    }

    /// Push an event to every subscription
    pub fn publish(&self, event: OrderChanged) {
        let _ = self.events_tx.send(event);
    }
}

#[async_trait]
impl OrderChannel for MockChannel {
    async fn create_order(&self, _input: CreateOrderInput) -> ClientResult<Order> {
        Err(ClientError::Internal(
            "create_order is not scripted".to_string(),
        ))
    }

    async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        self.orders
            .lock()
            .unwrap()
            .get(order_id)
            .cloned()
            .ok_or_else(|| {
                ClientError::Order(OrderError::NotFound {
                    order_id: order_id.to_string(),
                })
            })
    }

    async fn list_active(&self) -> ClientResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| !o.status.is_terminal())
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.order_number);
        Ok(orders)
    }

    async fn list_by_guest_contact(&self, contact: &str) -> ClientResult<Vec<Order>> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.room_number == contact || o.phone.as_deref() == Some(contact))
            .cloned()
            .collect())
    }

    async fn advance(&self, order_id: &str, expected: OrderStatus) -> ClientResult<Order> {
        self.advance_calls.lock().unwrap().push(expected);
        self.advance_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ClientError::Internal(format!(
                    "advance({order_id}) is not scripted"
                )))
            })
    }

    async fn choose_delivery(
        &self,
        order_id: &str,
        _location: DeliveryLocation,
    ) -> ClientResult<Order> {
        self.choose_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ClientError::Internal(format!(
                    "choose_delivery({order_id}) is not scripted"
                )))
            })
    }

    async fn cancel(&self, order_id: &str) -> ClientResult<Order> {
        Err(ClientError::Internal(format!(
            "cancel({order_id}) is not scripted"
        )))
    }

    async fn subscribe(&self, _topic: Topic) -> ClientResult<EventStream> {
        Ok(receiver_into_stream(self.events_tx.subscribe()))
    }
}

/// Minimal order record for session tests
pub(crate) fn order_fixture(order_id: &str, order_number: u64, status: OrderStatus) -> Order {
    let mut order = Order {
        order_id: order_id.to_string(),
        order_number,
        guest_name: "Ada Lovelace".to_string(),
        room_number: "101".to_string(),
        phone: None,
        special_instructions: None,
        status,
        delivery_location: None,
        items: vec![],
        total_amount: 24.0,
        status_timestamps: HashMap::new(),
        created_at: 0,
        updated_at: 0,
    };
    // Backfill entry timestamps for every stage up to the current one
    let steps = shared::order::flow::progress_steps(None);
    let reached = steps.iter().position(|s| *s == status);
    for (idx, step) in steps.iter().enumerate() {
        if reached.is_some_and(|r| idx <= r) {
            order.record_status(*step, (idx as i64 + 1) * 100);
        }
    }
    if status == OrderStatus::Cancelled {
        order.record_status(OrderStatus::Cancelled, 100);
    }
    order
}
