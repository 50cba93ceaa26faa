//! FulfillmentEngine - the only component that writes order state
//!
//! # Command Flow
//!
//! ```text
//! advance(order_id, expected_status)
//!     ├─ 1. Begin write transaction (serialized by redb)
//!     ├─ 2. Load the order row
//!     ├─ 3. Gate: unknown id? terminal? expected == persisted?
//!     ├─ 4. Apply one flow-table step + timestamp entry
//!     ├─ 5. Update the active index, allocate the event sequence
//!     ├─ 6. Commit
//!     ├─ 7. Publish OrderChanged (fire-and-forget)
//!     └─ 8. Dispatch collaborator notification on terminal states (spawned)
//! ```
//!
//! Gating every transition on the caller's expected status turns "advance
//! to the next stage" into a compare-and-swap: when two kitchen terminals
//! press advance on the same order within the same second, exactly one
//! wins and the other receives `StaleTransition`.

mod error;
pub use error::{EngineError, EngineResult};

use std::sync::Arc;

use shared::order::flow;
use shared::order::{
    CreateOrderInput, DeliveryLocation, Order, OrderChanged, OrderError, OrderItem, OrderStatus,
};
use shared::util::now_millis;
use validator::Validate;

use super::broadcast::ChangeBroadcaster;
use super::money;
use super::store::{OrderStore, StoreError};
use crate::services::{MenuCatalog, NotificationDispatch};

/// Command processor and query surface for orders
///
/// The `epoch` is a unique id generated on each startup; clients use it
/// to detect server restarts and force a full refetch.
#[derive(Clone)]
pub struct FulfillmentEngine {
    store: OrderStore,
    broadcaster: Arc<ChangeBroadcaster>,
    catalog: Arc<dyn MenuCatalog>,
    notifier: Arc<dyn NotificationDispatch>,
    epoch: String,
}

impl FulfillmentEngine {
    pub fn new(
        store: OrderStore,
        broadcaster: Arc<ChangeBroadcaster>,
        catalog: Arc<dyn MenuCatalog>,
        notifier: Arc<dyn NotificationDispatch>,
    ) -> Self {
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, "Fulfillment engine started with new epoch");
        Self {
            store,
            broadcaster,
            catalog,
            notifier,
            epoch,
        }
    }

    /// Server instance epoch (unique per process start)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// The broadcaster this engine publishes to
    pub fn broadcaster(&self) -> &Arc<ChangeBroadcaster> {
        &self.broadcaster
    }

    // ========== Commands ==========

    /// Create an order from the guest-facing ordering flow
    ///
    /// Captures catalog name and unit price into the line items and
    /// computes the total once; the order starts in `Pending`.
    pub fn create_order(&self, input: CreateOrderInput) -> EngineResult<Order> {
        input
            .validate()
            .map_err(|e| EngineError::InvalidInput(e.to_string()))?;

        let mut items = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let menu_item = self
                .catalog
                .get_menu_item(&line.menu_item_id)
                .ok_or_else(|| EngineError::UnknownMenuItem(line.menu_item_id.clone()))?;
            items.push(OrderItem {
                menu_item_id: menu_item.id,
                name: menu_item.name,
                quantity: line.quantity,
                unit_price: menu_item.unit_price,
            });
        }

        let now = now_millis();
        let order_number = self.store.next_order_number()?;
        let mut order = Order {
            order_id: uuid::Uuid::new_v4().to_string(),
            order_number,
            guest_name: input.guest_name,
            room_number: input.room_number,
            phone: input.phone,
            special_instructions: input.special_instructions,
            status: OrderStatus::Pending,
            delivery_location: None,
            total_amount: money::order_total(&items),
            items,
            status_timestamps: Default::default(),
            created_at: now,
            updated_at: now,
        };
        order.record_status(OrderStatus::Pending, now);

        let txn = self.store.begin_write()?;
        self.store.put_order_txn(&txn, &order)?;
        self.store.mark_order_active(&txn, &order.order_id)?;
        let sequence = self.store.next_sequence(&txn)?;
        txn.commit().map_err(StoreError::from)?;

        tracing::info!(
            order_id = %order.order_id,
            order_number,
            total = order.total_amount,
            "Order created"
        );
        self.publish(&order, sequence);
        Ok(order)
    }

    /// Advance an order one step along the status flow
    ///
    /// The caller states the status it believes the order is in; a
    /// mismatch fails with `StaleTransition` and mutates nothing. The
    /// `Delivering` stage is skipped when the guest chose restaurant
    /// pickup.
    pub fn advance(&self, order_id: &str, expected: OrderStatus) -> EngineResult<Order> {
        let txn = self.store.begin_write()?;
        let mut order = self
            .store
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::NotFound {
                order_id: order_id.to_string(),
            })?;

        if expected.is_terminal() || order.status.is_terminal() {
            return Err(OrderError::TerminalState {
                order_id: order_id.to_string(),
                status: order.status,
            }
            .into());
        }
        if order.status != expected {
            return Err(OrderError::StaleTransition {
                order_id: order_id.to_string(),
                expected,
                actual: order.status,
            }
            .into());
        }

        // Non-terminal statuses always have a successor; keep the gate
        // closed if the flow table ever says otherwise
        let next = flow::next_status(order.status, order.delivery_location).ok_or_else(|| {
            OrderError::TerminalState {
                order_id: order_id.to_string(),
                status: order.status,
            }
        })?;

        let now = self.next_timestamp(&order);
        order.status = next;
        order.record_status(next, now);
        order.updated_at = now;

        self.store.put_order_txn(&txn, &order)?;
        if next.is_terminal() {
            self.store.mark_order_inactive(&txn, order_id)?;
        }
        let sequence = self.store.next_sequence(&txn)?;
        txn.commit().map_err(StoreError::from)?;

        tracing::info!(order_id = %order.order_id, from = %expected, to = %next, "Order advanced");
        self.publish(&order, sequence);
        if next.is_terminal() {
            self.dispatch_terminal_notice(&order);
        }
        Ok(order)
    }

    /// Record the guest's delivery choice
    ///
    /// Valid only while the order is `Ready` and no choice exists yet.
    /// Does not change status; the following `advance` honors the skip
    /// rule.
    pub fn choose_delivery(
        &self,
        order_id: &str,
        location: DeliveryLocation,
    ) -> EngineResult<Order> {
        let txn = self.store.begin_write()?;
        let mut order = self
            .store
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::NotFound {
                order_id: order_id.to_string(),
            })?;

        if order.status != OrderStatus::Ready || order.delivery_location.is_some() {
            return Err(OrderError::InvalidChoice {
                order_id: order_id.to_string(),
                status: order.status,
                delivery_location: order.delivery_location,
            }
            .into());
        }

        order.delivery_location = Some(location);
        order.updated_at = now_millis();

        self.store.put_order_txn(&txn, &order)?;
        let sequence = self.store.next_sequence(&txn)?;
        txn.commit().map_err(StoreError::from)?;

        tracing::info!(order_id = %order.order_id, location = %location, "Delivery location chosen");
        self.publish(&order, sequence);
        Ok(order)
    }

    /// Cancel an order from any non-terminal status
    pub fn cancel(&self, order_id: &str) -> EngineResult<Order> {
        let txn = self.store.begin_write()?;
        let mut order = self
            .store
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| OrderError::NotFound {
                order_id: order_id.to_string(),
            })?;

        if order.status.is_terminal() {
            return Err(OrderError::TerminalState {
                order_id: order_id.to_string(),
                status: order.status,
            }
            .into());
        }

        let now = self.next_timestamp(&order);
        order.status = OrderStatus::Cancelled;
        order.record_status(OrderStatus::Cancelled, now);
        order.updated_at = now;

        self.store.put_order_txn(&txn, &order)?;
        self.store.mark_order_inactive(&txn, order_id)?;
        let sequence = self.store.next_sequence(&txn)?;
        txn.commit().map_err(StoreError::from)?;

        tracing::info!(order_id = %order.order_id, "Order cancelled");
        self.publish(&order, sequence);
        self.dispatch_terminal_notice(&order);
        Ok(order)
    }

    // ========== Queries ==========

    pub fn get_order(&self, order_id: &str) -> EngineResult<Order> {
        self.store
            .get_order(order_id)?
            .ok_or_else(|| {
                OrderError::NotFound {
                    order_id: order_id.to_string(),
                }
                .into()
            })
    }

    /// All orders in a non-terminal status
    pub fn list_active_orders(&self) -> EngineResult<Vec<Order>> {
        Ok(self.store.list_active()?)
    }

    /// Orders matching a guest contact (room number or phone)
    pub fn list_orders_by_guest_contact(&self, contact: &str) -> EngineResult<Vec<Order>> {
        Ok(self.store.list_by_guest_contact(contact)?)
    }

    // ========== Internals ==========

    /// Timestamp for the next status entry; strictly later than every
    /// entry already recorded, even within the same millisecond
    fn next_timestamp(&self, order: &Order) -> i64 {
        let last = order
            .status_timestamps
            .values()
            .copied()
            .max()
            .unwrap_or(0);
        now_millis().max(last + 1)
    }

    fn publish(&self, order: &Order, sequence: u64) {
        let event = OrderChanged::from_order(order, sequence);
        self.broadcaster.publish(&event);
    }

    /// Fire-and-forget collaborator notification; failures never roll
    /// back the committed transition
    fn dispatch_terminal_notice(&self, order: &Order) {
        let notifier = self.notifier.clone();
        let order = order.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_terminal(&order).await {
                tracing::warn!(
                    order_id = %order.order_id,
                    error = %e,
                    "Terminal notification dispatch failed"
                );
            }
        });
    }
}
