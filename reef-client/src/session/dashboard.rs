//! Kitchen dashboard session
//!
//! One connected staff terminal: the active order set, one advance
//! command per click, push updates applied over local optimistic state.
//!
//! The optimistic rule: an advance click renders the next stage
//! immediately for perceived responsiveness, but the value is
//! provisional. Server-confirmed state - a command response, a pushed
//! event or a reconciliation fetch - always overwrites it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;

use crate::channel::{EventStream, OrderChannel};
use crate::error::{ClientError, ClientResult};
use crate::session::poller::Reconcile;
use shared::order::flow;
use shared::order::{Order, OrderChanged, OrderError, OrderStatus, Topic};

/// Dashboard list filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardFilter {
    /// Everything still in the pipeline (excludes delivered and cancelled)
    #[default]
    Active,
    /// Delivered orders only
    Completed,
    /// Everything the session has seen
    All,
}

/// One order as the dashboard tracks it
#[derive(Debug, Clone)]
struct TrackedOrder {
    order: Order,
    /// Highest event sequence applied to this order
    last_sequence: u64,
    /// Optimistically rendered next status while an advance is in flight
    pending: Option<OrderStatus>,
}

impl TrackedOrder {
    fn new(order: Order) -> Self {
        Self {
            order,
            last_sequence: 0,
            pending: None,
        }
    }
}

/// Staff-facing dashboard view over the active order set
pub struct KitchenDashboardSession<C: OrderChannel> {
    channel: Arc<C>,
    orders: HashMap<String, TrackedOrder>,
    filter: DashboardFilter,
}

impl<C: OrderChannel> KitchenDashboardSession<C> {
    /// Open the session: one authoritative fetch of the active set, then
    /// a subscription to the global feed
    pub async fn open(channel: Arc<C>) -> ClientResult<(Self, EventStream)> {
        let active = channel.list_active().await?;
        let events = channel.subscribe(Topic::Active).await?;

        let orders = active
            .into_iter()
            .map(|order| (order.order_id.clone(), TrackedOrder::new(order)))
            .collect();

        Ok((
            Self {
                channel,
                orders,
                filter: DashboardFilter::default(),
            },
            events,
        ))
    }

    /// Apply a pushed change event
    ///
    /// Server-confirmed state wins over any optimistic value. Events at
    /// or below the sequence already applied are discarded; an event for
    /// an order the dashboard has not seen hydrates the full record.
    pub async fn apply_event(&mut self, event: &OrderChanged) -> ClientResult<()> {
        if let Some(tracked) = self.orders.get_mut(&event.order_id) {
            if event.sequence <= tracked.last_sequence {
                return Ok(());
            }
            tracked.order.status = event.status;
            tracked.order.delivery_location = event.delivery_location;
            tracked.order.record_status(event.status, event.timestamp);
            tracked.order.updated_at = event.timestamp;
            tracked.last_sequence = event.sequence;
            tracked.pending = None;
            return Ok(());
        }

        let order = self.channel.get_order(&event.order_id).await?;
        let mut tracked = TrackedOrder::new(order);
        tracked.last_sequence = event.sequence;
        self.orders.insert(event.order_id.clone(), tracked);
        Ok(())
    }

    /// One advance click from the operator
    ///
    /// Renders the next stage immediately and issues the gated command
    /// with the locally known status. `StaleTransition` means another
    /// terminal already moved the order: the optimistic value is
    /// discarded and the view re-rendered from an authoritative fetch,
    /// never retried blindly.
    pub async fn advance(&mut self, order_id: &str) -> ClientResult<()> {
        let expected = {
            let tracked = self.orders.get_mut(order_id).ok_or_else(|| {
                ClientError::NotFound(format!("Order {order_id} is not on this dashboard"))
            })?;

            // One command in flight per order per terminal
            if tracked.pending.is_some() {
                return Ok(());
            }
            let expected = tracked.order.status;
            let Some(next) = flow::next_status(expected, tracked.order.delivery_location) else {
                return Ok(());
            };
            tracked.pending = Some(next);
            expected
        };

        let result = {
            let channel = self.channel.clone();
            channel.advance(order_id, expected).await
        };

        match result {
            Ok(order) => {
                self.accept(order);
                Ok(())
            }
            Err(ClientError::Order(
                OrderError::StaleTransition { .. } | OrderError::TerminalState { .. },
            )) => {
                if let Some(tracked) = self.orders.get_mut(order_id) {
                    tracked.pending = None;
                }
                let fresh = self.channel.get_order(order_id).await?;
                self.accept(fresh);
                Ok(())
            }
            Err(e) => {
                if let Some(tracked) = self.orders.get_mut(order_id) {
                    tracked.pending = None;
                }
                Err(e)
            }
        }
    }

    /// Status the operator currently sees for an order (the optimistic
    /// value while an advance is in flight)
    pub fn rendered_status(&self, order_id: &str) -> Option<OrderStatus> {
        self.orders
            .get(order_id)
            .map(|tracked| tracked.pending.unwrap_or(tracked.order.status))
    }

    /// Authoritative order record, if displayed
    pub fn order(&self, order_id: &str) -> Option<&Order> {
        self.orders.get(order_id).map(|tracked| &tracked.order)
    }

    pub fn set_filter(&mut self, filter: DashboardFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> DashboardFilter {
        self.filter
    }

    /// Orders visible under the current filter, by order number
    pub fn visible_orders(&self) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self
            .orders
            .values()
            .filter(|tracked| match self.filter {
                DashboardFilter::Active => !tracked.order.status.is_terminal(),
                DashboardFilter::Completed => tracked.order.status == OrderStatus::Delivered,
                DashboardFilter::All => true,
            })
            .map(|tracked| &tracked.order)
            .collect();
        orders.sort_by_key(|order| order.order_number);
        orders
    }

    /// Replace a tracked order with server-confirmed state
    fn accept(&mut self, order: Order) {
        match self.orders.get_mut(&order.order_id) {
            Some(tracked) => {
                tracked.order = order;
                tracked.pending = None;
            }
            None => {
                self.orders
                    .insert(order.order_id.clone(), TrackedOrder::new(order));
            }
        }
    }
}

#[async_trait]
impl<C: OrderChannel + 'static> Reconcile for KitchenDashboardSession<C> {
    /// Re-fetch authoritative state for everything displayed
    ///
    /// The fetched value wins unconditionally. Orders that left the
    /// active set reached a terminal status; they are fetched
    /// individually to learn which.
    async fn reconcile(&mut self) -> ClientResult<()> {
        let active = self.channel.list_active().await?;

        let mut seen: HashSet<String> = HashSet::with_capacity(active.len());
        for order in active {
            seen.insert(order.order_id.clone());
            self.accept(order);
        }

        let departed: Vec<String> = self
            .orders
            .iter()
            .filter(|(id, tracked)| {
                !seen.contains(id.as_str()) && !tracked.order.status.is_terminal()
            })
            .map(|(id, _)| id.clone())
            .collect();

        for order_id in departed {
            let fresh = self.channel.get_order(&order_id).await?;
            self.accept(fresh);
        }

        Ok(())
    }
}
