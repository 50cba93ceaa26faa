//! Guest tracking session
//!
//! One guest, bound to one order id: the live progress indicator plus
//! the delivery-location choice collected while the order is `Ready`.
//!
//! The guest cannot change the cooking stage, so status is never
//! optimistic here - only the server is authoritative. The one piece of
//! local optimism is the UI lock placed on the choice buttons the moment
//! a choice is submitted, so a double tap cannot send two commands.

use std::sync::Arc;

use async_trait::async_trait;

use crate::channel::{EventStream, OrderChannel};
use crate::error::{ClientError, ClientResult};
use crate::session::poller::Reconcile;
use shared::order::flow;
use shared::order::{DeliveryLocation, Order, OrderChanged, OrderError, OrderStatus, Topic};

/// Render state of one step of the vertical progress indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Completed,
    Current,
    Upcoming,
}

/// Guest-facing live view of a single order
pub struct GuestTrackingSession<C: OrderChannel> {
    channel: Arc<C>,
    order_id: String,
    order: Order,
    /// Highest event sequence applied
    last_sequence: u64,
    /// Choice UI locked after submission, before the push confirmation
    choice_locked: bool,
}

impl<C: OrderChannel> GuestTrackingSession<C> {
    /// Open the session: fetch the order, then subscribe to its topic
    pub async fn open(channel: Arc<C>, order_id: &str) -> ClientResult<(Self, EventStream)> {
        let order = channel.get_order(order_id).await?;
        let events = channel.subscribe(Topic::Order(order_id.to_string())).await?;

        let choice_locked = order.delivery_location.is_some();
        Ok((
            Self {
                channel,
                order_id: order_id.to_string(),
                order,
                last_sequence: 0,
                choice_locked,
            },
            events,
        ))
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn status(&self) -> OrderStatus {
        self.order.status
    }

    pub fn is_cancelled(&self) -> bool {
        self.order.status == OrderStatus::Cancelled
    }

    /// Steps of the vertical progress indicator
    ///
    /// Computed from the flow table; the delivering step disappears
    /// entirely once restaurant pickup is known.
    pub fn progress(&self) -> Vec<(OrderStatus, StepState)> {
        flow::progress_steps(self.order.delivery_location)
            .iter()
            .map(|step| {
                let state = if *step == self.order.status {
                    StepState::Current
                } else if self.order.status_entered_at(*step).is_some() {
                    StepState::Completed
                } else {
                    StepState::Upcoming
                };
                (*step, state)
            })
            .collect()
    }

    /// Whether the two delivery choice actions should be shown
    pub fn delivery_choice_open(&self) -> bool {
        self.order.status == OrderStatus::Ready
            && self.order.delivery_location.is_none()
            && !self.choice_locked
    }

    /// Submit the delivery choice
    ///
    /// The choice UI locks immediately against double submission. A
    /// rejection for a choice that is already recorded with the same
    /// value is a no-op; any other failure re-enables the UI.
    pub async fn choose_delivery(&mut self, location: DeliveryLocation) -> ClientResult<()> {
        if self.choice_locked || self.order.delivery_location.is_some() {
            return Ok(());
        }
        self.choice_locked = true;

        let result = {
            let channel = self.channel.clone();
            channel.choose_delivery(&self.order_id, location).await
        };

        match result {
            Ok(order) => {
                self.accept(order);
                Ok(())
            }
            Err(ClientError::Order(OrderError::InvalidChoice {
                delivery_location: Some(existing),
                ..
            })) if existing == location => {
                // Duplicate submission - the choice already took effect
                self.order.delivery_location = Some(existing);
                Ok(())
            }
            Err(e) => {
                self.choice_locked = false;
                Err(e)
            }
        }
    }

    /// Apply a pushed change event
    ///
    /// Events for other orders and events at or below the applied
    /// sequence are discarded.
    pub fn apply_event(&mut self, event: &OrderChanged) {
        if event.order_id != self.order_id || event.sequence <= self.last_sequence {
            return;
        }
        self.order.status = event.status;
        self.order.delivery_location = event.delivery_location;
        self.order.record_status(event.status, event.timestamp);
        self.order.updated_at = event.timestamp;
        self.last_sequence = event.sequence;
        if self.order.delivery_location.is_some() {
            self.choice_locked = true;
        }
    }

    /// Replace local state with server-confirmed state
    fn accept(&mut self, order: Order) {
        self.order = order;
        if self.order.delivery_location.is_some() {
            self.choice_locked = true;
        }
    }
}

#[async_trait]
impl<C: OrderChannel + 'static> Reconcile for GuestTrackingSession<C> {
    /// Re-fetch the order; the fetched state wins unconditionally
    async fn reconcile(&mut self) -> ClientResult<()> {
        let fresh = self.channel.get_order(&self.order_id).await?;
        self.accept(fresh);
        Ok(())
    }
}
