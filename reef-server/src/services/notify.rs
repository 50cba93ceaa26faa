//! Guest notification dispatch on terminal order states
//!
//! Email/SMS delivery is an external collaborator. The engine dispatches
//! fire-and-forget: a transition is never rolled back or delayed because
//! a notification failed.

use async_trait::async_trait;
use shared::order::{Order, OrderStatus};
use thiserror::Error;

/// Notification dispatch failure
#[derive(Debug, Error)]
#[error("notification dispatch failed: {0}")]
pub struct NotifyError(pub String);

/// Outbound guest notification channel
#[async_trait]
pub trait NotificationDispatch: Send + Sync {
    /// Dispatch a guest notification for an order that reached a terminal
    /// status. The caller logs failures and never awaits this in the
    /// command path.
    async fn notify_terminal(&self, order: &Order) -> Result<(), NotifyError>;
}

/// Default dispatcher that records the notification in the log
///
/// Used until the resort's messaging gateway is wired in.
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationDispatch for TracingNotifier {
    async fn notify_terminal(&self, order: &Order) -> Result<(), NotifyError> {
        match order.status {
            OrderStatus::Delivered => tracing::info!(
                order_id = %order.order_id,
                order_number = order.order_number,
                room = %order.room_number,
                "Guest notified: order delivered"
            ),
            OrderStatus::Cancelled => tracing::info!(
                order_id = %order.order_id,
                order_number = order.order_number,
                room = %order.room_number,
                "Guest notified: order cancelled"
            ),
            other => tracing::debug!(
                order_id = %order.order_id,
                status = %other,
                "No notification for non-terminal status"
            ),
        }
        Ok(())
    }
}
