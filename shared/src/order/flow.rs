//! Static status flow table
//!
//! The single source of truth for how an order progresses. The kitchen
//! dashboard advances along it one step per command; the guest tracking
//! view renders its steps as the progress indicator. `Delivering` is
//! present only on the room-delivery path.

use super::model::{DeliveryLocation, OrderStatus};

/// Full path for room delivery
const ROOM_FLOW: &[OrderStatus] = &[
    OrderStatus::Pending,
    OrderStatus::Accepted,
    OrderStatus::Preparing,
    OrderStatus::Ready,
    OrderStatus::Delivering,
    OrderStatus::Delivered,
];

/// Restaurant pickup path - the guest collects in person, so the
/// `Delivering` stage is skipped entirely
const RESTAURANT_FLOW: &[OrderStatus] = &[
    OrderStatus::Pending,
    OrderStatus::Accepted,
    OrderStatus::Preparing,
    OrderStatus::Ready,
    OrderStatus::Delivered,
];

/// Progress steps for the given delivery choice
///
/// Until a choice is known the full room path is assumed; the tracking
/// view re-renders once the choice arrives.
pub fn progress_steps(location: Option<DeliveryLocation>) -> &'static [OrderStatus] {
    match location {
        Some(DeliveryLocation::Restaurant) => RESTAURANT_FLOW,
        _ => ROOM_FLOW,
    }
}

/// Next status in the flow, or `None` from the end of the path or from
/// any status not on it (`Cancelled`)
pub fn next_status(
    status: OrderStatus,
    location: Option<DeliveryLocation>,
) -> Option<OrderStatus> {
    let steps = progress_steps(location);
    steps
        .iter()
        .position(|s| *s == status)
        .and_then(|idx| steps.get(idx + 1))
        .copied()
}

/// Whether `to` is reachable from `from` in exactly one step: one
/// flow-table step, or a cancellation of a non-terminal order
pub fn is_one_step(
    from: OrderStatus,
    to: OrderStatus,
    location: Option<DeliveryLocation>,
) -> bool {
    if to == OrderStatus::Cancelled {
        return !from.is_terminal();
    }
    next_status(from, location) == Some(to)
}
