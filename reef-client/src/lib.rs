//! Reef client sessions
//!
//! Session logic for the kitchen dashboard and the guest tracking page,
//! plus the channel abstraction they talk through:
//!
//! - **channel**: the `OrderChannel` trait with an in-process
//!   implementation (`LocalChannel`, tower oneshot against the server
//!   router) and a network implementation (`HttpChannel`, reqwest + SSE)
//! - **session**: `KitchenDashboardSession`, `GuestTrackingSession` and
//!   the `ReconciliationPoller` that bounds their staleness when push
//!   delivery drops events

pub mod channel;
pub mod error;
pub mod session;

// Re-export main types
pub use channel::{EventStream, HttpChannel, LocalChannel, OrderChannel};
pub use error::{ClientError, ClientResult};
pub use session::{
    DashboardFilter, GuestTrackingSession, KitchenDashboardSession, Reconcile,
    ReconciliationPoller, StepState,
};
