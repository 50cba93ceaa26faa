//! Client session state machines
//!
//! Sessions hold the locally rendered view and apply the read-repair
//! rule: local optimistic values are provisional and are overwritten
//! without conflict resolution by the next authoritative push or poll.

pub mod dashboard;
pub mod poller;
pub mod tracking;

#[cfg(test)]
pub(crate) mod mock;

pub use dashboard::{DashboardFilter, KitchenDashboardSession};
pub use poller::{Reconcile, ReconciliationPoller};
pub use tracking::{GuestTrackingSession, StepState};
