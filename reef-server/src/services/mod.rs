//! External collaborator seams: menu catalog and notification dispatch

pub mod catalog;
pub mod notify;

pub use catalog::{InMemoryCatalog, MenuCatalog};
pub use notify::{NotificationDispatch, NotifyError, TracingNotifier};
