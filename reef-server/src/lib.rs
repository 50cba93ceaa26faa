//! Reef Fulfillment Server - room-service order pipeline
//!
//! # Architecture Overview
//!
//! The server owns the order fulfillment pipeline for the resort's
//! room-service flow:
//!
//! - **Order store** (`orders::store`): embedded redb persistence, the
//!   source of truth for order state
//! - **Fulfillment engine** (`orders::engine`): the only writer of order
//!   status, gating every transition on the caller's expected status
//! - **Change broadcaster** (`orders::broadcast`): per-topic fan-out of
//!   committed transitions to kitchen and guest sessions
//! - **HTTP API** (`api`): RESTful commands and an SSE event feed
//!
//! # Module Structure
//!
//! ```text
//! reef-server/src/
//! ├── core/          # Config, state, server
//! ├── api/           # HTTP routes and handlers
//! ├── orders/        # Store, engine, broadcaster, flow consumption
//! ├── services/      # Menu catalog and notification seams
//! └── utils/         # Errors, logging
//! ```

pub mod api;
pub mod core;
pub mod orders;
pub mod services;
pub mod utils;

// Re-export public types
pub use crate::core::{Config, Server, ServerState, print_banner, setup_environment};
pub use orders::{ChangeBroadcaster, FulfillmentEngine, OrderStore};
pub use services::{InMemoryCatalog, MenuCatalog, NotificationDispatch, TracingNotifier};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
