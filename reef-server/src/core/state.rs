use std::sync::Arc;

use crate::core::Config;
use crate::orders::{ChangeBroadcaster, FulfillmentEngine, OrderStore};
use crate::services::{InMemoryCatalog, MenuCatalog, NotificationDispatch, TracingNotifier};

/// Server state - shared handles to every service
///
/// Cloning is shallow; all components are behind `Arc`.
///
/// | Field | Description |
/// |-------|-------------|
/// | config | Configuration (immutable) |
/// | engine | Fulfillment engine, the only writer of order state |
/// | broadcaster | Per-topic change fan-out |
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Fulfillment engine
    pub engine: Arc<FulfillmentEngine>,
    /// Change broadcaster (shared with the engine)
    pub broadcaster: Arc<ChangeBroadcaster>,
}

impl ServerState {
    /// Assemble state from already-built parts
    ///
    /// Used by tests to inject a custom store, catalog or notifier.
    pub fn build(
        config: Config,
        store: OrderStore,
        catalog: Arc<dyn MenuCatalog>,
        notifier: Arc<dyn NotificationDispatch>,
    ) -> Self {
        let broadcaster = Arc::new(ChangeBroadcaster::with_capacity(
            config.event_channel_capacity,
        ));
        let engine = Arc::new(FulfillmentEngine::new(
            store,
            broadcaster.clone(),
            catalog,
            notifier,
        ));
        Self {
            config,
            engine,
            broadcaster,
        }
    }

    /// Initialize all services for a production run
    ///
    /// Creates the work directory and opens the order database inside it.
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let store = OrderStore::open(config.db_path())?;
        tracing::info!(path = %config.db_path().display(), "Order store opened");

        let catalog: Arc<dyn MenuCatalog> = Arc::new(InMemoryCatalog::with_default_menu());
        let notifier: Arc<dyn NotificationDispatch> = Arc::new(TracingNotifier);

        Ok(Self::build(config.clone(), store, catalog, notifier))
    }
}
