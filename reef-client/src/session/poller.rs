//! Reconciliation poller
//!
//! Bounds the staleness window of any session whose push subscription
//! silently dropped events (a connectivity blip, a lagged ring buffer).
//! On a fixed interval the session re-fetches authoritative state for
//! everything it displays; the fetched value always wins.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ClientResult;

/// Default poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// A session view that can re-fetch its authoritative state
#[async_trait]
pub trait Reconcile: Send {
    async fn reconcile(&mut self) -> ClientResult<()>;
}

/// Fixed-interval reconciliation loop
pub struct ReconciliationPoller {
    interval: Duration,
    shutdown: CancellationToken,
}

impl ReconciliationPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that stops the loop when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run the poll loop in the background until the token is cancelled
    pub fn spawn<S>(self, session: Arc<Mutex<S>>) -> JoinHandle<()>
    where
        S: Reconcile + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately and the session just
            // fetched on open; skip it
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = session.lock().await.reconcile().await {
                            tracing::warn!(error = %e, "Reconciliation poll failed");
                        }
                    }
                }
            }
            tracing::debug!("Reconciliation poller stopped");
        })
    }
}

impl Default for ReconciliationPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}
