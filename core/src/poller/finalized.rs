//! Polls the finalized-order feed and hands each **new** row to a
//! [`FinalizedOrderSink`] exactly once per row identity.
//!
//! The most recently created row is canonical; novelty is detected by
//! comparing its id against the last consumed identity. Once an order has
//! been processed the poller goes quiet (when configured to stop after the
//! first), and the shared [`FinalizedPollerState`] reset is the only way to
//! re-arm it for the next customer.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use ordr_common::config::Config;

use crate::store::RowStore;

use super::{FinalizedOrderSink, ShutdownRx};

#[derive(Default)]
struct Seen {
    last_processed_id: Option<String>,
    has_processed: bool,
    processing: bool,
}

/// Novelty memory shared between the poller and whoever may re-arm it
/// (the order-flow controller, on a new-order reset).
#[derive(Default)]
pub struct FinalizedPollerState {
    seen: Mutex<Seen>,
}

impl FinalizedPollerState {
    /// Clears the processed-once flag, the remembered identity and the latch,
    /// re-arming the poller for a subsequent order.
    pub fn reset(&self) {
        *self.lock() = Seen::default();
        info!("finalized-order polling re-armed");
    }

    pub fn has_processed(&self) -> bool {
        self.lock().has_processed
    }

    pub fn is_processing(&self) -> bool {
        self.lock().processing
    }

    fn lock(&self) -> MutexGuard<'_, Seen> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub struct FinalizedOrderPoller {
    store: Arc<dyn RowStore>,
    sink: Arc<dyn FinalizedOrderSink>,
    interval: Duration,
    stop_after_first: bool,
    state: Arc<FinalizedPollerState>,
}

impl FinalizedOrderPoller {
    pub fn new(
        store: Arc<dyn RowStore>,
        sink: Arc<dyn FinalizedOrderSink>,
        cfg: &Config,
    ) -> Self {
        Self::with_state(store, sink, cfg, Arc::new(FinalizedPollerState::default()))
    }

    /// Builds the poller around an externally owned state so the controller
    /// can hold the re-arm handle before the poller exists.
    pub fn with_state(
        store: Arc<dyn RowStore>,
        sink: Arc<dyn FinalizedOrderSink>,
        cfg: &Config,
        state: Arc<FinalizedPollerState>,
    ) -> Self {
        Self {
            store,
            sink,
            interval: cfg.finalized_poll_interval,
            stop_after_first: cfg.stop_after_first_order,
            state,
        }
    }

    /// Handle for re-arming the poller from outside its run loop.
    pub fn state(&self) -> Arc<FinalizedPollerState> {
        self.state.clone()
    }

    /// One poll cycle: fetch the newest row and deliver it if unseen.
    pub async fn tick(&self) {
        {
            let seen = self.state.lock();
            if seen.processing || (self.stop_after_first && seen.has_processed) {
                return;
            }
        }

        let row = match self.store.latest_finalized_order().await {
            Ok(Some(row)) => row,
            Ok(None) => return,
            Err(e) => {
                warn!("finalized-order poll failed: {e}");
                return;
            }
        };

        // Claim the row under the lock; re-check the latch since another tick
        // may have started while we were fetching.
        let previous_id = {
            let mut seen = self.state.lock();
            if seen.processing {
                return;
            }
            if seen.last_processed_id.as_deref() == Some(row.id.as_str()) {
                return;
            }
            seen.processing = true;
            seen.last_processed_id.replace(row.id.clone())
        };

        info!(id = %row.id, "new finalized order received");

        match self.sink.on_finalized_order(&row.content).await {
            Ok(()) => {
                let mut seen = self.state.lock();
                seen.has_processed = true;
                seen.processing = false;
            }
            Err(e) => {
                // Roll the identity back so the same row retries next tick.
                warn!(id = %row.id, "finalized-order handler failed: {e}");
                let mut seen = self.state.lock();
                seen.last_processed_id = previous_id;
                seen.processing = false;
            }
        }
    }

    /// Ticks at the configured interval until the shutdown flag flips.
    pub async fn run(self: Arc<Self>, mut shutdown: ShutdownRx) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                _ = shutdown.changed() => break,
            }
        }
    }
}
