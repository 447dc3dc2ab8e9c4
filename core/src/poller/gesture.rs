//! Polls the gesture command feed and dispatches rows to a [`CommandSink`].
//!
//! Commands are consumed strictly in arrival order, one row per tick, so a
//! burst of gestures drains gradually instead of racing the handler. Delivery
//! is at-least-once: a failed handler (or a failed `mark_processed`) leaves
//! the row unprocessed and the cursor unmoved, so the row is retried on a
//! later tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use ordr_common::config::Config;

use crate::store::RowStore;

use super::{CommandSink, ShutdownRx};

pub struct GesturePoller {
    store: Arc<dyn RowStore>,
    sink: Arc<dyn CommandSink>,
    interval: Duration,
    settle_delay: Duration,
    last_processed_id: AtomicI64,
    processing: AtomicBool,
}

impl GesturePoller {
    pub fn new(store: Arc<dyn RowStore>, sink: Arc<dyn CommandSink>, cfg: &Config) -> Self {
        Self {
            store,
            sink,
            interval: cfg.gesture_poll_interval,
            settle_delay: cfg.gesture_settle_delay,
            last_processed_id: AtomicI64::new(0),
            processing: AtomicBool::new(false),
        }
    }

    /// Id of the last successfully processed command row.
    pub fn last_processed_id(&self) -> i64 {
        self.last_processed_id.load(Ordering::Acquire)
    }

    /// Whether a handler invocation is currently in flight.
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// One poll cycle: fetch at most one row, deliver it, mark it processed.
    pub async fn tick(&self) {
        if self.processing.load(Ordering::Acquire) {
            return;
        }

        let after_id = self.last_processed_id.load(Ordering::Acquire);
        let row = match self.store.next_command(after_id).await {
            Ok(Some(row)) => row,
            Ok(None) => return,
            Err(e) => {
                warn!("command poll failed: {e}");
                return;
            }
        };

        // Claim the latch; a concurrent tick may have fetched the same row.
        if self.processing.swap(true, Ordering::AcqRel) {
            return;
        }

        debug!(id = row.id, command = %row.command, "processing gesture command");

        if let Err(e) = self.sink.on_command(&row.command).await {
            // Row stays unprocessed so it is retried or superseded later.
            warn!(id = row.id, "command handler failed: {e}");
            self.processing.store(false, Ordering::Release);
            return;
        }

        if let Err(e) = self.store.mark_processed(row.id).await {
            warn!(id = row.id, "failed to mark command processed: {e}");
            self.processing.store(false, Ordering::Release);
            return;
        }

        self.last_processed_id.store(row.id, Ordering::Release);

        tokio::time::sleep(self.settle_delay).await;
        self.processing.store(false, Ordering::Release);
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
