//! Watches the sensor record for a trigger edge.
//!
//! The hardware backend raises `triggered` when a customer approaches; the
//! kiosk reacts once and resets the record to untriggered, the same
//! handshake the original front end performs before entering the order flow.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use ordr_common::config::Config;

use crate::store::RowStore;

use super::{SensorSink, ShutdownRx};

pub struct SensorPoller {
    store: Arc<dyn RowStore>,
    sink: Arc<dyn SensorSink>,
    interval: Duration,
}

impl SensorPoller {
    pub fn new(store: Arc<dyn RowStore>, sink: Arc<dyn SensorSink>, cfg: &Config) -> Self {
        Self {
            store,
            sink,
            interval: cfg.sensor_poll_interval,
        }
    }

    /// One poll cycle: react to a raised trigger, then lower it.
    pub async fn tick(&self) {
        let status = match self.store.sensor_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!("sensor poll failed: {e}");
                return;
            }
        };

        if !status.triggered {
            return;
        }

        info!("sensor triggered, starting kiosk session");

        if let Err(e) = self.sink.on_sensor_triggered().await {
            // Record stays raised so the trigger retries next tick.
            warn!("sensor handler failed: {e}");
            return;
        }

        if let Err(e) = self.store.reset_sensor().await {
            warn!("failed to reset sensor record: {e}");
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
