//! # Feed Pollers
//!
//! Repeating background tasks that turn eventually-consistent rows in the
//! external store into serialized handler invocations. Each poller owns a
//! processing latch so at most one handler runs per poller at any time, and
//! each degrades every failure to "retry on the next tick".
//!
//! Pollers share no mutable state with each other; they only meet at the
//! order-flow controller through the sink traits below. Stopping a poller
//! means its run loop stops ticking: an in-flight handler is never aborted,
//! it runs to completion.

use async_trait::async_trait;
use tokio::sync::watch;

pub mod finalized;
pub mod gesture;
pub mod sensor;

pub use finalized::{FinalizedOrderPoller, FinalizedPollerState};
pub use gesture::GesturePoller;
pub use sensor::SensorPoller;

/// Receiver side of the shutdown flag shared by the poller run loops.
pub type ShutdownRx = watch::Receiver<bool>;

/// Consumer of gesture command tokens, one at a time.
#[async_trait]
pub trait CommandSink: Send + Sync {
    async fn on_command(&self, command: &str) -> anyhow::Result<()>;
}

/// Consumer of raw finalized-order content, at most once per row identity.
#[async_trait]
pub trait FinalizedOrderSink: Send + Sync {
    async fn on_finalized_order(&self, content: &str) -> anyhow::Result<()>;
}

/// Consumer of sensor trigger edges.
#[async_trait]
pub trait SensorSink: Send + Sync {
    async fn on_sensor_triggered(&self) -> anyhow::Result<()>;
}
