//! The central **abstraction** for the external row store.
//!
//! The kiosk never talks to a concrete database; it reads command rows,
//! finalized-order rows and the sensor record through this trait, and the
//! pollers only ever flip the `processed` flag. High-level modules depend on
//! this abstraction so the hosted store can be swapped for the in-memory
//! implementation in the demo binary and the tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use ordr_common::error::StoreResult;

pub mod memory;

/// One row of the gesture command feed. Ids are monotonic; ordering by id is
/// arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRow {
    pub id: i64,
    pub command: String,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

/// One row of the finalized-order feed. Ids are opaque and compared only for
/// identity; the most recently created row is canonical.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedOrderRow {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// The single mutable sensor record written by the hardware backend.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SensorStatus {
    pub triggered: bool,
    pub last_triggered_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Request/response access to the three logical tables.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Earliest unprocessed command row with id greater than `after_id`,
    /// limit one.
    async fn next_command(&self, after_id: i64) -> StoreResult<Option<CommandRow>>;

    /// Flips `processed` on the given command row.
    async fn mark_processed(&self, id: i64) -> StoreResult<()>;

    /// Most recently created finalized-order row, limit one.
    async fn latest_finalized_order(&self) -> StoreResult<Option<FinalizedOrderRow>>;

    /// Current sensor record.
    async fn sensor_status(&self) -> StoreResult<SensorStatus>;

    /// Updates the sensor record, stamping the trigger time when raised.
    async fn set_sensor(&self, triggered: bool) -> StoreResult<SensorStatus>;

    /// Resets the sensor record to untriggered.
    async fn reset_sensor(&self) -> StoreResult<()>;
}
