//! An in-memory [`RowStore`].
//!
//! Backs the demo binary and the tests. Writers (the demo script, tests, the
//! HTTP surface) push rows through the inherent methods; the pollers observe
//! them through the trait exactly as they would against the hosted store.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use ordr_common::error::{StoreError, StoreResult};

use super::{CommandRow, FinalizedOrderRow, RowStore, SensorStatus};

#[derive(Default)]
struct Tables {
    commands: Vec<CommandRow>,
    next_command_id: i64,
    finalized: Vec<FinalizedOrderRow>,
    next_finalized_seq: u64,
    sensor: Option<SensorStatus>,
}

pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
        }
    }

    /// Appends a gesture command row, returning its id.
    pub fn push_command(&self, command: &str) -> i64 {
        let mut tables = self.lock();
        tables.next_command_id += 1;
        let id = tables.next_command_id;
        tables.commands.push(CommandRow {
            id,
            command: command.to_string(),
            processed: false,
            created_at: Utc::now(),
        });
        id
    }

    /// Appends a finalized-order row, returning its id.
    pub fn push_finalized_order(&self, content: &str) -> String {
        let mut tables = self.lock();
        tables.next_finalized_seq += 1;
        let id = format!("order-{}", tables.next_finalized_seq);
        tables.finalized.push(FinalizedOrderRow {
            id: id.clone(),
            content: content.to_string(),
            created_at: Utc::now(),
        });
        id
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // A poisoned lock means a writer panicked mid-update; the tables are
        // plain Vecs so the data is still coherent.
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn next_command(&self, after_id: i64) -> StoreResult<Option<CommandRow>> {
        let tables = self.lock();
        Ok(tables
            .commands
            .iter()
            .filter(|row| !row.processed && row.id > after_id)
            .min_by_key(|row| row.id)
            .cloned())
    }

    async fn mark_processed(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.lock();
        let row = tables
            .commands
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(StoreError::MissingRow(id))?;
        row.processed = true;
        Ok(())
    }

    async fn latest_finalized_order(&self) -> StoreResult<Option<FinalizedOrderRow>> {
        let tables = self.lock();
        Ok(tables
            .finalized
            .iter()
            .max_by_key(|row| row.created_at)
            .cloned())
    }

    async fn sensor_status(&self) -> StoreResult<SensorStatus> {
        let tables = self.lock();
        Ok(tables.sensor.clone().unwrap_or(SensorStatus {
            triggered: false,
            last_triggered_at: None,
            updated_at: Utc::now(),
        }))
    }

    async fn set_sensor(&self, triggered: bool) -> StoreResult<SensorStatus> {
        let mut tables = self.lock();
        let now = Utc::now();
        let last_triggered_at = if triggered {
            Some(now)
        } else {
            tables.sensor.as_ref().and_then(|s| s.last_triggered_at)
        };
        let status = SensorStatus {
            triggered,
            last_triggered_at,
            updated_at: now,
        };
        tables.sensor = Some(status.clone());
        Ok(status)
    }

    async fn reset_sensor(&self) -> StoreResult<()> {
        self.set_sensor(false).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_next_command_is_earliest_unprocessed_after_cursor() {
        let store = MemoryStore::new();
        let first = store.push_command("B");
        let second = store.push_command("2");
        store.push_command("FINISH");

        let row = store.next_command(0).await.unwrap().unwrap();
        assert_eq!(row.id, first);
        assert_eq!(row.command, "B");

        // Marking processed moves the feed forward
        store.mark_processed(first).await.unwrap();
        let row = store.next_command(first).await.unwrap().unwrap();
        assert_eq!(row.id, second);

        // Cursor past everything yields nothing
        assert!(store.next_command(100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unprocessed_rows_stay_visible() {
        let store = MemoryStore::new();
        let id = store.push_command("B");

        // Without mark_processed the same row is returned again
        assert_eq!(store.next_command(0).await.unwrap().unwrap().id, id);
        assert_eq!(store.next_command(0).await.unwrap().unwrap().id, id);
    }

    #[tokio::test]
    async fn test_mark_processed_missing_row() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.mark_processed(42).await,
            Err(StoreError::MissingRow(42))
        ));
    }

    #[tokio::test]
    async fn test_latest_finalized_order() {
        let store = MemoryStore::new();
        assert!(store.latest_finalized_order().await.unwrap().is_none());

        store.push_finalized_order("first");
        let newest = store.push_finalized_order("second");

        let row = store.latest_finalized_order().await.unwrap().unwrap();
        assert_eq!(row.id, newest);
        assert_eq!(row.content, "second");
    }

    #[tokio::test]
    async fn test_sensor_round_trip() {
        let store = MemoryStore::new();
        assert!(!store.sensor_status().await.unwrap().triggered);

        let status = store.set_sensor(true).await.unwrap();
        assert!(status.triggered);
        assert!(status.last_triggered_at.is_some());

        store.reset_sensor().await.unwrap();
        let status = store.sensor_status().await.unwrap();
        assert!(!status.triggered);
        // The trigger timestamp survives the reset
        assert!(status.last_triggered_at.is_some());
    }
}
