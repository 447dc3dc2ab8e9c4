use thiserror::Error;

/// Failures surfaced by the external row store.
///
/// Every variant is transient from the kiosk's point of view: pollers log the
/// error and retry on their next tick, nothing propagates to the order flow.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("row store request failed: {0}")]
    Backend(String),

    #[error("command row {0} does not exist")]
    MissingRow(i64),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
