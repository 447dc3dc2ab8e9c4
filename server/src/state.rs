use std::sync::Arc;

use tokio::sync::watch;

use ordr_core::flow::FlowSnapshot;
use ordr_core::store::RowStore;

/// Shared handles the route handlers work against.
pub struct AppState {
    pub store: Arc<dyn RowStore>,
    pub snapshot: watch::Receiver<FlowSnapshot>,
}

impl AppState {
    pub fn new(store: Arc<dyn RowStore>, snapshot: watch::Receiver<FlowSnapshot>) -> Arc<Self> {
        Arc::new(Self { store, snapshot })
    }
}
