//! # Sensor HTTP Surface
//!
//! The small axum app the hardware backend talks to: raise or reset the
//! sensor record, plus a read-only snapshot of the order flow for the kiosk
//! front end. All mutations go through the [`RowStore`]; the snapshot route
//! only observes the controller's watch channel and can never touch flow
//! state.
//!
//! [`RowStore`]: ordr_core::store::RowStore

pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::sync::watch;
use tracing::info;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/sensor",
            post(routes::update_sensor).delete(routes::reset_sensor),
        )
        .route("/api/order", get(routes::order_snapshot))
        .with_state(state)
}

/// Binds the app and serves it until the shutdown flag flips.
pub async fn serve(
    state: Arc<AppState>,
    port: u16,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("sensor API listening on port {port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await?;

    Ok(())
}
