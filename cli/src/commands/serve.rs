use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;

use ordr_common::config::Config;
use ordr_core::flow::{self, FlowDelays, OrderFlow};
use ordr_core::poller::{
    FinalizedOrderPoller, FinalizedPollerState, GesturePoller, SensorPoller, SensorSink,
};
use ordr_core::store::memory::MemoryStore;
use ordr_server::state::AppState;

/// Reacts to the proximity sensor by announcing a fresh session. The order
/// flow itself stays on the menu; the greeting screen is the front end's job.
struct SessionAnnouncer;

#[async_trait]
impl SensorSink for SessionAnnouncer {
    async fn on_sensor_triggered(&self) -> anyhow::Result<()> {
        info!("customer detected, kiosk session starting");
        Ok(())
    }
}

/// Wires the store, the order-flow task, all three pollers and the HTTP
/// surface together and runs until ctrl-c.
pub async fn serve(port_override: Option<u16>) -> anyhow::Result<()> {
    let mut cfg = Config::load();
    if let Some(port) = port_override {
        cfg.port = port;
    }

    let store = Arc::new(MemoryStore::new());

    let poller_state = Arc::new(FinalizedPollerState::default());
    let (order_flow, snapshot) = OrderFlow::new(FlowDelays::default(), poller_state.clone());
    let (handle, flow_task) = flow::spawn(order_flow);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let gesture = Arc::new(GesturePoller::new(
        store.clone(),
        Arc::new(handle.clone()),
        &cfg,
    ));
    let finalized = Arc::new(FinalizedOrderPoller::with_state(
        store.clone(),
        Arc::new(handle.clone()),
        &cfg,
        poller_state,
    ));
    let sensor = Arc::new(SensorPoller::new(
        store.clone(),
        Arc::new(SessionAnnouncer),
        &cfg,
    ));

    let pollers = vec![
        tokio::spawn(gesture.run(shutdown_rx.clone())),
        tokio::spawn(finalized.run(shutdown_rx.clone())),
        tokio::spawn(sensor.run(shutdown_rx.clone())),
    ];

    let state = AppState::new(store.clone(), snapshot);
    let server = tokio::spawn(ordr_server::serve(state, cfg.port, shutdown_rx.clone()));

    info!("kiosk running, press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    info!("shutting down");
    let _ = shutdown_tx.send(true);

    for poller in pollers {
        let _ = poller.await;
    }
    server.await??;

    drop(handle);
    let _ = flow_task.await;

    Ok(())
}
