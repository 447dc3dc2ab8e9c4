use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tracing::info;

use ordr_common::config::Config;
use ordr_common::order::Stage;
use ordr_core::flow::{self, FlowDelays, FlowEvent, FlowSnapshot, OrderFlow};
use ordr_core::poller::{FinalizedOrderPoller, FinalizedPollerState, GesturePoller};
use ordr_core::store::memory::MemoryStore;

use crate::terminal::print;

const GESTURE_SCRIPT: &[&str] = &["B", "2", "F", "1", "FINISH"];

const FINALIZED_ORDER: &str =
    "✅ Client 27: [{'item': 'Soft Drink', 'quantity': 2}, {'item': 'Classic Burger', 'quantity': 1}]";

/// Plays both entry paths end to end against the in-memory store: a manual
/// gesture session first, then a finalized-order replay after the kiosk is
/// reset for the next customer.
pub async fn demo() -> anyhow::Result<()> {
    let cfg = Config {
        gesture_poll_interval: Duration::from_millis(50),
        gesture_settle_delay: Duration::from_millis(100),
        finalized_poll_interval: Duration::from_millis(200),
        ..Config::default()
    };

    let store = Arc::new(MemoryStore::new());

    let poller_state = Arc::new(FinalizedPollerState::default());
    let (order_flow, snapshot) = OrderFlow::new(FlowDelays::brisk(), poller_state.clone());
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

    let pollers = vec![
        tokio::spawn(gesture.run(shutdown_rx.clone())),
        tokio::spawn(finalized.run(shutdown_rx.clone())),
    ];

    let mut observer = snapshot.clone();

    print::header("manual gesture session");
    for token in GESTURE_SCRIPT {
        store.push_command(token);
        info!(token = *token, "gesture recognized");
        let cadence = rand::rng().random_range(150..400u64);
        tokio::time::sleep(Duration::from_millis(cadence)).await;
    }
    wait_for_stage(&mut observer, Stage::Complete).await?;
    print::receipt(&observer.borrow().clone());

    handle.dispatch(FlowEvent::NewOrder).await?;

    print::header("finalized order replay");
    store.push_finalized_order(FINALIZED_ORDER);
    wait_for_stage(&mut observer, Stage::Complete).await?;
    print::receipt(&observer.borrow().clone());

    let _ = shutdown_tx.send(true);
    for poller in pollers {
        let _ = poller.await;
    }
    drop(handle);
    let _ = flow_task.await;

    Ok(())
}

async fn wait_for_stage(
    observer: &mut watch::Receiver<FlowSnapshot>,
    stage: Stage,
) -> anyhow::Result<()> {
    tokio::time::timeout(
        Duration::from_secs(30),
        observer.wait_for(|snapshot| snapshot.stage == stage),
    )
    .await??;

    Ok(())
}
