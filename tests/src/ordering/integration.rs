#![cfg(test)]
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use ordr_common::config::Config;
use ordr_common::order::{Stage, TAX_RATE};
use ordr_core::flow::{self, FlowDelays, FlowEvent, FlowSnapshot, OrderFlow};
use ordr_core::poller::{FinalizedOrderPoller, FinalizedPollerState, GesturePoller};
use ordr_core::store::RowStore;
use ordr_core::store::memory::MemoryStore;

fn test_config() -> Config {
    Config {
        gesture_poll_interval: Duration::from_millis(10),
        gesture_settle_delay: Duration::from_millis(1),
        finalized_poll_interval: Duration::from_millis(10),
        ..Config::default()
    }
}

async fn wait_for_stage(observer: &mut watch::Receiver<FlowSnapshot>, stage: Stage) {
    tokio::time::timeout(
        Duration::from_secs(10),
        observer.wait_for(|snapshot| snapshot.stage == stage),
    )
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for stage {stage}"))
    .expect("flow task dropped its watch channel");
}

fn assert_totals_consistent(snapshot: &FlowSnapshot) {
    let expected: f64 = snapshot
        .lines
        .iter()
        .map(|l| l.item.price * f64::from(l.quantity))
        .sum();
    assert!((snapshot.subtotal - expected).abs() < 1e-9);
    assert!((snapshot.total - expected * (1.0 + TAX_RATE)).abs() < 1e-9);
}

/// A full manual session driven through the real gesture poller: rows in the
/// store come out the other end as a completed order.
#[tokio::test]
async fn manual_session_via_gesture_poller() {
    let cfg = test_config();
    let store = Arc::new(MemoryStore::new());

    let (order_flow, snapshot) =
        OrderFlow::new(FlowDelays::instant(), Arc::new(FinalizedPollerState::default()));
    let (handle, _flow_task) = flow::spawn(order_flow);

    let gesture = Arc::new(GesturePoller::new(
        store.clone(),
        Arc::new(handle.clone()),
        &cfg,
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller_task = tokio::spawn(gesture.clone().run(shutdown_rx));

    for token in ["B", "2", "D", "1", "FINISH"] {
        store.push_command(token);
    }

    let mut observer = snapshot.clone();
    wait_for_stage(&mut observer, Stage::Complete).await;

    let final_snapshot = observer.borrow().clone();
    assert_eq!(final_snapshot.lines.len(), 2);
    assert_eq!(final_snapshot.lines[0].item.id, "burger");
    assert_eq!(final_snapshot.lines[0].quantity, 2);
    assert_eq!(final_snapshot.lines[1].item.id, "drink");
    assert_totals_consistent(&final_snapshot);

    // Every row was consumed in order and marked processed (the final mark
    // lands just after the completion snapshot, hence the grace sleep)
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(gesture.last_processed_id(), 5);
    assert!(store.next_command(0).await.unwrap().is_none());

    let _ = shutdown_tx.send(true);
    let _ = poller_task.await;
}

/// A finalized order lands in the feed, is replayed to completion, and a
/// new-order reset re-arms the poller so the next customer's row (same feed,
/// new identity) is picked up too.
#[tokio::test]
async fn finalized_replay_and_rearm_cycle() {
    let cfg = test_config();
    let store = Arc::new(MemoryStore::new());

    let poller_state = Arc::new(FinalizedPollerState::default());
    let (order_flow, snapshot) = OrderFlow::new(FlowDelays::instant(), poller_state.clone());
    let (handle, _flow_task) = flow::spawn(order_flow);

    let finalized = Arc::new(FinalizedOrderPoller::with_state(
        store.clone(),
        Arc::new(handle.clone()),
        &cfg,
        poller_state.clone(),
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller_task = tokio::spawn(finalized.clone().run(shutdown_rx));

    store.push_finalized_order("✅ Client 1: [{'item': 'Soft Drink', 'quantity': 2}]");

    let mut observer = snapshot.clone();
    wait_for_stage(&mut observer, Stage::Complete).await;

    {
        let first_order = observer.borrow().clone();
        assert_eq!(first_order.lines.len(), 1);
        assert_eq!(first_order.lines[0].item.id, "drink");
        assert_eq!(first_order.client.as_deref(), Some("Client 1"));
        assert_totals_consistent(&first_order);
    }
    assert!(poller_state.has_processed());

    // The next customer's row lands while the poller is still stopped
    store.push_finalized_order("✅ Client 2: [{'item': 'French Fries', 'quantity': 1}]");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(observer.borrow().client.as_deref(), Some("Client 1"));

    // New-order reset re-arms the poller through the flow
    handle.dispatch(FlowEvent::NewOrder).await.unwrap();
    wait_for_stage(&mut observer, Stage::Complete).await;

    let second_order = observer.borrow().clone();
    assert_eq!(second_order.lines.len(), 1);
    assert_eq!(second_order.lines[0].item.id, "fries");
    assert_eq!(second_order.client.as_deref(), Some("Client 2"));

    let _ = shutdown_tx.send(true);
    let _ = poller_task.await;
}

/// Gestures that arrive while a scripted replay is in flight are queued
/// behind it and fall through harmlessly: the completed order contains only
/// the replayed lines.
#[tokio::test]
async fn manual_gestures_cannot_interleave_with_replay() {
    let cfg = test_config();
    let store = Arc::new(MemoryStore::new());

    let delays = FlowDelays {
        adding_item: Duration::ZERO,
        confirming: Duration::from_millis(30),
        replay_select: Duration::from_millis(30),
        replay_quantity: Duration::from_millis(30),
        replay_added: Duration::from_millis(30),
        replay_gap: Duration::from_millis(30),
    };

    let poller_state = Arc::new(FinalizedPollerState::default());
    let (order_flow, snapshot) = OrderFlow::new(delays, poller_state.clone());
    let (handle, _flow_task) = flow::spawn(order_flow);

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
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let gesture_task = tokio::spawn(gesture.clone().run(shutdown_rx.clone()));
    let finalized_task = tokio::spawn(finalized.clone().run(shutdown_rx.clone()));

    store.push_finalized_order("✅ Client 3: [{'item': 'Classic Burger', 'quantity': 1}]");

    // Wait until the replay has started, then race a manual gesture at it
    let mut observer = snapshot.clone();
    tokio::time::timeout(
        Duration::from_secs(10),
        observer.wait_for(|snapshot| snapshot.replaying),
    )
    .await
    .expect("replay never started")
    .unwrap();

    store.push_command("D");

    wait_for_stage(&mut observer, Stage::Complete).await;
    // Give the queued gesture time to be applied (and ignored)
    tokio::time::sleep(Duration::from_millis(100)).await;

    let final_snapshot = observer.borrow().clone();
    assert_eq!(final_snapshot.stage, Stage::Complete);
    assert_eq!(final_snapshot.lines.len(), 1);
    assert_eq!(final_snapshot.lines[0].item.id, "burger");
    assert!(final_snapshot.selected.is_none());

    let _ = shutdown_tx.send(true);
    let _ = gesture_task.await;
    let _ = finalized_task.await;
}
