//! # Order Flow Controller
//!
//! One task owns the stage machine and the cart. Every input — gesture
//! tokens from the poller, manual taps from the front end, the scripted
//! replay of a finalized order, the new-order reset — arrives as a
//! [`FlowEvent`] on a single queue and is processed strictly one at a time,
//! so manual and scripted entry can never interleave. Observers (the HTTP
//! surface, the demo renderer) watch immutable [`FlowSnapshot`]s through a
//! `tokio::sync::watch` channel.
//!
//! The fixed display delays that simulate backend latency are awaited inside
//! the task itself; no transition from a previous stage can fire late because
//! nothing else runs in the task until the delay and its transition complete.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use ordr_common::menu::MenuItem;
use ordr_common::order::{self, OrderLine, Stage};

use crate::command::{self, Action};
use crate::parser::{self, ParsedLine};
use crate::poller::{CommandSink, FinalizedOrderSink, FinalizedPollerState};

/// Display delays driving the auto-transitions.
#[derive(Debug, Clone)]
pub struct FlowDelays {
    /// `adding-item` animation before returning to the menu.
    pub adding_item: Duration,
    /// `confirming` hold before the order completes.
    pub confirming: Duration,
    /// Replay: item shown on screen.
    pub replay_select: Duration,
    /// Replay: quantity shown on screen.
    pub replay_quantity: Duration,
    /// Replay: line added to the receipt.
    pub replay_added: Duration,
    /// Replay: pause between items.
    pub replay_gap: Duration,
}

impl Default for FlowDelays {
    fn default() -> Self {
        Self {
            adding_item: Duration::from_millis(1500),
            confirming: Duration::from_millis(5000),
            replay_select: Duration::from_millis(2000),
            replay_quantity: Duration::from_millis(1500),
            replay_added: Duration::from_millis(2500),
            replay_gap: Duration::from_millis(500),
        }
    }
}

impl FlowDelays {
    /// Shortened delays for the scripted demo.
    pub fn brisk() -> Self {
        Self {
            adding_item: Duration::from_millis(300),
            confirming: Duration::from_millis(800),
            replay_select: Duration::from_millis(400),
            replay_quantity: Duration::from_millis(300),
            replay_added: Duration::from_millis(500),
            replay_gap: Duration::from_millis(150),
        }
    }

    /// No delays at all. Transitions still happen in order, just without the
    /// display holds; intended for tests.
    pub fn instant() -> Self {
        Self {
            adding_item: Duration::ZERO,
            confirming: Duration::ZERO,
            replay_select: Duration::ZERO,
            replay_quantity: Duration::ZERO,
            replay_added: Duration::ZERO,
            replay_gap: Duration::ZERO,
        }
    }
}

/// Immutable view of the flow published after every mutation.
#[derive(Debug, Clone, Serialize)]
pub struct FlowSnapshot {
    pub stage: Stage,
    pub lines: Vec<OrderLine>,
    pub selected: Option<&'static MenuItem>,
    pub selected_quantity: Option<u32>,
    pub client: Option<String>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    /// True while a finalized order is being replayed; the front end disables
    /// manual entry for the duration.
    pub replaying: bool,
}

/// One input to the controller, whatever its source.
#[derive(Debug)]
pub enum FlowEvent {
    /// Raw token from the gesture command feed.
    Gesture(String),
    /// Manual item tap from the front end.
    ItemTapped(&'static MenuItem),
    /// Manual quantity pick from the front end.
    QuantityPicked(u32),
    /// Manual finish from the front end.
    FinishRequested,
    /// Raw content of a finalized-order row, replayed as a scripted session.
    FinalizedOrder(String),
    /// Start over after `complete`.
    NewOrder,
}

pub struct OrderFlow {
    stage: Stage,
    lines: Vec<OrderLine>,
    selected: Option<&'static MenuItem>,
    selected_quantity: Option<u32>,
    client: Option<String>,
    replaying: bool,
    delays: FlowDelays,
    snapshot_tx: watch::Sender<FlowSnapshot>,
    finalized_reset: Arc<FinalizedPollerState>,
}

impl OrderFlow {
    pub fn new(
        delays: FlowDelays,
        finalized_reset: Arc<FinalizedPollerState>,
    ) -> (Self, watch::Receiver<FlowSnapshot>) {
        let flow = Self {
            stage: Stage::Menu,
            lines: Vec::new(),
            selected: None,
            selected_quantity: None,
            client: None,
            replaying: false,
            delays,
            snapshot_tx: watch::channel(FlowSnapshot {
                stage: Stage::Menu,
                lines: Vec::new(),
                selected: None,
                selected_quantity: None,
                client: None,
                subtotal: 0.0,
                tax: 0.0,
                total: 0.0,
                replaying: false,
            })
            .0,
            finalized_reset,
        };
        let rx = flow.snapshot_tx.subscribe();
        (flow, rx)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            stage: self.stage,
            lines: self.lines.clone(),
            selected: self.selected,
            selected_quantity: self.selected_quantity,
            client: self.client.clone(),
            subtotal: order::subtotal(&self.lines),
            tax: order::tax(&self.lines),
            total: order::total(&self.lines),
            replaying: self.replaying,
        }
    }

    /// Applies one event, including any display delays it entails.
    pub async fn apply(&mut self, event: FlowEvent) {
        match event {
            FlowEvent::Gesture(token) => match command::interpret(&token, self.stage) {
                Action::SelectItem(item) => self.select_item(item),
                Action::SelectQuantity(quantity) => self.add_selected(quantity).await,
                Action::Finish => self.finish().await,
                Action::Ignored => {
                    debug!(token = %token, stage = %self.stage, "gesture ignored");
                }
            },
            FlowEvent::ItemTapped(item) => {
                if self.stage == Stage::Menu {
                    self.select_item(item);
                } else {
                    debug!(stage = %self.stage, "item tap ignored");
                }
            }
            FlowEvent::QuantityPicked(quantity) => {
                if self.stage == Stage::QuantitySelect {
                    self.add_selected(quantity).await;
                } else {
                    debug!(stage = %self.stage, "quantity pick ignored");
                }
            }
            FlowEvent::FinishRequested => self.finish().await,
            FlowEvent::FinalizedOrder(content) => self.replay(&content).await,
            FlowEvent::NewOrder => self.new_order(),
        }
    }

    fn select_item(&mut self, item: &'static MenuItem) {
        info!(item = item.id, "item selected");
        self.selected = Some(item);
        self.selected_quantity = None;
        self.stage = Stage::QuantitySelect;
        self.publish();
    }

    /// Confirms the pending selection with a quantity, shows the
    /// `adding-item` animation, then returns to the menu.
    async fn add_selected(&mut self, quantity: u32) {
        let Some(item) = self.selected else {
            warn!("quantity received without a selected item");
            return;
        };

        info!(item = item.id, quantity, "added to order");
        self.selected_quantity = Some(quantity);
        self.lines.push(OrderLine::new(item, quantity));
        self.stage = Stage::AddingItem;
        self.publish();

        tokio::time::sleep(self.delays.adding_item).await;

        self.selected = None;
        self.selected_quantity = None;
        self.stage = Stage::Menu;
        self.publish();
    }

    /// Completes the order: `confirming`, a hold that simulates the backend
    /// round trip, then `complete`. A finish with an empty cart is a no-op.
    async fn finish(&mut self) {
        if self.lines.is_empty() {
            debug!("finish ignored, cart is empty");
            return;
        }

        info!(lines = self.lines.len(), "finishing order");
        self.stage = Stage::Confirming;
        self.publish();

        tokio::time::sleep(self.delays.confirming).await;

        self.stage = Stage::Complete;
        self.publish();
        info!(total = %format!("{:.2}", order::total(&self.lines)), "order complete");
    }

    /// Replays a finalized order as if the customer had entered it manually,
    /// with per-step delays so the screen walks through each line, then
    /// finishes the order.
    async fn replay(&mut self, content: &str) {
        self.client = parser::client_label(content);

        let parsed = parser::parse_order_string(content);
        if parsed.is_empty() {
            warn!("no valid items in finalized order, staying put");
            return;
        }

        self.replaying = true;
        self.publish();

        for ParsedLine { item, quantity } in parsed {
            self.select_item(item);
            tokio::time::sleep(self.delays.replay_select).await;

            self.selected_quantity = Some(quantity);
            self.publish();
            tokio::time::sleep(self.delays.replay_quantity).await;

            self.lines.push(OrderLine::new(item, quantity));
            self.stage = Stage::AddingItem;
            self.publish();
            tokio::time::sleep(self.delays.replay_added).await;

            self.selected = None;
            self.selected_quantity = None;
            self.stage = Stage::Menu;
            self.publish();
            tokio::time::sleep(self.delays.replay_gap).await;
        }

        self.finish().await;

        self.replaying = false;
        self.publish();
    }

    /// Clears the completed order and re-arms the finalized-order poller.
    fn new_order(&mut self) {
        if self.stage != Stage::Complete {
            debug!(stage = %self.stage, "new-order ignored");
            return;
        }

        info!("ready for the next customer");
        self.lines.clear();
        self.selected = None;
        self.selected_quantity = None;
        self.client = None;
        self.stage = Stage::Menu;
        self.finalized_reset.reset();
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

struct Envelope {
    event: FlowEvent,
    done: oneshot::Sender<()>,
}

/// Clonable entry point into the controller queue. The poller sinks and the
/// HTTP surface all dispatch through this.
#[derive(Clone)]
pub struct FlowHandle {
    tx: mpsc::Sender<Envelope>,
}

impl FlowHandle {
    /// Enqueues an event and waits until the controller has fully applied it,
    /// display delays included.
    pub async fn dispatch(&self, event: FlowEvent) -> anyhow::Result<()> {
        let (done, finished) = oneshot::channel();
        self.tx
            .send(Envelope { event, done })
            .await
            .map_err(|_| anyhow::anyhow!("order flow task is gone"))?;
        finished
            .await
            .map_err(|_| anyhow::anyhow!("order flow task dropped the event"))?;
        Ok(())
    }
}

#[async_trait]
impl CommandSink for FlowHandle {
    async fn on_command(&self, command: &str) -> anyhow::Result<()> {
        self.dispatch(FlowEvent::Gesture(command.to_string())).await
    }
}

#[async_trait]
impl FinalizedOrderSink for FlowHandle {
    async fn on_finalized_order(&self, content: &str) -> anyhow::Result<()> {
        self.dispatch(FlowEvent::FinalizedOrder(content.to_string()))
            .await
    }
}

/// Moves the flow into its own task and returns the queue handle.
pub fn spawn(mut flow: OrderFlow) -> (FlowHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<Envelope>(32);

    let task = tokio::spawn(async move {
        while let Some(Envelope { event, done }) = rx.recv().await {
            flow.apply(event).await;
            let _ = done.send(());
        }
    });

    (FlowHandle { tx }, task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordr_common::menu;
    use ordr_common::order::TAX_RATE;

    fn flow() -> (OrderFlow, watch::Receiver<FlowSnapshot>) {
        OrderFlow::new(FlowDelays::instant(), Arc::new(FinalizedPollerState::default()))
    }

    fn assert_totals_consistent(snapshot: &FlowSnapshot) {
        let expected: f64 = snapshot
            .lines
            .iter()
            .map(|l| l.item.price * f64::from(l.quantity))
            .sum();
        assert!((snapshot.subtotal - expected).abs() < 1e-9);
        assert!((snapshot.tax - expected * TAX_RATE).abs() < 1e-9);
        assert!((snapshot.total - expected * (1.0 + TAX_RATE)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_manual_gesture_session() {
        let (mut flow, rx) = flow();

        flow.apply(FlowEvent::Gesture("B".into())).await;
        assert_eq!(flow.stage(), Stage::QuantitySelect);
        assert_eq!(flow.snapshot().selected.unwrap().id, "burger");

        flow.apply(FlowEvent::Gesture("2".into())).await;
        // The adding-item animation has played out and we are back on the menu
        assert_eq!(flow.stage(), Stage::Menu);
        assert_eq!(flow.snapshot().lines.len(), 1);
        assert_totals_consistent(&flow.snapshot());

        flow.apply(FlowEvent::Gesture("F".into())).await;
        flow.apply(FlowEvent::Gesture("1".into())).await;
        assert_eq!(flow.snapshot().lines.len(), 2);

        flow.apply(FlowEvent::Gesture("FINISH".into())).await;
        assert_eq!(flow.stage(), Stage::Complete);
        assert_totals_consistent(&flow.snapshot());

        // Observers saw the final state too
        assert_eq!(rx.borrow().stage, Stage::Complete);
    }

    #[tokio::test]
    async fn test_unknown_gestures_change_nothing() {
        let (mut flow, _rx) = flow();

        flow.apply(FlowEvent::Gesture("Z".into())).await;
        flow.apply(FlowEvent::Gesture("".into())).await;
        flow.apply(FlowEvent::Gesture("2".into())).await;

        let snapshot = flow.snapshot();
        assert_eq!(snapshot.stage, Stage::Menu);
        assert!(snapshot.lines.is_empty());
        assert!(snapshot.selected.is_none());
    }

    #[tokio::test]
    async fn test_finish_requires_items() {
        let (mut flow, _rx) = flow();

        flow.apply(FlowEvent::Gesture("FINISH".into())).await;
        assert_eq!(flow.stage(), Stage::Menu);

        flow.apply(FlowEvent::FinishRequested).await;
        assert_eq!(flow.stage(), Stage::Menu);
    }

    #[tokio::test]
    async fn test_manual_taps_respect_stage() {
        let (mut flow, _rx) = flow();
        let burger = menu::find_by_id("burger").unwrap();

        flow.apply(FlowEvent::QuantityPicked(2)).await;
        assert!(flow.snapshot().lines.is_empty());

        flow.apply(FlowEvent::ItemTapped(burger)).await;
        assert_eq!(flow.stage(), Stage::QuantitySelect);

        // A second tap while picking a quantity is ignored
        flow.apply(FlowEvent::ItemTapped(burger)).await;
        assert_eq!(flow.stage(), Stage::QuantitySelect);

        flow.apply(FlowEvent::QuantityPicked(2)).await;
        assert_eq!(flow.snapshot().lines.len(), 1);
        assert_eq!(flow.stage(), Stage::Menu);
    }

    #[tokio::test]
    async fn test_finalized_order_replay() {
        let (mut flow, _rx) = flow();

        flow.apply(FlowEvent::FinalizedOrder(
            "✅ Client 1: [{'item': 'Soft Drink', 'quantity': 2}, {'item': 'burger', 'quantity': 1}]"
                .into(),
        ))
        .await;

        let snapshot = flow.snapshot();
        assert_eq!(snapshot.stage, Stage::Complete);
        assert_eq!(snapshot.lines.len(), 2);
        assert_eq!(snapshot.lines[0].item.id, "drink");
        assert_eq!(snapshot.lines[0].quantity, 2);
        assert_eq!(snapshot.lines[1].item.id, "burger");
        assert_eq!(snapshot.client.as_deref(), Some("Client 1"));
        assert!(!snapshot.replaying);
        assert_totals_consistent(&snapshot);
    }

    #[tokio::test]
    async fn test_unparseable_finalized_order_is_a_no_op() {
        let (mut flow, _rx) = flow();

        flow.apply(FlowEvent::FinalizedOrder("garbage, no brackets".into()))
            .await;

        assert_eq!(flow.stage(), Stage::Menu);
        assert!(flow.snapshot().lines.is_empty());
    }

    #[tokio::test]
    async fn test_new_order_resets_everything() {
        let (mut flow, _rx) = flow();

        // Only valid once complete
        flow.apply(FlowEvent::NewOrder).await;
        assert_eq!(flow.stage(), Stage::Menu);

        flow.apply(FlowEvent::FinalizedOrder(
            "✅ Client 9: [{'item': 'French Fries', 'quantity': 3}]".into(),
        ))
        .await;
        assert_eq!(flow.stage(), Stage::Complete);

        flow.apply(FlowEvent::NewOrder).await;
        let snapshot = flow.snapshot();
        assert_eq!(snapshot.stage, Stage::Menu);
        assert!(snapshot.lines.is_empty());
        assert!(snapshot.client.is_none());
        assert!((snapshot.total - 0.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_handle_serializes_events() {
        let (flow, rx) = flow();
        let (handle, task) = spawn(flow);

        handle.on_command("D").await.unwrap();
        handle.on_command("3").await.unwrap();
        handle.on_command("FINISH").await.unwrap();

        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.stage, Stage::Complete);
        assert_eq!(snapshot.lines.len(), 1);
        assert_eq!(snapshot.lines[0].item.id, "drink");
        assert_eq!(snapshot.lines[0].quantity, 3);

        drop(handle);
        task.await.unwrap();
    }
}
