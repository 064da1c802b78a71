//! Acceptance tests for tunnelwatch-node.
//!
//! Each test runs a whole node on a paused clock and drives it through its
//! operator channel, the way the stdin reader would.

mod common;

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use common::{fast_node_config, wait_for};
use tunnelwatch_core::{SensorKind, SharedTunnel};
use tunnelwatch_node::config::NodeConfig;
use tunnelwatch_node::node::Node;

struct RunningNode {
    state: SharedTunnel,
    keys: mpsc::Sender<char>,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl RunningNode {
    fn start(config: NodeConfig) -> Self {
        let node = Node::new(config).unwrap();
        let state = node.state().clone();
        let (keys, key_rx) = mpsc::channel(16);
        let (stop, stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let signal = async {
                let _ = stop_rx.await;
            };
            node.run_with_input(key_rx, signal).await
        });

        Self {
            state,
            keys,
            stop: Some(stop),
            handle,
        }
    }

    async fn press(&self, key: char) {
        self.keys.send(key).await.unwrap();
        // Let the console apply it
        sleep(Duration::from_millis(1)).await;
    }

    fn signal(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    async fn join(self) -> anyhow::Result<()> {
        timeout(Duration::from_secs(5), self.handle).await.unwrap().unwrap()
    }
}

// ============================================================================
// Criterion 1: Traffic flows and quit stops every worker cleanly
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_traffic_flows_until_quit() {
    let node = RunningNode::start(fast_node_config(5));

    let flowing = wait_for(1000, 5, || async {
        node.state.gate().admissions() > 0 && node.state.gate().releases() > 0
    })
    .await;
    assert!(flowing, "entry and exit workers should move traffic");
    assert!(node.state.gate().occupancy().await <= 5);

    node.press('q').await;
    node.join().await.unwrap();
}

// ============================================================================
// Criterion 2: Pause and continue from the console
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_pause_and_continue_keys() {
    let node = RunningNode::start(fast_node_config(5));

    node.press('p').await;
    assert!(node.state.is_paused());
    let admitted = node.state.gate().admissions();

    sleep(Duration::from_secs(5)).await;
    assert_eq!(node.state.gate().admissions(), admitted);

    node.press('c').await;
    assert!(!node.state.is_paused());
    let resumed = wait_for(500, 5, || async { node.state.gate().admissions() > admitted }).await;
    assert!(resumed);

    node.press('q').await;
    node.join().await.unwrap();
}

// ============================================================================
// Criterion 3: Injected smoke is detected and mitigated
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_injected_smoke_alert_is_cleared() {
    let node = RunningNode::start(fast_node_config(5));

    node.press('1').await;
    let raised = wait_for(50, 1, || async { node.state.alert_active() }).await;
    assert!(raised, "smoke monitor should raise the alert");

    // 100.0 takes at most 100 decay steps of 5 ms
    let cleared = wait_for(1000, 1, || async { !node.state.alert_active() }).await;
    assert!(cleared, "entry worker should clear the alert");
    assert!(node.state.sensor(SensorKind::Smoke).level().await < 100.0);

    node.press('q').await;
    node.join().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_smoke_on_overfull_tunnel_is_cleared() {
    let node = RunningNode::start(fast_node_config(5));
    sleep(Duration::from_millis(50)).await;

    node.press('3').await;
    node.press('1').await;
    let raised = wait_for(50, 1, || async { node.state.alert_active() }).await;
    assert!(raised, "smoke monitor should raise the alert");

    let cleared = wait_for(1000, 1, || async { !node.state.alert_active() }).await;
    assert!(cleared, "alert on an overfull tunnel should still be mitigated");
    assert!(node.state.gate().occupancy().await <= 1);

    node.press('q').await;
    node.join().await.unwrap();
}

// ============================================================================
// Criterion 4: Reset and invalid keys
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_reset_and_invalid_keys() {
    let node = RunningNode::start(fast_node_config(5));

    node.press('p').await;
    node.press('3').await;
    assert_eq!(node.state.gate().occupancy().await, 10);

    let before = node.state.snapshot().await;
    node.press('z').await;
    node.press('\n').await;
    assert_eq!(node.state.snapshot().await, before);

    node.press('r').await;
    let after = node.state.snapshot().await;
    assert_eq!(after.occupancy, 0);
    assert_eq!(after.smoke, 0.0);
    assert_eq!(after.natural_gas, 0.0);
    assert!(!after.alert);
    assert!(after.paused, "reset leaves the pause in place");

    node.press('q').await;
    node.join().await.unwrap();
}

// ============================================================================
// Criterion 5: Closed input keeps the tunnel running until a signal
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_signal_stops_node_after_input_closes() {
    let mut node = RunningNode::start(fast_node_config(5));
    let (closed, _) = mpsc::channel(1);
    drop(std::mem::replace(&mut node.keys, closed));

    sleep(Duration::from_secs(2)).await;
    assert!(!node.handle.is_finished());
    assert!(node.state.gate().admissions() > 0);

    node.signal();
    node.join().await.unwrap();
}

// ============================================================================
// Criterion 6: Invalid configuration never starts a worker
// ============================================================================

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = fast_node_config(5);
    config.tunnel.max_decay_step = 0;

    let err = Node::new(config).err().expect("zero decay step must be rejected");
    assert!(err.to_string().contains("decay step"));
}
