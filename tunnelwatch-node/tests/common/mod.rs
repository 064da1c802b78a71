//! Shared test helpers for tunnelwatch-node integration tests.

#![allow(dead_code)]

use std::time::Duration;

use tokio::time::{sleep, Instant};

use tunnelwatch_core::TunnelConfig;
use tunnelwatch_node::config::NodeConfig;

/// Node configuration with fast timings and a fixed seed.
///
/// The threshold sits above the largest possible sample, so only injected
/// readings raise an alert.
pub fn fast_node_config(capacity: u32) -> NodeConfig {
    NodeConfig {
        tunnel: TunnelConfig::new(capacity)
            .with_hazard_threshold(99.95)
            .with_time_unit(Duration::from_millis(10))
            .with_decay_interval(Duration::from_millis(5))
            .with_output_enabled(false),
        seed: Some(7),
        log_level: "warn".to_string(),
    }
}

/// Poll `condition` until it holds or `timeout_ms` elapses.
pub async fn wait_for<F, Fut>(timeout_ms: u64, poll_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = Instant::now();
    let timeout_duration = Duration::from_millis(timeout_ms);
    let poll_duration = Duration::from_millis(poll_ms);

    loop {
        if condition().await {
            return true;
        }
        if start.elapsed() > timeout_duration {
            return false;
        }
        sleep(poll_duration).await;
    }
}
