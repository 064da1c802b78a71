//! Shared test helpers for tunnelwatch-core integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use tunnelwatch_core::{RandomSource, SharedTunnel, TunnelConfig, TunnelState};

/// Random source that replays a script, then repeats a fallback value.
///
/// Every value is clamped into the requested range.
pub struct ScriptedRandom {
    script: VecDeque<u32>,
    fallback: u32,
}

impl ScriptedRandom {
    /// Replay `script`, then return `fallback` forever.
    pub fn new(script: impl IntoIterator<Item = u32>, fallback: u32) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback,
        }
    }

    /// Always return `value`.
    pub fn constant(value: u32) -> Self {
        Self::new([], value)
    }

    /// Boxed for handing to a worker.
    pub fn boxed(self) -> Box<dyn RandomSource> {
        Box::new(self)
    }
}

impl RandomSource for ScriptedRandom {
    fn gen_range(&mut self, low: u32, high: u32) -> u32 {
        let value = self.script.pop_front().unwrap_or(self.fallback);
        value.clamp(low, high - 1)
    }
}

/// Fast timings: 10 ms time unit, 5 ms decay steps.
pub fn fast_config(capacity: u32) -> TunnelConfig {
    TunnelConfig::new(capacity)
        .with_time_unit(Duration::from_millis(10))
        .with_decay_interval(Duration::from_millis(5))
}

/// Shared state with fast timings.
pub fn fast_state(capacity: u32) -> SharedTunnel {
    TunnelState::shared(fast_config(capacity))
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
