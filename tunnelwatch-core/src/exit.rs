//! Exit worker: lets vehicles out and frees capacity.
//!
//! Exits are suppressed while an alert is active so the alert response has
//! sole control over the count, and while the operator has paused traffic.

use crate::entry::{transit_delay, Flow};
use crate::random::RandomSource;
use crate::shutdown::ShutdownGuard;
use crate::state::SharedTunnel;

/// Releases vehicles through the capacity gate.
pub struct ExitWorker {
    state: SharedTunnel,
    rng: Box<dyn RandomSource>,
    shutdown: ShutdownGuard,
}

impl ExitWorker {
    /// Create an exit worker.
    pub fn new(state: SharedTunnel, rng: Box<dyn RandomSource>, shutdown: ShutdownGuard) -> Self {
        Self { state, rng, shutdown }
    }

    /// Cycle until shutdown.
    pub async fn run(mut self) {
        tracing::info!("Exit worker started");
        while self.cycle().await == Flow::Continue {}
        tracing::info!("Exit worker stopped");
    }

    /// Let at most one vehicle out, then wait out the transit spacing and
    /// any pause.
    pub async fn cycle(&mut self) -> Flow {
        let state = &self.state;
        let Some(released) = self.shutdown.guard(state.gate().release_if(|| state.flow_open())).await else {
            return Flow::Stop;
        };
        if let Some(cars) = released {
            if self.state.output_enabled() {
                tracing::info!(cars, "Car exited. Cars in tunnel: {}", cars);
            }
        }

        let delay = transit_delay(&self.state, self.rng.as_mut());
        if !self.shutdown.sleep(delay).await {
            return Flow::Stop;
        }
        if self.shutdown.guard(self.state.resumed()).await.is_none() {
            return Flow::Stop;
        }
        Flow::Continue
    }
}
