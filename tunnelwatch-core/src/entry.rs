//! Entry worker: admits vehicles and handles alerts.
//!
//! One cycle walks `Idle -> CheckAlert -> (Mitigating) -> WaitForCapacity ->
//! Admitted -> Cooldown`. Pause is honoured at the cycle boundary. Every
//! wait is raced against shutdown.

use crate::mitigation::{respond_to_alert, MitigationOutcome};
use crate::random::RandomSource;
use crate::shutdown::ShutdownGuard;
use crate::state::SharedTunnel;

/// Position of the entry worker within its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPhase {
    /// Between cycles; waits here while paused.
    Idle,
    /// Looking at the alert flag.
    CheckAlert,
    /// Running the alert response.
    Mitigating,
    /// Blocked on the capacity gate.
    WaitForCapacity,
    /// A vehicle was admitted.
    Admitted,
    /// Transit spacing before the next vehicle.
    Cooldown,
}

/// Whether the worker should keep cycling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Run another cycle.
    Continue,
    /// Shutdown was requested.
    Stop,
}

/// Admits vehicles through the capacity gate.
pub struct EntryWorker {
    state: SharedTunnel,
    rng: Box<dyn RandomSource>,
    shutdown: ShutdownGuard,
    phase: EntryPhase,
    last_mitigation: Option<MitigationOutcome>,
}

impl EntryWorker {
    /// Create an entry worker.
    pub fn new(state: SharedTunnel, rng: Box<dyn RandomSource>, shutdown: ShutdownGuard) -> Self {
        Self {
            state,
            rng,
            shutdown,
            phase: EntryPhase::Idle,
            last_mitigation: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> EntryPhase {
        self.phase
    }

    /// Outcome of the most recent alert response, if any ran.
    pub fn last_mitigation(&self) -> Option<MitigationOutcome> {
        self.last_mitigation
    }

    /// Cycle until shutdown.
    pub async fn run(mut self) {
        tracing::info!("Entry worker started");
        while self.cycle().await == Flow::Continue {}
        tracing::info!("Entry worker stopped");
    }

    /// Run one full admission cycle.
    pub async fn cycle(&mut self) -> Flow {
        self.enter(EntryPhase::Idle);
        if self.shutdown.guard(self.state.resumed()).await.is_none() {
            return Flow::Stop;
        }

        self.enter(EntryPhase::CheckAlert);
        if self.state.alert_active() {
            self.enter(EntryPhase::Mitigating);
            let outcome = respond_to_alert(&self.state, self.rng.as_mut(), &mut self.shutdown).await;
            self.last_mitigation = Some(outcome);
            if outcome == MitigationOutcome::Interrupted {
                return Flow::Stop;
            }
        }

        self.enter(EntryPhase::WaitForCapacity);
        let state = &self.state;
        let Some(admitted) = self.shutdown.guard(state.gate().admit_if(|| state.flow_open())).await else {
            return Flow::Stop;
        };

        // Refused: an alert or a pause closed the flow while waiting. The
        // next cycle handles it.
        let Some(cars) = admitted else {
            return Flow::Continue;
        };
        self.enter(EntryPhase::Admitted);
        if self.state.output_enabled() {
            tracing::info!(cars, "Car entered. Cars in tunnel: {}", cars);
        }

        self.enter(EntryPhase::Cooldown);
        let delay = transit_delay(&self.state, self.rng.as_mut());
        if !self.shutdown.sleep(delay).await {
            return Flow::Stop;
        }
        Flow::Continue
    }

    fn enter(&mut self, phase: EntryPhase) {
        tracing::trace!(from = ?self.phase, to = ?phase, "Entry phase");
        self.phase = phase;
    }
}

/// Draw a transit spacing from the configured bounds.
pub(crate) fn transit_delay(state: &SharedTunnel, rng: &mut dyn RandomSource) -> std::time::Duration {
    let config = state.config();
    let units = rng.gen_range(config.min_transit_units, config.max_transit_units.saturating_add(1));
    config.time_unit.saturating_mul(units)
}
