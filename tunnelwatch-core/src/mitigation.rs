//! Alert response.
//!
//! Runs on the entry worker while an alert is active. A hazardous reading
//! is driven down by strictly positive random steps until it reaches zero,
//! then the tunnel is evacuated. An alert with no hazardous reading behind
//! it (raised by the operator) is held until someone clears it.

use crate::random::RandomSource;
use crate::sensor::SensorKind;
use crate::shutdown::ShutdownGuard;
use crate::state::SharedTunnel;

/// How an alert was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MitigationOutcome {
    /// A hazardous reading was decayed to zero and the tunnel evacuated.
    Suppressed {
        /// The hazard that was handled.
        hazard: SensorKind,
        /// Decay steps taken.
        steps: u32,
    },
    /// No reading was hazardous; the alert was cleared externally.
    ClearedExternally,
    /// Shutdown arrived before the response finished.
    Interrupted,
}

/// Handle the active alert and clear it.
///
/// Smoke takes priority over natural gas. The alert is cleared on every
/// completed branch; an interrupted response leaves state as it is.
pub async fn respond_to_alert(
    state: &SharedTunnel,
    rng: &mut dyn RandomSource,
    shutdown: &mut ShutdownGuard,
) -> MitigationOutcome {
    let mut hazard = None;
    for kind in SensorKind::ALL {
        if state.sensor(kind).is_hazardous().await {
            hazard = Some(kind);
            break;
        }
    }

    let outcome = match hazard {
        Some(kind) => {
            announce(kind);
            let Some(steps) = decay_to_zero(state, kind, rng, shutdown).await else {
                return MitigationOutcome::Interrupted;
            };
            state.gate().reset().await;
            tracing::info!(
                hazard = kind.as_str(),
                steps,
                "{} cleared, tunnel evacuated. Resuming normal activity",
                kind
            );
            MitigationOutcome::Suppressed { hazard: kind, steps }
        }
        None => {
            tracing::warn!("Alert flag set by operator. Turning ventilation system to 100%");
            tracing::warn!("Playing alarm sound");
            if shutdown.guard(state.alert_cleared()).await.is_none() {
                return MitigationOutcome::Interrupted;
            }
            tracing::info!("Alert cleared by operator");
            MitigationOutcome::ClearedExternally
        }
    };

    state.clear_alert();
    outcome
}

fn announce(kind: SensorKind) {
    match kind {
        SensorKind::Smoke => {
            tracing::warn!("Smoke detected. Turning sprinkler system on and ventilation to 100%");
        }
        SensorKind::NaturalGas => {
            tracing::warn!("Natural gas detected. Turning ventilation system to 100%");
            tracing::warn!("Playing alarm sound");
        }
    }
    tracing::warn!("Operator has been alerted");
}

/// Amount removed by one decay step, always in `1..=max_step`.
pub fn decay_step(rng: &mut dyn RandomSource, max_step: u32) -> f64 {
    f64::from(rng.gen_range(1, max_step.clamp(1, u32::MAX - 1) + 1))
}

/// Upper bound on the number of decay steps needed to clear `level`.
pub fn max_decay_steps(level: f64) -> u32 {
    if level <= 0.0 {
        0
    } else {
        level.ceil() as u32
    }
}

/// Decay the reading of `kind` until it is at or below zero.
///
/// Returns the number of steps taken, or `None` on shutdown. The reading may
/// also be lowered concurrently (operator reset), which ends the loop early.
async fn decay_to_zero(
    state: &SharedTunnel,
    kind: SensorKind,
    rng: &mut dyn RandomSource,
    shutdown: &mut ShutdownGuard,
) -> Option<u32> {
    let sensor = state.sensor(kind);
    let interval = state.config().decay_interval;
    let max_step = state.config().max_decay_step;

    let mut steps = 0;
    loop {
        let level = sensor.level().await;
        if level <= 0.0 {
            return Some(steps);
        }
        tracing::info!(hazard = kind.as_str(), level = format_args!("{:.1}", level), "{} level", kind);

        sensor.decay(decay_step(rng, max_step)).await;
        steps += 1;

        if !shutdown.sleep(interval).await {
            return None;
        }
    }
}
