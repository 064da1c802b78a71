//! Environmental monitors.
//!
//! One monitor per hazard. Each samples its own reading once per time unit
//! and raises the shared alert when the reading crosses the threshold. While
//! an alert is being handled, or while the operator has paused the tunnel,
//! the reading is left untouched but still checked. A reading that is
//! already above the threshold is evidence and is never overwritten by a
//! fresh sample, so an injected value raises the alert on the next cycle.

use crate::random::RandomSource;
use crate::sensor::SensorKind;
use crate::shutdown::ShutdownGuard;
use crate::state::SharedTunnel;

/// Result of one monitor cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Reading after the cycle.
    pub level: f64,
    /// Whether a fresh value was drawn this cycle.
    pub sampled: bool,
    /// Whether this cycle raised the alert (it was not already raised).
    pub raised_alert: bool,
}

/// Periodic sampler for one hazard.
pub struct EnvironmentalMonitor {
    kind: SensorKind,
    state: SharedTunnel,
    rng: Box<dyn RandomSource>,
    shutdown: ShutdownGuard,
}

impl EnvironmentalMonitor {
    /// Create a monitor for `kind`.
    pub fn new(
        kind: SensorKind,
        state: SharedTunnel,
        rng: Box<dyn RandomSource>,
        shutdown: ShutdownGuard,
    ) -> Self {
        Self {
            kind,
            state,
            rng,
            shutdown,
        }
    }

    /// Sample until shutdown.
    pub async fn run(mut self) {
        tracing::info!(sensor = self.kind.as_str(), "Monitor started");

        let period = self.state.config().time_unit;
        loop {
            let cycle = sample_once(&self.state, self.kind, self.rng.as_mut());
            if self.shutdown.guard(cycle).await.is_none() {
                break;
            }
            if !self.shutdown.sleep(period).await {
                break;
            }
        }

        tracing::info!(sensor = self.kind.as_str(), "Monitor stopped");
    }
}

/// Run one monitor cycle for `kind`.
pub async fn sample_once(state: &SharedTunnel, kind: SensorKind, rng: &mut dyn RandomSource) -> Sample {
    let sensor = state.sensor(kind);
    let threshold = sensor.threshold();
    let resolution = state.config().reading_resolution;
    let flow_open = state.flow_open();

    let (level, sampled) = sensor
        .with_level(|level| {
            let sampled = flow_open && *level <= threshold;
            if sampled {
                *level = f64::from(rng.gen_range(0, resolution)) / 10.0;
            }
            (*level, sampled)
        })
        .await;

    if sampled && state.output_enabled() {
        tracing::info!(sensor = kind.as_str(), level = format_args!("{:.1}", level), "Measured {} level", kind);
    }

    let raised_alert = level > threshold && state.raise_alert();
    if raised_alert {
        tracing::warn!(
            sensor = kind.as_str(),
            level = format_args!("{:.1}", level),
            threshold,
            "Hazard threshold exceeded, alert raised"
        );
    }

    Sample {
        level,
        sampled,
        raised_alert,
    }
}
