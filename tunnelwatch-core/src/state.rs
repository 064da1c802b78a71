//! Shared tunnel state.
//!
//! Every field has its own guard and no operation holds two of them at
//! once. Occupancy lives in the [`CapacityGate`], each reading in its own
//! [`Sensor`], and the alert and pause flags in watch channels so waiters
//! wake as soon as the flag flips.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::config::TunnelConfig;
use crate::gate::CapacityGate;
use crate::sensor::{Sensor, SensorKind};

/// Shared handle to the tunnel state.
pub type SharedTunnel = Arc<TunnelState>;

/// All process-wide tunnel state.
#[derive(Debug)]
pub struct TunnelState {
    /// Tunnel configuration.
    config: TunnelConfig,
    /// Occupancy and its capacity gate.
    gate: CapacityGate,
    /// Smoke reading.
    smoke: Sensor,
    /// Natural gas reading.
    gas: Sensor,
    /// Hazard alert flag.
    alert: watch::Sender<bool>,
    /// Operator pause flag.
    paused: watch::Sender<bool>,
    /// Diagnostic output switch.
    output: AtomicBool,
}

impl TunnelState {
    /// Create the initial state: empty tunnel, zero readings, no alert, not paused.
    pub fn new(config: TunnelConfig) -> Self {
        let (alert, _) = watch::channel(false);
        let (paused, _) = watch::channel(false);

        Self {
            gate: CapacityGate::new(config.capacity),
            smoke: Sensor::new(SensorKind::Smoke, config.hazard_threshold),
            gas: Sensor::new(SensorKind::NaturalGas, config.hazard_threshold),
            alert,
            paused,
            output: AtomicBool::new(config.output_enabled),
            config,
        }
    }

    /// Create the state behind an [`Arc`].
    pub fn shared(config: TunnelConfig) -> SharedTunnel {
        Arc::new(Self::new(config))
    }

    /// Tunnel configuration.
    pub fn config(&self) -> &TunnelConfig {
        &self.config
    }

    /// Occupancy gate.
    pub fn gate(&self) -> &CapacityGate {
        &self.gate
    }

    /// Sensor for the given hazard.
    pub fn sensor(&self, kind: SensorKind) -> &Sensor {
        match kind {
            SensorKind::Smoke => &self.smoke,
            SensorKind::NaturalGas => &self.gas,
        }
    }

    // ------------------------------------------------------------------
    // Alert
    // ------------------------------------------------------------------

    /// Whether an alert is active.
    pub fn alert_active(&self) -> bool {
        *self.alert.borrow()
    }

    /// Raise the alert. Returns `true` if it was not already raised.
    ///
    /// An entry blocked on a full tunnel is woken so it can respond.
    pub fn raise_alert(&self) -> bool {
        let raised = self.alert.send_if_modified(|alert| !std::mem::replace(alert, true));
        if raised {
            self.gate.wake_waiters();
        }
        raised
    }

    /// Clear the alert. Returns `true` if it was raised.
    pub fn clear_alert(&self) -> bool {
        self.alert.send_if_modified(|alert| std::mem::replace(alert, false))
    }

    /// Flip the alert and return its new value.
    pub fn toggle_alert(&self) -> bool {
        let mut now = false;
        self.alert.send_modify(|alert| {
            *alert = !*alert;
            now = *alert;
        });
        if now {
            self.gate.wake_waiters();
        }
        now
    }

    /// Wait until no alert is active.
    pub async fn alert_cleared(&self) {
        let mut rx = self.alert.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|alert| !*alert).await;
    }

    // ------------------------------------------------------------------
    // Pause
    // ------------------------------------------------------------------

    /// Whether the operator has paused traffic.
    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    /// Pause traffic. Returns `true` if it was running.
    pub fn pause(&self) -> bool {
        let paused = self.paused.send_if_modified(|paused| !std::mem::replace(paused, true));
        if paused {
            self.gate.wake_waiters();
        }
        paused
    }

    /// Resume traffic. Returns `true` if it was paused.
    pub fn resume(&self) -> bool {
        self.paused.send_if_modified(|paused| std::mem::replace(paused, false))
    }

    /// Wait until traffic is not paused.
    pub async fn resumed(&self) {
        let mut rx = self.paused.subscribe();
        let _ = rx.wait_for(|paused| !*paused).await;
    }

    /// Vehicles may move: no alert and not paused.
    pub fn flow_open(&self) -> bool {
        !self.alert_active() && !self.is_paused()
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Whether diagnostic events are emitted.
    pub fn output_enabled(&self) -> bool {
        self.output.load(Ordering::Relaxed)
    }

    /// Flip diagnostic output and return its new value.
    pub fn toggle_output(&self) -> bool {
        !self.output.fetch_xor(true, Ordering::Relaxed)
    }

    // ------------------------------------------------------------------
    // Whole-state operations
    // ------------------------------------------------------------------

    /// Return to the initial values without touching pause or output.
    ///
    /// The alert is cleared last, after the readings are zero, so a monitor
    /// cannot re-raise it from a stale hazardous reading.
    pub async fn reset(&self) {
        for kind in SensorKind::ALL {
            self.sensor(kind).set_level(0.0).await;
        }
        self.gate.reset().await;
        self.clear_alert();
    }

    /// Read every field. Each field is individually consistent.
    pub async fn snapshot(&self) -> TunnelSnapshot {
        TunnelSnapshot {
            occupancy: self.gate.occupancy().await,
            capacity: self.gate.capacity(),
            smoke: self.smoke.level().await,
            natural_gas: self.gas.level().await,
            alert: self.alert_active(),
            paused: self.is_paused(),
            output_enabled: self.output_enabled(),
        }
    }
}

/// Point-in-time copy of the tunnel state.
#[derive(Debug, Clone, PartialEq)]
pub struct TunnelSnapshot {
    /// Vehicles inside.
    pub occupancy: u32,
    /// Maximum permitted occupancy.
    pub capacity: u32,
    /// Smoke reading.
    pub smoke: f64,
    /// Natural gas reading.
    pub natural_gas: f64,
    /// Alert flag.
    pub alert: bool,
    /// Pause flag.
    pub paused: bool,
    /// Output flag.
    pub output_enabled: bool,
}

impl fmt::Display for TunnelSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cars in tunnel: {}/{}", self.occupancy, self.capacity)?;
        writeln!(f, "Smoke level: {:.1}", self.smoke)?;
        writeln!(f, "Natural gas level: {:.1}", self.natural_gas)?;
        writeln!(f, "Alert flag: {}", u8::from(self.alert))?;
        writeln!(f, "Pause flag: {}", u8::from(self.paused))?;
        write!(f, "Output flag: {}", u8::from(self.output_enabled))
    }
}
