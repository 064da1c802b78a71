//! Environmental readings.

use std::fmt;

use tokio::sync::Mutex;

/// Hazards monitored inside the tunnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Smoke density.
    Smoke,
    /// Natural gas concentration.
    NaturalGas,
}

impl SensorKind {
    /// Both monitored hazards, in mitigation priority order.
    pub const ALL: [SensorKind; 2] = [SensorKind::Smoke, SensorKind::NaturalGas];

    /// Short name used in logs and worker names.
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Smoke => "smoke",
            SensorKind::NaturalGas => "natural-gas",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Smoke => write!(f, "Smoke"),
            SensorKind::NaturalGas => write!(f, "Natural gas"),
        }
    }
}

/// One hazard reading, guarded on its own.
#[derive(Debug)]
pub struct Sensor {
    kind: SensorKind,
    threshold: f64,
    level: Mutex<f64>,
}

impl Sensor {
    /// Create a sensor reading zero.
    pub fn new(kind: SensorKind, threshold: f64) -> Self {
        Self {
            kind,
            threshold,
            level: Mutex::new(0.0),
        }
    }

    /// Which hazard this sensor measures.
    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Level above which the reading is hazardous.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Current reading.
    pub async fn level(&self) -> f64 {
        *self.level.lock().await
    }

    /// Overwrite the reading.
    pub async fn set_level(&self, level: f64) {
        *self.level.lock().await = level;
    }

    /// Whether the current reading is above the threshold.
    pub async fn is_hazardous(&self) -> bool {
        self.level().await > self.threshold
    }

    /// Lower the reading by `amount` and return the new value.
    pub async fn decay(&self, amount: f64) -> f64 {
        let mut level = self.level.lock().await;
        *level -= amount;
        *level
    }

    /// Run `f` with exclusive access to the reading.
    pub(crate) async fn with_level<R>(&self, f: impl FnOnce(&mut f64) -> R) -> R {
        let mut level = self.level.lock().await;
        f(&mut level)
    }
}
