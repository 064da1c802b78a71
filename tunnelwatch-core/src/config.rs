//! Tunnel configuration.

use std::time::Duration;

use crate::error::ConfigError;

/// Default maximum number of vehicles inside the tunnel.
pub const DEFAULT_CAPACITY: u32 = 5;

/// Default reading above which a hazard alert is raised.
pub const DEFAULT_HAZARD_THRESHOLD: f64 = 95.0;

/// Default time unit (monitor period, transit delay unit).
pub const DEFAULT_TIME_UNIT: Duration = Duration::from_secs(1);

/// Default shortest transit delay, in time units.
pub const DEFAULT_MIN_TRANSIT_UNITS: u32 = 1;

/// Default longest transit delay, in time units.
pub const DEFAULT_MAX_TRANSIT_UNITS: u32 = 3;

/// Default pause between two mitigation decay steps.
pub const DEFAULT_DECAY_INTERVAL: Duration = Duration::from_millis(500);

/// Default largest amount removed by one decay step.
pub const DEFAULT_MAX_DECAY_STEP: u32 = 29;

/// Default sensor resolution: samples are `n / 10` for `n` below this.
pub const DEFAULT_READING_RESOLUTION: u32 = 1000;

/// Reading written by the inject-smoke and inject-gas commands.
pub const DEFAULT_INJECTED_LEVEL: f64 = 100.0;

/// Occupancy written by the inject-occupancy command.
pub const DEFAULT_INJECTED_OCCUPANCY: u32 = 10;

/// Configuration for the tunnel coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct TunnelConfig {
    /// Maximum permitted occupancy.
    pub capacity: u32,

    /// A reading strictly above this raises the alert.
    pub hazard_threshold: f64,

    /// Monitor sample period and the unit of transit delays.
    pub time_unit: Duration,

    /// Shortest entry/exit cooldown, in time units.
    pub min_transit_units: u32,

    /// Longest entry/exit cooldown, in time units (inclusive).
    pub max_transit_units: u32,

    /// Pause between two mitigation decay steps.
    pub decay_interval: Duration,

    /// Largest amount one decay step removes. The smallest is always 1.
    pub max_decay_step: u32,

    /// Samples are drawn as `n / 10.0` with `n` in `0..reading_resolution`.
    pub reading_resolution: u32,

    /// Reading written by inject-smoke / inject-gas.
    pub injected_level: f64,

    /// Occupancy written by inject-occupancy.
    pub injected_occupancy: u32,

    /// Initial state of the diagnostic output switch.
    pub output_enabled: bool,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            hazard_threshold: DEFAULT_HAZARD_THRESHOLD,
            time_unit: DEFAULT_TIME_UNIT,
            min_transit_units: DEFAULT_MIN_TRANSIT_UNITS,
            max_transit_units: DEFAULT_MAX_TRANSIT_UNITS,
            decay_interval: DEFAULT_DECAY_INTERVAL,
            max_decay_step: DEFAULT_MAX_DECAY_STEP,
            reading_resolution: DEFAULT_READING_RESOLUTION,
            injected_level: DEFAULT_INJECTED_LEVEL,
            injected_occupancy: DEFAULT_INJECTED_OCCUPANCY,
            output_enabled: true,
        }
    }
}

impl TunnelConfig {
    /// Create a configuration with the given capacity and defaults elsewhere.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Set the tunnel capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the hazard threshold shared by both monitors.
    pub fn with_hazard_threshold(mut self, threshold: f64) -> Self {
        self.hazard_threshold = threshold;
        self
    }

    /// Set the time unit.
    pub fn with_time_unit(mut self, unit: Duration) -> Self {
        self.time_unit = unit;
        self
    }

    /// Set the transit delay bounds, in time units.
    pub fn with_transit_units(mut self, min: u32, max: u32) -> Self {
        self.min_transit_units = min;
        self.max_transit_units = max;
        self
    }

    /// Set the pause between mitigation decay steps.
    pub fn with_decay_interval(mut self, interval: Duration) -> Self {
        self.decay_interval = interval;
        self
    }

    /// Set the largest decay step.
    pub fn with_max_decay_step(mut self, step: u32) -> Self {
        self.max_decay_step = step;
        self
    }

    /// Set the initial diagnostic output state.
    pub fn with_output_enabled(mut self, enabled: bool) -> Self {
        self.output_enabled = enabled;
        self
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if !self.hazard_threshold.is_finite() || self.hazard_threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.hazard_threshold));
        }
        if self.min_transit_units == 0 || self.min_transit_units > self.max_transit_units {
            return Err(ConfigError::InvalidTransitRange {
                min: self.min_transit_units,
                max: self.max_transit_units,
            });
        }
        if self.max_decay_step == 0 {
            return Err(ConfigError::ZeroDecayStep);
        }
        if self.max_decay_step == u32::MAX {
            return Err(ConfigError::DecayStepTooLarge(self.max_decay_step));
        }
        if self.max_transit_units == u32::MAX
            || self.time_unit.checked_mul(self.max_transit_units).is_none()
        {
            return Err(ConfigError::TransitTooLong(self.max_transit_units));
        }
        if self.reading_resolution == 0 {
            return Err(ConfigError::ZeroResolution);
        }
        if self.time_unit.is_zero() {
            return Err(ConfigError::ZeroDuration("time unit"));
        }
        if self.decay_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("decay interval"));
        }
        Ok(())
    }
}
