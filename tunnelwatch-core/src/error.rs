//! Error types for the tunnel coordinator.
//!
//! Only start-up problems and operator typos are errors. Hazards, a full
//! tunnel and an operator pause are ordinary state transitions and never
//! surface here.

use thiserror::Error;

/// Top-level error type for tunnelwatch-core operations.
#[derive(Debug, Error)]
pub enum TunnelError {
    /// The tunnel configuration was rejected.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A worker could not be started.
    #[error("Failed to start worker {worker}: {reason}")]
    WorkerSpawn {
        /// Worker name.
        worker: String,
        /// Why it failed.
        reason: String,
    },
}

/// Reasons a [`TunnelConfig`](crate::config::TunnelConfig) is rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Capacity must admit at least one vehicle.
    #[error("capacity must be at least 1")]
    ZeroCapacity,

    /// Hazard threshold must be a finite positive number.
    #[error("hazard threshold must be finite and positive, got {0}")]
    InvalidThreshold(f64),

    /// Transit delay bounds are zero or inverted.
    #[error("transit units must satisfy 1 <= min ({min}) <= max ({max})")]
    InvalidTransitRange {
        /// Shortest delay.
        min: u32,
        /// Longest delay.
        max: u32,
    },

    /// A decay step must remove something.
    #[error("max decay step must be at least 1")]
    ZeroDecayStep,

    /// The decay step range `1..=max` must fit in a `u32` draw.
    #[error("max decay step {0} is too large")]
    DecayStepTooLarge(u32),

    /// The longest transit delay does not fit in a `Duration`.
    #[error("max transit of {0} time units is too long")]
    TransitTooLong(u32),

    /// Sensor resolution must be non-zero.
    #[error("reading resolution must be at least 1")]
    ZeroResolution,

    /// A timing parameter was zero.
    #[error("{0} must be non-zero")]
    ZeroDuration(&'static str),
}

/// An operator keystroke that does not map to any command.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The key is not bound to a command.
    #[error("Unrecognized command key {0:?}")]
    Unrecognized(char),
}

/// Result type for tunnel operations.
pub type TunnelResult<T> = Result<T, TunnelError>;
