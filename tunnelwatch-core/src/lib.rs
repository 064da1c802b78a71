//! # Tunnelwatch Core
//!
//! Concurrent coordinator for an operated road tunnel.
//!
//! This crate provides the shared state and workers of the tunnel monitor:
//! - Bounded-capacity occupancy gate with blocking admission
//! - Smoke and natural gas monitors that raise a shared alert
//! - Entry worker with the alert-response (mitigation) procedure
//! - Exit worker suppressed during alerts
//! - Operator command surface (pause, resume, reset, inject, query, quit)
//! - Shutdown signalling and a supervised worker group

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod control;
pub mod entry;
pub mod error;
pub mod exit;
pub mod gate;
pub mod mitigation;
pub mod monitor;
pub mod random;
pub mod sensor;
pub mod shutdown;
pub mod state;
pub mod supervisor;

// Re-export commonly used types at crate root
pub use config::TunnelConfig;
pub use control::{Command, ControlPlane, Reply};
pub use entry::{EntryPhase, EntryWorker, Flow};
pub use error::{CommandError, ConfigError, TunnelError, TunnelResult};
pub use exit::ExitWorker;
pub use gate::CapacityGate;
pub use mitigation::{respond_to_alert, MitigationOutcome};
pub use monitor::{sample_once, EnvironmentalMonitor, Sample};
pub use random::{RandomSource, SeededRandom};
pub use sensor::{Sensor, SensorKind};
pub use shutdown::{shutdown_channel, ShutdownGuard, ShutdownRx, ShutdownTx};
pub use state::{SharedTunnel, TunnelSnapshot, TunnelState};
pub use supervisor::{spawn_tunnel_workers, WorkerExit, WorkerGroup};
