//! Command-line argument parsing.

use clap::Parser;

use tunnelwatch_core::config::{DEFAULT_CAPACITY, DEFAULT_HAZARD_THRESHOLD};

/// Road tunnel monitor.
#[derive(Parser, Debug, Clone)]
#[command(name = "tunnelwatch-node")]
#[command(about = "Road tunnel monitor with single-key operator control")]
#[command(version)]
pub struct Cli {
    /// Maximum number of vehicles inside the tunnel.
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    pub capacity: u32,

    /// Sensor reading above which the alert is raised.
    #[arg(long, default_value_t = DEFAULT_HAZARD_THRESHOLD)]
    pub threshold: f64,

    /// Time unit in milliseconds (monitor period, transit delay unit).
    #[arg(long, default_value_t = 1000)]
    pub time_unit_ms: u64,

    /// Pause between two mitigation decay steps, in milliseconds.
    #[arg(long, default_value_t = 500)]
    pub decay_interval_ms: u64,

    /// Seed for deterministic sensor and transit randomness.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Start with diagnostic output turned off.
    #[arg(long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
