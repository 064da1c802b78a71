//! Node configuration.

use std::time::Duration;

use tunnelwatch_core::{TunnelConfig, TunnelResult};

use crate::cli::Cli;

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Tunnel tuning.
    pub tunnel: TunnelConfig,

    /// Base seed for worker randomness. `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Log level.
    pub log_level: String,
}

impl NodeConfig {
    /// Create a node configuration from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        let tunnel = TunnelConfig::new(cli.capacity)
            .with_hazard_threshold(cli.threshold)
            .with_time_unit(Duration::from_millis(cli.time_unit_ms))
            .with_decay_interval(Duration::from_millis(cli.decay_interval_ms))
            .with_output_enabled(!cli.quiet);

        Self {
            tunnel,
            seed: cli.seed,
            log_level: cli.log_level.clone(),
        }
    }

    /// Reject tunnel settings the workers cannot run with.
    pub fn validate(&self) -> TunnelResult<()> {
        self.tunnel.validate()?;
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            tunnel: TunnelConfig::default(),
            seed: None,
            log_level: "info".to_string(),
        }
    }
}
