//! Node orchestrator.
//!
//! Wires the tunnel workers, the operator console and the OS signal handler
//! together, and tears everything down through the worker group.

use std::future::Future;

use tokio::sync::mpsc;

use tunnelwatch_core::{
    spawn_tunnel_workers, ControlPlane, SeededRandom, SharedTunnel, TunnelState, WorkerGroup,
};

use crate::config::NodeConfig;
use crate::console::OperatorConsole;
use crate::input::spawn_key_reader;
use crate::shutdown::wait_for_shutdown_signal;

/// Keys buffered between the input thread and the console.
const KEY_BUFFER: usize = 64;

/// The main node structure.
pub struct Node {
    /// Node configuration.
    config: NodeConfig,

    /// Shared tunnel state.
    state: SharedTunnel,
}

impl Node {
    /// Create a new node with the given configuration.
    pub fn new(config: NodeConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let state = TunnelState::shared(config.tunnel.clone());
        Ok(Self { config, state })
    }

    /// Shared tunnel state.
    pub fn state(&self) -> &SharedTunnel {
        &self.state
    }

    /// Run the node on the process's stdin until quit or a signal.
    pub async fn run(&self) -> anyhow::Result<()> {
        let group = self.start_workers();

        let (key_tx, key_rx) = mpsc::channel(KEY_BUFFER);
        if let Err(e) = spawn_key_reader(key_tx) {
            tracing::error!(error = %e, "Operator input unavailable, stopping workers");
            group.shutdown().await;
            return Err(e.into());
        }

        self.supervise(group, key_rx, wait_for_shutdown_signal()).await
    }

    /// Run the node with operator keys from `keys`, stopping on quit or when
    /// `signal` completes.
    pub async fn run_with_input<S>(&self, keys: mpsc::Receiver<char>, signal: S) -> anyhow::Result<()>
    where
        S: Future<Output = ()>,
    {
        let group = self.start_workers();
        self.supervise(group, keys, signal).await
    }

    fn start_workers(&self) -> WorkerGroup {
        let tunnel = &self.config.tunnel;
        tracing::info!("Starting tunnel monitor...");
        tracing::info!("  Capacity: {}", tunnel.capacity);
        tracing::info!("  Hazard threshold: {:.1}", tunnel.hazard_threshold);
        tracing::info!("  Time unit: {:?}", tunnel.time_unit);
        tracing::info!("  Decay interval: {:?}", tunnel.decay_interval);
        tracing::info!("  Output enabled: {}", tunnel.output_enabled);
        match self.config.seed {
            Some(seed) => tracing::info!("  Seed: {}", seed),
            None => tracing::info!("  Seed: entropy"),
        }

        let mut group = WorkerGroup::new();
        let seed = self.config.seed;
        spawn_tunnel_workers(&mut group, &self.state, |index| {
            Box::new(SeededRandom::for_worker(seed, index))
        });
        group
    }

    async fn supervise<S>(
        &self,
        mut group: WorkerGroup,
        keys: mpsc::Receiver<char>,
        signal: S,
    ) -> anyhow::Result<()>
    where
        S: Future<Output = ()>,
    {
        // Subscribe before the console can send quit.
        let quit = group.wait_for_shutdown();

        let plane = ControlPlane::new(self.state.clone(), group.shutdown_handle());
        let console = OperatorConsole::new(plane, keys, group.guard());
        group.spawn("operator-console", console.run());

        tokio::select! {
            _ = quit => {
                tracing::info!("Quit requested, stopping workers...");
            }
            _ = signal => {
                tracing::info!("Stopping workers...");
            }
        }

        let exits = group.shutdown().await;
        let panicked = exits.iter().filter(|exit| exit.panicked).count();
        if panicked > 0 {
            anyhow::bail!("{} of {} workers panicked", panicked, exits.len());
        }

        tracing::info!(workers = exits.len(), "Tunnel monitor shutdown complete");
        Ok(())
    }
}
