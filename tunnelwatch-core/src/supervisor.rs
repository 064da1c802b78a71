//! Supervised worker group.
//!
//! Owns the shutdown sender and every worker task. Whatever ends the run
//! (operator quit, a signal, a failed start) goes through
//! [`WorkerGroup::shutdown`], which signals every worker and joins them all.

use std::future::Future;

use tokio::task::JoinSet;

use crate::entry::EntryWorker;
use crate::exit::ExitWorker;
use crate::monitor::EnvironmentalMonitor;
use crate::random::RandomSource;
use crate::sensor::SensorKind;
use crate::shutdown::{shutdown_channel, ShutdownGuard, ShutdownTx};
use crate::state::SharedTunnel;

/// Outcome of joining one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerExit {
    /// Worker name.
    pub name: String,
    /// Whether the worker panicked instead of returning.
    pub panicked: bool,
}

/// A set of named workers sharing one shutdown signal.
pub struct WorkerGroup {
    shutdown_tx: ShutdownTx,
    tasks: JoinSet<WorkerExit>,
}

impl WorkerGroup {
    /// Create an empty group with a fresh shutdown channel.
    pub fn new() -> Self {
        let (shutdown_tx, _) = shutdown_channel();
        Self {
            shutdown_tx,
            tasks: JoinSet::new(),
        }
    }

    /// Shutdown sender shared by the group.
    pub fn shutdown_handle(&self) -> ShutdownTx {
        self.shutdown_tx.clone()
    }

    /// A new guard on the group's shutdown signal.
    pub fn guard(&self) -> ShutdownGuard {
        ShutdownGuard::new(&self.shutdown_tx)
    }

    /// Number of workers not yet joined.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no workers are running.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Spawn a named worker on the current runtime.
    ///
    /// The worker must obtain its [`ShutdownGuard`] from [`Self::guard`]
    /// before this call so it cannot miss the signal. It runs in its own
    /// task, so a panic is reported under its name.
    pub fn spawn<F>(&mut self, name: impl Into<String>, worker: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        tracing::debug!(worker = %name, "Spawning worker");
        let task = tokio::spawn(worker);
        self.tasks.spawn(async move {
            let panicked = match task.await {
                Ok(()) => false,
                Err(e) => {
                    tracing::error!(worker = %name, error = %e, "Worker failed");
                    e.is_panic()
                }
            };
            WorkerExit { name, panicked }
        });
    }

    /// Wait for the shutdown signal, whoever sends it.
    ///
    /// Subscribes immediately, so a signal sent before the returned future
    /// is first polled is still seen.
    pub fn wait_for_shutdown(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut guard = self.guard();
        async move { guard.wait().await }
    }

    /// Signal shutdown and join every worker.
    pub async fn shutdown(mut self) -> Vec<WorkerExit> {
        // No receivers just means every worker is already gone.
        let _ = self.shutdown_tx.send(());

        let mut exits = Vec::with_capacity(self.tasks.len());
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(exit) => {
                    tracing::debug!(worker = %exit.name, panicked = exit.panicked, "Worker joined");
                    exits.push(exit);
                }
                // The wrapper only awaits the worker; it fails only if the
                // runtime is shutting down underneath us.
                Err(e) => tracing::error!(error = %e, "Worker wrapper failed"),
            }
        }
        exits
    }
}

/// Spawn the entry worker, the exit worker and one monitor per hazard.
///
/// `rng` is called once per worker with that worker's index and returns
/// its random source.
pub fn spawn_tunnel_workers<R>(group: &mut WorkerGroup, state: &SharedTunnel, mut rng: R)
where
    R: FnMut(u64) -> Box<dyn RandomSource>,
{
    let entry = EntryWorker::new(state.clone(), rng(0), group.guard());
    group.spawn("entry", entry.run());

    let exit = ExitWorker::new(state.clone(), rng(1), group.guard());
    group.spawn("exit", exit.run());

    for (index, kind) in (2..).zip(SensorKind::ALL) {
        let monitor = EnvironmentalMonitor::new(kind, state.clone(), rng(index), group.guard());
        group.spawn(format!("{}-monitor", kind.as_str()), monitor.run());
    }
}

impl Default for WorkerGroup {
    fn default() -> Self {
        Self::new()
    }
}
