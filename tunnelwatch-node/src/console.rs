//! Operator console: turns keystrokes into command replies on stdout.

use tokio::sync::mpsc;

use tunnelwatch_core::{ControlPlane, ShutdownGuard};

/// Printed for any key that is not bound to a command.
pub const INVALID_COMMAND: &str = "Invalid command. Please try again.";

/// Consumes operator keys until shutdown.
pub struct OperatorConsole {
    plane: ControlPlane,
    keys: mpsc::Receiver<char>,
    shutdown: ShutdownGuard,
}

impl OperatorConsole {
    /// Create a console reading `keys` and applying them through `plane`.
    pub fn new(plane: ControlPlane, keys: mpsc::Receiver<char>, shutdown: ShutdownGuard) -> Self {
        Self { plane, keys, shutdown }
    }

    /// Handle keys until shutdown.
    ///
    /// When the input closes the tunnel keeps running; only quit or a
    /// signal ends it.
    pub async fn run(mut self) {
        tracing::info!("Operator console ready, press h for help");
        loop {
            match self.shutdown.guard(self.keys.recv()).await {
                None => break,
                Some(Some(key)) => {
                    if let Some(line) = self.respond(key).await {
                        println!("{}", line);
                    }
                }
                Some(None) => {
                    tracing::info!("Operator input closed, running until signalled");
                    self.shutdown.wait().await;
                    break;
                }
            }
        }
        tracing::info!("Operator console stopped");
    }

    /// Apply one key and return the line to print, if any.
    pub async fn respond(&self, key: char) -> Option<String> {
        if key == '\n' || key == '\r' {
            return None;
        }
        match self.plane.handle_key(key).await {
            Ok(reply) => Some(reply.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring operator key");
                Some(INVALID_COMMAND.to_string())
            }
        }
    }
}
