//! Operator keystroke reader.
//!
//! Stdin is read on a dedicated OS thread so a blocked read never holds up
//! the runtime or shutdown. The thread is never joined: at exit it is still
//! parked in `read` and goes away with the process.

use std::io::{self, BufRead};
use std::thread;

use tokio::sync::mpsc;

use tunnelwatch_core::{TunnelError, TunnelResult};

const READER_NAME: &str = "operator-input";

/// Start the reader thread, forwarding every character typed on stdin.
pub fn spawn_key_reader(keys: mpsc::Sender<char>) -> TunnelResult<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name(READER_NAME.to_string())
        .spawn(move || forward_keys(io::stdin().lock(), keys))
        .map_err(|e| TunnelError::WorkerSpawn {
            worker: READER_NAME.to_string(),
            reason: e.to_string(),
        })
}

/// Forward each character of `reader` to `keys` until end of input or until
/// the receiving side is gone.
///
/// Line terminators are dropped; everything else, including spaces, is sent.
/// Must not be called from inside the async runtime.
pub fn forward_keys<R: BufRead>(reader: R, keys: mpsc::Sender<char>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Operator input read failed");
                return;
            }
        };
        for key in line.chars() {
            if keys.blocking_send(key).is_err() {
                return;
            }
        }
    }
    tracing::debug!("Operator input reached end of file");
}
