//! Operator control plane.
//!
//! Every operator command is a single key. Parsing turns a key into a
//! [`Command`]; [`ControlPlane::execute`] applies it to the shared state as
//! one atomic mutation per field and returns a [`Reply`] for the console.

use std::fmt;

use chrono::{DateTime, Local};

use crate::error::CommandError;
use crate::sensor::SensorKind;
use crate::shutdown::ShutdownTx;
use crate::state::{SharedTunnel, TunnelSnapshot};

/// Operator commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Suspend admission and exit.
    Pause,
    /// Lift a pause.
    Resume,
    /// Clear the alert, empty the tunnel and zero all readings.
    Reset,
    /// Stop every worker and exit.
    Quit,
    /// Read one hazard reading.
    QueryReading(SensorKind),
    /// Read the occupancy.
    QueryOccupancy,
    /// Read the alert flag.
    QueryAlert,
    /// Read every field.
    Status,
    /// Flip diagnostic output.
    ToggleOutput,
    /// Write the injected test level to one reading.
    InjectReading(SensorKind),
    /// Write the injected test occupancy.
    InjectOccupancy,
    /// Flip the alert flag.
    ToggleAlert,
    /// Show the key bindings.
    Help,
    /// Print an empty line.
    Blank,
}

impl Command {
    /// Parse one keystroke.
    pub fn from_key(key: char) -> Result<Self, CommandError> {
        let command = match key {
            'p' => Command::Pause,
            'c' => Command::Resume,
            'r' => Command::Reset,
            'q' => Command::Quit,
            's' => Command::QueryReading(SensorKind::Smoke),
            'g' => Command::QueryReading(SensorKind::NaturalGas),
            't' => Command::QueryOccupancy,
            'a' => Command::QueryAlert,
            'e' => Command::Status,
            'o' => Command::ToggleOutput,
            '1' => Command::InjectReading(SensorKind::Smoke),
            '2' => Command::InjectReading(SensorKind::NaturalGas),
            '3' => Command::InjectOccupancy,
            '4' => Command::ToggleAlert,
            'h' => Command::Help,
            ' ' => Command::Blank,
            other => return Err(CommandError::Unrecognized(other)),
        };
        Ok(command)
    }

    /// Whether this command only reads state.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Command::QueryReading(_)
                | Command::QueryOccupancy
                | Command::QueryAlert
                | Command::Status
                | Command::Help
                | Command::Blank
        )
    }
}

/// Console answer to an operator command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Traffic paused.
    Paused,
    /// Traffic resumed.
    Resumed,
    /// State reset.
    Reset,
    /// Shutdown signalled.
    Quitting,
    /// A hazard reading.
    Reading(SensorKind, f64),
    /// Occupancy.
    Occupancy(u32),
    /// Alert flag.
    Alert(bool),
    /// Full state with the local time it was taken.
    Status(TunnelSnapshot, DateTime<Local>),
    /// New output state.
    Output(bool),
    /// A reading was overwritten.
    InjectedReading(SensorKind, f64),
    /// Occupancy was overwritten.
    InjectedOccupancy(u32),
    /// New alert state.
    AlertToggled(bool),
    /// Key bindings.
    Help,
    /// Empty line.
    Blank,
}

/// Key binding table shown by the help command.
pub const HELP_TEXT: &str = "\
Commands:
p - Pause
r - Reset
c - Continue
q - Quit
s - Print smoke level
g - Print natural gas level
t - Print cars in tunnel
a - Print alert flag
h - Print commands
e - Output current state of tunnel
o - Toggle state of tunnel output
1 - Set smoke level to test value
2 - Set natural gas level to test value
3 - Set cars in tunnel to test value
4 - Toggle alert flag for testing";

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Paused => write!(f, "Pausing until further notice\nPlease press C to continue..."),
            Reply::Resumed => write!(f, "Continuing..."),
            Reply::Reset => write!(
                f,
                "Resetting all sensor values and state of tunnel\nPlease press C to continue..."
            ),
            Reply::Quitting => write!(f, "Exiting..."),
            Reply::Reading(kind, level) => write!(f, "{} level: {:.1}", kind, level),
            Reply::Occupancy(cars) => write!(f, "Cars in tunnel: {}", cars),
            Reply::Alert(alert) => write!(f, "Alert flag: {}", u8::from(*alert)),
            Reply::Status(snapshot, at) => {
                write!(f, "{}\nCurrent time: {}", snapshot, at.format("%a %b %e %H:%M:%S %Y"))
            }
            Reply::Output(true) => write!(f, "Turning on output..."),
            Reply::Output(false) => write!(f, "Turning off output..."),
            Reply::InjectedReading(kind, level) => write!(f, "Setting {} level: {:.1}", kind, level),
            Reply::InjectedOccupancy(cars) => write!(f, "Setting Cars in tunnel: {}", cars),
            Reply::AlertToggled(alert) => {
                write!(f, "Toggling alert flag... now {}", u8::from(*alert))
            }
            Reply::Help => write!(f, "{}", HELP_TEXT),
            Reply::Blank => Ok(()),
        }
    }
}

/// Applies operator commands to the shared tunnel state.
#[derive(Debug, Clone)]
pub struct ControlPlane {
    state: SharedTunnel,
    shutdown_tx: ShutdownTx,
}

impl ControlPlane {
    /// Create a control plane over `state` that signals quit on `shutdown_tx`.
    pub fn new(state: SharedTunnel, shutdown_tx: ShutdownTx) -> Self {
        Self { state, shutdown_tx }
    }

    /// Parse and execute one keystroke.
    pub async fn handle_key(&self, key: char) -> Result<Reply, CommandError> {
        let command = Command::from_key(key)?;
        Ok(self.execute(command).await)
    }

    /// Execute a command.
    pub async fn execute(&self, command: Command) -> Reply {
        let state = &self.state;
        let reply = match command {
            Command::Pause => {
                state.pause();
                Reply::Paused
            }
            Command::Resume => {
                state.resume();
                Reply::Resumed
            }
            Command::Reset => {
                state.reset().await;
                Reply::Reset
            }
            Command::Quit => {
                // No receivers just means every worker is already gone.
                let _ = self.shutdown_tx.send(());
                Reply::Quitting
            }
            Command::QueryReading(kind) => Reply::Reading(kind, state.sensor(kind).level().await),
            Command::QueryOccupancy => Reply::Occupancy(state.gate().occupancy().await),
            Command::QueryAlert => Reply::Alert(state.alert_active()),
            Command::Status => Reply::Status(state.snapshot().await, Local::now()),
            Command::ToggleOutput => Reply::Output(state.toggle_output()),
            Command::InjectReading(kind) => {
                let level = state.config().injected_level;
                state.sensor(kind).set_level(level).await;
                Reply::InjectedReading(kind, level)
            }
            Command::InjectOccupancy => {
                let cars = state.config().injected_occupancy;
                state.gate().overwrite(cars).await;
                Reply::InjectedOccupancy(cars)
            }
            Command::ToggleAlert => Reply::AlertToggled(state.toggle_alert()),
            Command::Help => Reply::Help,
            Command::Blank => Reply::Blank,
        };

        if !command.is_query() {
            tracing::info!(command = ?command, "Operator command applied");
        }
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TunnelConfig;
    use crate::shutdown::{shutdown_channel, ShutdownGuard};
    use crate::state::TunnelState;

    fn plane() -> (ControlPlane, SharedTunnel, ShutdownTx) {
        let state = TunnelState::shared(TunnelConfig::default());
        let (tx, _rx) = shutdown_channel();
        (ControlPlane::new(state.clone(), tx.clone()), state, tx)
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(Command::from_key('p'), Ok(Command::Pause));
        assert_eq!(Command::from_key('c'), Ok(Command::Resume));
        assert_eq!(Command::from_key('g'), Ok(Command::QueryReading(SensorKind::NaturalGas)));
        assert_eq!(Command::from_key('2'), Ok(Command::InjectReading(SensorKind::NaturalGas)));
        assert_eq!(Command::from_key('4'), Ok(Command::ToggleAlert));
        assert_eq!(Command::from_key('x'), Err(CommandError::Unrecognized('x')));
        assert_eq!(Command::from_key('P'), Err(CommandError::Unrecognized('P')));
    }

    #[tokio::test]
    async fn test_pause_and_resume() {
        let (plane, state, _tx) = plane();
        assert_eq!(plane.execute(Command::Pause).await, Reply::Paused);
        assert!(state.is_paused());
        assert_eq!(plane.execute(Command::Resume).await, Reply::Resumed);
        assert!(!state.is_paused());
    }

    #[tokio::test]
    async fn test_injections_and_queries() {
        let (plane, state, _tx) = plane();

        assert_eq!(
            plane.handle_key('1').await,
            Ok(Reply::InjectedReading(SensorKind::Smoke, 100.0))
        );
        assert_eq!(plane.handle_key('s').await, Ok(Reply::Reading(SensorKind::Smoke, 100.0)));

        assert_eq!(plane.handle_key('3').await, Ok(Reply::InjectedOccupancy(10)));
        assert_eq!(plane.handle_key('t').await, Ok(Reply::Occupancy(10)));

        assert_eq!(plane.handle_key('4').await, Ok(Reply::AlertToggled(true)));
        assert_eq!(plane.handle_key('a').await, Ok(Reply::Alert(true)));
        assert!(state.alert_active());
        assert_eq!(plane.handle_key('4').await, Ok(Reply::AlertToggled(false)));
    }

    #[tokio::test]
    async fn test_invalid_key_changes_nothing() {
        let (plane, state, _tx) = plane();
        let before = state.snapshot().await;
        assert_eq!(plane.handle_key('z').await, Err(CommandError::Unrecognized('z')));
        assert_eq!(state.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_toggle_output_leaves_state_alone() {
        let (plane, state, _tx) = plane();
        state.gate().overwrite(2).await;
        state.raise_alert();

        assert_eq!(plane.execute(Command::ToggleOutput).await, Reply::Output(false));
        assert_eq!(state.gate().occupancy().await, 2);
        assert!(state.alert_active());
        assert_eq!(plane.execute(Command::ToggleOutput).await, Reply::Output(true));
    }

    #[tokio::test]
    async fn test_quit_signals_shutdown() {
        let (plane, _state, tx) = plane();
        let mut guard = ShutdownGuard::new(&tx);
        assert_eq!(plane.execute(Command::Quit).await, Reply::Quitting);
        assert!(guard.is_shutdown());
    }

    #[tokio::test]
    async fn test_status_reply() {
        let (plane, _state, _tx) = plane();
        match plane.execute(Command::Status).await {
            Reply::Status(snapshot, _) => assert_eq!(snapshot.capacity, 5),
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn test_reply_text() {
        assert_eq!(Reply::Reading(SensorKind::Smoke, 42.26).to_string(), "Smoke level: 42.3");
        assert_eq!(Reply::Occupancy(3).to_string(), "Cars in tunnel: 3");
        assert_eq!(Reply::Alert(false).to_string(), "Alert flag: 0");
        assert!(Reply::Help.to_string().contains("q - Quit"));
        assert_eq!(Reply::Blank.to_string(), "");
    }
}
