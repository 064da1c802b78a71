//! Tunnel monitor node library.
//!
//! This library provides the pieces of the `tunnelwatch-node` binary: CLI
//! parsing, configuration, the operator console and the orchestrator. It is
//! also used by the acceptance tests to drive a node without a terminal.

pub mod cli;
pub mod config;
pub mod console;
pub mod input;
pub mod node;
pub mod shutdown;
