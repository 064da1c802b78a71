//! Tunnel monitor binary.
//!
//! Runs the tunnel workers and reads single-key operator commands from stdin
//! until `q` or SIGINT/SIGTERM.

use tracing_subscriber::EnvFilter;

use tunnelwatch_node::cli::Cli;
use tunnelwatch_node::config::NodeConfig;
use tunnelwatch_node::node::Node;

/// `RUST_LOG` wins over `--log-level`.
fn init_tracing(fallback_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    init_tracing(&cli.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Tunnel monitor starting, press h for the key bindings"
    );

    // Rejects bad tuning before any worker runs
    let node = Node::new(NodeConfig::from_cli(&cli))?;
    node.run().await
}
