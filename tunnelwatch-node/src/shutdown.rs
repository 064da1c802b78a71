//! Operating system shutdown signals.

/// Wait for a shutdown signal (SIGINT or SIGTERM).
///
/// If the handlers cannot be installed the error is logged and this never
/// completes; the operator can still quit from the console.
pub async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let handlers = signal(SignalKind::interrupt())
            .and_then(|sigint| Ok((sigint, signal(SignalKind::terminate())?)));
        let (mut sigint, mut sigterm) = match handlers {
            Ok(handlers) => handlers,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handlers");
                return std::future::pending().await;
            }
        };

        tokio::select! {
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, initiating shutdown...");
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating shutdown...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            return std::future::pending().await;
        }
        tracing::info!("Received Ctrl+C, initiating shutdown...");
    }
}
