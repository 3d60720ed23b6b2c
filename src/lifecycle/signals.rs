//! OS signal handling.
//!
//! SIGINT and SIGTERM both request shutdown; the supervisor stops the
//! server child before the launcher exits.

use std::sync::Arc;

use crate::lifecycle::Shutdown;

/// Wait for an interrupt or terminate request and name the one that arrived.
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(name)
}

#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}

/// Spawn a task that triggers `shutdown` on the first signal.
pub fn spawn_signal_handler(shutdown: Arc<Shutdown>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(name) => {
                tracing::info!(signal = name, "Shutdown requested");
                shutdown.trigger();
            }
            Err(e) => tracing::error!("Failed to install signal handlers: {}", e),
        }
    })
}
