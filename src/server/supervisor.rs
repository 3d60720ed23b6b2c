//! Process runtime: spawns the server command and restarts it on source changes.

use std::future::pending;
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::ExitStatus;

use tokio::sync::mpsc;

use crate::lifecycle::ShutdownSignal;
use crate::reload::{Debouncer, SourceWatcher, WatchFilter};
use crate::server::process::ServerProcess;
use crate::server::runtime::{ServeError, ServeOutcome, ServeSpec, ServerRuntime};

/// Runs the application through an external server command.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRuntime;

impl ProcessRuntime {
    pub fn new() -> Self {
        Self
    }
}

impl ServerRuntime for ProcessRuntime {
    async fn serve(
        &self,
        spec: ServeSpec,
        shutdown: ShutdownSignal,
    ) -> Result<ServeOutcome, ServeError> {
        if spec.command.check_app {
            check_app(&spec)?;
        }
        check_bind(&spec)?;

        if !spec.reload.enabled {
            return supervise(&spec, None, shutdown).await;
        }

        let filter = WatchFilter::new(spec.reload.include.clone(), spec.reload.exclude.clone());
        let (watcher, changes) = SourceWatcher::new(spec.reload.dirs.clone(), filter);
        // Dropping the notify handle stops delivery; hold it until serving ends.
        let _watcher = watcher.run()?;

        supervise(&spec, Some(changes), shutdown).await
    }
}

/// Refuse to start a server whose application module is not importable by the child.
pub fn check_app(spec: &ServeSpec) -> Result<PathBuf, ServeError> {
    match spec.search_path.locate_module(&spec.app) {
        Some(found) => {
            tracing::debug!(module = spec.app.module(), path = ?found, "Application module located");
            Ok(found)
        }
        None => Err(ServeError::AppNotFound {
            module: spec.app.module().to_string(),
            search_path: spec.search_path.entries().to_vec(),
        }),
    }
}

/// Fail fast when the bind address is already taken.
///
/// Restarted children rebind the same address, so a conflict is only
/// checked once, before the first spawn. The test listener is released
/// immediately.
pub fn check_bind(spec: &ServeSpec) -> Result<(), ServeError> {
    let addr = format!("{}:{}", spec.host, spec.port);
    let listener = TcpListener::bind((spec.host.as_str(), spec.port))
        .map_err(|source| ServeError::Bind { addr, source })?;
    drop(listener);
    Ok(())
}

/// Own the server child until shutdown, or until it exits with reload off.
///
/// With `changes`, every debounced batch restarts the child. A child that
/// exits on its own is not respawned until the next change arrives.
pub async fn supervise(
    spec: &ServeSpec,
    changes: Option<mpsc::UnboundedReceiver<PathBuf>>,
    mut shutdown: ShutdownSignal,
) -> Result<ServeOutcome, ServeError> {
    let grace = spec.command.stop_timeout;
    let mut changes = changes.map(|rx| Debouncer::new(rx, spec.reload.delay));
    let mut child = Some(ServerProcess::spawn(spec)?);

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                if let Some(process) = child.take() {
                    process.stop(grace).await?;
                }
                return Ok(ServeOutcome::Stopped);
            }
            status = wait_child(&mut child) => {
                let status = status?;
                child = None;
                if changes.is_none() {
                    tracing::info!(%status, "Server exited");
                    return Ok(ServeOutcome::Exited { code: status.code() });
                }
                tracing::warn!(%status, "Server exited, waiting for changes before restarting");
            }
            batch = next_batch(&mut changes) => {
                match batch {
                    Some(paths) => {
                        tracing::info!(changed = ?paths, "Changes detected, restarting server");
                        if let Some(process) = child.take() {
                            process.stop(grace).await?;
                        }
                        // Shutdown may have arrived during the stop grace period.
                        if shutdown.is_triggered() {
                            return Ok(ServeOutcome::Stopped);
                        }
                        child = Some(ServerProcess::spawn(spec)?);
                    }
                    None => {
                        tracing::warn!("File watcher closed, reload disabled");
                        changes = None;
                        if child.is_none() {
                            return Ok(ServeOutcome::Exited { code: None });
                        }
                    }
                }
            }
        }
    }
}

async fn wait_child(child: &mut Option<ServerProcess>) -> Result<ExitStatus, ServeError> {
    match child {
        Some(process) => process.wait().await,
        None => pending().await,
    }
}

async fn next_batch(changes: &mut Option<Debouncer>) -> Option<Vec<PathBuf>> {
    match changes {
        Some(debouncer) => debouncer.next_batch().await,
        None => pending().await,
    }
}
