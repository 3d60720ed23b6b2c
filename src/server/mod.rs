//! Server runtime subsystem.
//!
//! # Data Flow
//! ```text
//! LaunchPlan.serve (ServeSpec)
//!     → start_server (logs effective settings)
//!     → ServerRuntime::serve
//!         ProcessRuntime: check_app → SourceWatcher → supervise
//!             → ServerProcess (spawn / stop / respawn)
//!     → ServeOutcome (exit code for the launcher)
//! ```
//!
//! # Design Decisions
//! - The runtime is a trait; the bootstrapper never depends on a concrete server
//! - Root, env and working directory travel in ServeSpec, not ambient state
//! - Only the supervisor owns the child handle

pub mod app_ref;
pub mod process;
pub mod runtime;
pub mod supervisor;

pub use app_ref::{AppReference, AppReferenceError};
pub use runtime::{CommandSpec, ServeError, ServeOutcome, ServeSpec, ServerRuntime, WatchConfig};
pub use supervisor::ProcessRuntime;

use crate::lifecycle::ShutdownSignal;

/// Hand the application to `runtime` and block until it finishes.
pub async fn start_server<R: ServerRuntime>(
    runtime: &R,
    spec: ServeSpec,
    shutdown: ShutdownSignal,
) -> Result<ServeOutcome, ServeError> {
    tracing::info!(
        app = %spec.app,
        host = %spec.host,
        port = spec.port,
        reload = spec.reload.enabled,
        reload_dirs = ?spec.reload.dirs,
        "Starting server"
    );

    let outcome = runtime.serve(spec, shutdown).await?;
    tracing::info!(?outcome, "Server finished");
    Ok(outcome)
}
