//! The seam between the bootstrapper and whatever actually serves the app.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::bootstrap::{EnvOverlay, SearchPath};
use crate::lifecycle::ShutdownSignal;
use crate::server::AppReference;

/// Errors surfaced by a server runtime.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("application module {module:?} not found on search path {search_path:?}")]
    AppNotFound {
        module: String,
        search_path: Vec<PathBuf>,
    },

    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting on server process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),
}

/// File-watch settings handed to the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchConfig {
    pub enabled: bool,
    /// Absolute directories to watch.
    pub dirs: Vec<PathBuf>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    #[serde(rename = "delay_ms", serialize_with = "serialize_millis")]
    pub delay: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// How the external command is launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub program: String,
    /// Argument templates, rendered against the rest of the [`ServeSpec`].
    pub args: Vec<String>,
    pub check_app: bool,
    #[serde(rename = "stop_timeout_secs", serialize_with = "serialize_secs")]
    pub stop_timeout: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_secs())
}

/// Everything a runtime needs to serve the application. The project root
/// travels explicitly here instead of through ambient process state.
#[derive(Debug, Clone, Serialize)]
pub struct ServeSpec {
    pub app: AppReference,
    pub host: String,
    pub port: u16,
    pub reload: WatchConfig,
    pub working_dir: PathBuf,
    #[serde(serialize_with = "serialize_env")]
    pub env: EnvOverlay,
    /// Module search path of the child: the root only, matching its env.
    pub search_path: SearchPath,
    pub command: CommandSpec,
}

fn serialize_env<S: serde::Serializer>(env: &EnvOverlay, s: S) -> Result<S::Ok, S::Error> {
    serde::Serialize::serialize(&env.to_display_map(), s)
}

/// How a served application finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeOutcome {
    /// Stopped on request (interrupt or terminate signal).
    Stopped,
    /// The server exited by itself. `None` means it was killed by a signal.
    Exited { code: Option<i32> },
}

impl ServeOutcome {
    /// Exit code the launcher should report.
    pub fn exit_code(&self) -> u8 {
        match self {
            ServeOutcome::Stopped => 0,
            ServeOutcome::Exited { code: Some(code) } => u8::try_from(*code).unwrap_or(1),
            ServeOutcome::Exited { code: None } => 1,
        }
    }
}

/// A pluggable server runtime.
///
/// `serve` blocks for the server's lifetime, including any reload restarts,
/// and returns once the server exits or `shutdown` fires.
pub trait ServerRuntime {
    fn serve(
        &self,
        spec: ServeSpec,
        shutdown: ShutdownSignal,
    ) -> impl Future<Output = Result<ServeOutcome, ServeError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ServeOutcome::Stopped.exit_code(), 0);
        assert_eq!(ServeOutcome::Exited { code: Some(0) }.exit_code(), 0);
        assert_eq!(ServeOutcome::Exited { code: Some(3) }.exit_code(), 3);
        assert_eq!(ServeOutcome::Exited { code: Some(-1) }.exit_code(), 1);
        assert_eq!(ServeOutcome::Exited { code: None }.exit_code(), 1);
    }
}
