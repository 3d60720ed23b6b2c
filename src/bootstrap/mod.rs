//! Process bootstrap: everything that happens before the server takes over.
//!
//! # Data Flow
//! ```text
//! resolve_root (launcher location or --root)
//!     → ensure_on_search_path (root first, once)
//!     → export_root_env (PYTHONPATH = root)
//!     → prepare → LaunchPlan (pure value)
//!     → LaunchPlan::apply (env vars, then working directory)
//! ```
//!
//! # Design Decisions
//! - `prepare` touches no process state, so plans are testable in parallel
//! - Process-wide mutation is confined to `apply`, called once from startup
//! - The plan also carries root and env explicitly into the ServeSpec

pub mod environment;
pub mod root;
pub mod search_path;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::config::LauncherConfig;
use crate::server::{AppReference, AppReferenceError, CommandSpec, ServeSpec, WatchConfig};

pub use environment::{export_root_env, EnvOverlay};
pub use root::{resolve_root, resolve_root_from, root_from_dir, ProjectRoot};
pub use search_path::{ensure_on_search_path, SearchPath};

/// Errors raised while preparing the process.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("cannot determine launcher location: {0}")]
    CurrentExe(#[source] std::io::Error),

    #[error("cannot make {path:?} absolute: {source}")]
    Absolute {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0:?} has no parent directory")]
    NoParent(PathBuf),

    #[error("cannot change working directory to {path:?}: {source}")]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid application reference: {0}")]
    App(#[from] AppReferenceError),
}

/// Everything decided before handing over to the server runtime.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchPlan {
    pub root: ProjectRoot,
    pub search_path: SearchPath,
    #[serde(skip)]
    pub env: EnvOverlay,
    pub working_dir: PathBuf,
    pub serve: ServeSpec,
}

impl LaunchPlan {
    /// Apply the plan to the launcher process: export the environment, then
    /// change into the project root.
    pub fn apply(&self) -> Result<(), BootstrapError> {
        self.env.apply_to_process();
        set_working_directory(&self.working_dir)
    }
}

/// Change the process working directory. Fatal at startup if it fails.
pub fn set_working_directory(dir: &Path) -> Result<(), BootstrapError> {
    std::env::set_current_dir(dir).map_err(|source| BootstrapError::WorkingDirectory {
        path: dir.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = ?dir, "Changed working directory");
    Ok(())
}

/// Build the launch plan for `root` without touching process state.
///
/// `inherited` is the search path the launcher started with; the root is
/// put in front of it.
pub fn prepare(
    config: &LauncherConfig,
    root: ProjectRoot,
    inherited: SearchPath,
) -> Result<LaunchPlan, BootstrapError> {
    let app: AppReference = config.app.parse()?;

    let mut search_path = inherited;
    ensure_on_search_path(&mut search_path, &root);

    let mut env = EnvOverlay::new();
    for (key, value) in &config.runtime.env {
        env.set(key.clone(), value);
    }
    // Set last so a stray [runtime.env] entry cannot shadow the root.
    export_root_env(&mut env, &config.runtime.root_env_var, &root);

    let reload = WatchConfig {
        enabled: config.reload.enabled,
        dirs: config
            .reload
            .dirs
            .iter()
            .filter(|d| !d.trim().is_empty())
            .map(|d| root.join(d))
            .collect(),
        include: config.reload.include.clone(),
        exclude: config.reload.exclude.clone(),
        delay: Duration::from_millis(config.reload.delay_ms),
    };

    let command = CommandSpec {
        program: config.runtime.program.clone(),
        args: config.runtime.args.clone(),
        check_app: config.runtime.check_app,
        stop_timeout: Duration::from_secs(config.runtime.stop_timeout_secs),
    };

    // The child only sees `<root_env_var>=<root>`, so the pre-flight check
    // must not find modules through directories it will never search.
    let mut child_search_path = SearchPath::new();
    child_search_path.ensure(&root);

    let working_dir = root.as_path().to_path_buf();
    let serve = ServeSpec {
        app,
        host: config.server.host.clone(),
        port: config.server.port,
        reload,
        working_dir: working_dir.clone(),
        env: env.clone(),
        search_path: child_search_path,
        command,
    };

    Ok(LaunchPlan {
        root,
        search_path,
        env,
        working_dir,
        serve,
    })
}
