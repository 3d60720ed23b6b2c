//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve the project root and load configuration
//! - Validate after CLI overrides, before anything is touched
//! - Apply the launch plan to the process, then hand over to the runtime
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - `prepare_launch` is side-effect free; `apply` performs the mutations
//! - `apply` is synchronous and runs before any runtime thread exists

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::bootstrap::{self, BootstrapError, LaunchPlan, SearchPath};
use crate::cli::Cli;
use crate::config::loader::{discover_config, ConfigError};
use crate::config::validation::validate_config;
use crate::config::LauncherConfig;
use crate::lifecycle::Shutdown;
use crate::server::{self, ServeError, ServeOutcome, ServerRuntime};

/// Anything that stops the launcher before or while serving.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Serve(#[from] ServeError),
}

/// A validated configuration and the plan derived from it.
#[derive(Debug, Clone)]
pub struct PreparedLaunch {
    pub config: LauncherConfig,
    pub config_source: Option<PathBuf>,
    pub plan: LaunchPlan,
}

/// Resolve root and configuration and build the launch plan.
pub fn prepare_launch(cli: &Cli) -> Result<PreparedLaunch, LaunchError> {
    let root = match &cli.root {
        Some(dir) => bootstrap::root_from_dir(dir)?,
        None => bootstrap::resolve_root()?,
    };

    let (mut config, config_source) = discover_config(cli.config.as_deref(), &root)?;
    cli.apply_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    let inherited = SearchPath::inherited(&config.runtime.root_env_var);
    let plan = bootstrap::prepare(&config, root, inherited)?;

    Ok(PreparedLaunch {
        config,
        config_source,
        plan,
    })
}

/// Apply the plan to this process.
///
/// Sets environment variables and the working directory, so call it while
/// the process is still single-threaded.
pub fn apply(prepared: &PreparedLaunch) -> Result<(), LaunchError> {
    let plan = &prepared.plan;
    tracing::info!(
        root = %plan.root,
        config = ?prepared.config_source,
        search_path = ?plan.search_path.entries(),
        "Bootstrapping"
    );
    plan.apply()?;
    Ok(())
}

/// Serve an applied launch until the runtime returns.
pub async fn run<R: ServerRuntime>(
    prepared: PreparedLaunch,
    runtime: &R,
    shutdown: Arc<Shutdown>,
) -> Result<ServeOutcome, LaunchError> {
    let outcome = server::start_server(runtime, prepared.plan.serve, shutdown.subscribe()).await?;
    Ok(outcome)
}
