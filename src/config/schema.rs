//! Configuration schema definitions.
//!
//! Every section carries defaults reproducing the stock launcher: serve
//! `backend.main:app` on `0.0.0.0:8000` with reload watching `backend/`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// File looked up under the project root when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "launcher.toml";

/// Root configuration for the launcher.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Dotted reference to the application object (`module.path:attribute`).
    pub app: String,

    /// Bind settings handed to the server runtime.
    pub server: ServerConfig,

    /// Source watching and restart behaviour.
    pub reload: ReloadConfig,

    /// External server command and the environment it receives.
    pub runtime: RuntimeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            app: "backend.main:app".to_string(),
            server: ServerConfig::default(),
            reload: ReloadConfig::default(),
            runtime: RuntimeConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Bind configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host; `0.0.0.0` listens on all interfaces.
    pub host: String,

    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Reload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Restart the server when watched sources change.
    pub enabled: bool,

    /// Directories to watch. Relative entries are resolved against the root.
    pub dirs: Vec<String>,

    /// File name globs that trigger a reload.
    pub include: Vec<String>,

    /// Globs matched against every path component; a hit suppresses the reload.
    pub exclude: Vec<String>,

    /// Quiet period collecting a burst of changes into one restart.
    pub delay_ms: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dirs: vec!["backend".to_string()],
            include: vec!["*.py".to_string()],
            exclude: vec![
                ".*".to_string(),
                "*.py[cod]".to_string(),
                "*.sw.*".to_string(),
                "~*".to_string(),
                "__pycache__".to_string(),
            ],
            delay_ms: 250,
        }
    }
}

/// External server runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Program to spawn.
    pub program: String,

    /// Arguments; `{app}`, `{host}`, `{port}` and `{root}` are substituted.
    pub args: Vec<String>,

    /// Variable carrying the project root into the child process.
    pub root_env_var: String,

    /// Extra variables exported alongside the root variable.
    pub env: BTreeMap<String, String>,

    /// Refuse to start when the app module cannot be located on the search path.
    pub check_app: bool,

    /// Grace period between SIGTERM and SIGKILL when stopping the child.
    pub stop_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            program: "uvicorn".to_string(),
            args: vec![
                "{app}".to_string(),
                "--host".to_string(),
                "{host}".to_string(),
                "--port".to_string(),
                "{port}".to_string(),
            ],
            root_env_var: "PYTHONPATH".to_string(),
            env: BTreeMap::new(),
            check_app: true,
            stop_timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
