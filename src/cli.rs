//! Command-line surface. With no flags the launcher behaves like the stock
//! run script: `backend.main:app` on `0.0.0.0:8000`, reloading on `backend/`.

use std::path::PathBuf;

use clap::Parser;

use crate::config::LauncherConfig;

#[derive(Debug, Default, Parser)]
#[command(name = "ra-launcher", version)]
#[command(about = "Start the RA Automator backend with auto-reload", long_about = None)]
pub struct Cli {
    /// Configuration file (default: <root>/launcher.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Project root (default: directory containing this executable)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Application reference, e.g. backend.main:app
    #[arg(long)]
    pub app: Option<String>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,

    /// Disable restart-on-change
    #[arg(long)]
    pub no_reload: bool,

    /// Directory to watch, relative to the root; replaces the configured list
    #[arg(long = "reload-dir", value_name = "DIR")]
    pub reload_dirs: Vec<String>,

    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the launch plan as JSON and exit
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Layer command-line flags over the file configuration.
    pub fn apply_overrides(&self, config: &mut LauncherConfig) {
        if let Some(app) = &self.app {
            config.app = app.clone();
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.no_reload {
            config.reload.enabled = false;
        }
        if !self.reload_dirs.is_empty() {
            config.reload.dirs = self.reload_dirs.clone();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }
}
