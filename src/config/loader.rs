//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{LauncherConfig, DEFAULT_CONFIG_FILE};
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read a TOML file into a configuration without validating it.
pub fn read_config(path: &Path) -> Result<LauncherConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read `explicit` if given, else `<root>/launcher.toml` when it exists,
/// else the defaults. Validation is left to the caller so CLI overrides can
/// be applied first.
pub fn discover_config(
    explicit: Option<&Path>,
    root: &Path,
) -> Result<(LauncherConfig, Option<PathBuf>), ConfigError> {
    if let Some(path) = explicit {
        return Ok((read_config(path)?, Some(path.to_path_buf())));
    }

    let candidate = root.join(DEFAULT_CONFIG_FILE);
    if candidate.is_file() {
        let config = read_config(&candidate)?;
        Ok((config, Some(candidate)))
    } else {
        Ok((LauncherConfig::default(), None))
    }
}
