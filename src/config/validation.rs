//! Configuration validation.
//!
//! Serde handles syntax; this pass checks values. All problems are reported
//! together rather than stopping at the first one.

use thiserror::Error;

use crate::config::schema::LauncherConfig;
use crate::server::AppReference;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("app: {0}")]
    App(String),

    #[error("server.host must not be empty")]
    EmptyHost,

    #[error("server.host {0:?} contains whitespace")]
    InvalidHost(String),

    #[error("server.port must be non-zero")]
    ZeroPort,

    #[error("reload.dirs must name at least one directory when reload is enabled")]
    NoReloadDirs,

    #[error("reload.include must contain at least one pattern when reload is enabled")]
    NoIncludePatterns,

    #[error("reload.{field} contains an empty pattern")]
    EmptyPattern { field: &'static str },

    #[error("runtime.program must not be empty")]
    EmptyProgram,

    #[error("invalid environment variable name {0:?}")]
    InvalidEnvName(String),

    #[error("unknown log level {0:?}")]
    UnknownLogLevel(String),
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &LauncherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.app.parse::<AppReference>() {
        errors.push(ValidationError::App(e.to_string()));
    }

    let host = &config.server.host;
    if host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    } else if host.chars().any(char::is_whitespace) {
        errors.push(ValidationError::InvalidHost(config.server.host.clone()));
    }

    if config.server.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    if config.reload.enabled {
        if config.reload.dirs.iter().all(|d| d.trim().is_empty()) {
            errors.push(ValidationError::NoReloadDirs);
        }
        if config.reload.include.is_empty() {
            errors.push(ValidationError::NoIncludePatterns);
        }
    }
    if config.reload.include.iter().any(|p| p.is_empty()) {
        errors.push(ValidationError::EmptyPattern { field: "include" });
    }
    if config.reload.exclude.iter().any(|p| p.is_empty()) {
        errors.push(ValidationError::EmptyPattern { field: "exclude" });
    }

    if config.runtime.program.trim().is_empty() {
        errors.push(ValidationError::EmptyProgram);
    }

    let env_names = std::iter::once(&config.runtime.root_env_var).chain(config.runtime.env.keys());
    for name in env_names {
        if !is_valid_env_name(name) {
            errors.push(ValidationError::InvalidEnvName(name.clone()));
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_valid_env_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('=') && !name.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&LauncherConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = LauncherConfig::default();
        config.app = "backend.main".into();
        config.server.port = 0;
        config.server.host = String::new();
        config.runtime.root_env_var = "BAD=NAME".into();
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::ZeroPort));
        assert!(errors.contains(&ValidationError::EmptyHost));
        assert!(errors.contains(&ValidationError::InvalidEnvName("BAD=NAME".into())));
        assert!(errors.contains(&ValidationError::UnknownLogLevel("loud".into())));
    }

    #[test]
    fn test_host_with_surrounding_whitespace_is_rejected() {
        for host in [" 0.0.0.0", "0.0.0.0 ", "0.0.0.0\n", "local host"] {
            let mut config = LauncherConfig::default();
            config.server.host = host.into();
            assert_eq!(
                validate_config(&config).unwrap_err(),
                vec![ValidationError::InvalidHost(host.into())],
                "host {host:?}"
            );
        }

        let mut config = LauncherConfig::default();
        config.server.host = "   ".into();
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::EmptyHost]
        );
    }

    #[test]
    fn test_reload_dirs_only_required_when_enabled() {
        let mut config = LauncherConfig::default();
        config.reload.dirs.clear();
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::NoReloadDirs]
        );

        config.reload.enabled = false;
        assert!(validate_config(&config).is_ok());
    }
}
