//! Environment overlay shared by the launcher and every spawned server.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::Path;

use crate::bootstrap::root::ProjectRoot;

/// Variables to export, applied to the launcher process and passed to each
/// child explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverlay {
    vars: BTreeMap<String, OsString>,
}

impl EnvOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<OsString>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(key).map(OsString::as_os_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_os_str()))
    }

    /// Lossy string view, for logging and the dry-run report.
    pub fn to_display_map(&self) -> BTreeMap<String, String> {
        self.vars
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string_lossy().into_owned()))
            .collect()
    }

    /// Write every variable into the launcher's own environment.
    ///
    /// Must run during single-threaded setup, before the server runtime starts.
    pub fn apply_to_process(&self) {
        for (key, value) in &self.vars {
            std::env::set_var(key, value);
        }
    }
}

/// Record `var = root` so the server child sees the project root.
pub fn export_root_env(overlay: &mut EnvOverlay, var: &str, root: &ProjectRoot) {
    let value: &Path = root.as_path();
    overlay.set(var, value.as_os_str());
}
