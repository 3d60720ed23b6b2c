//! Shared utilities for integration tests.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ra_launcher::lifecycle::ShutdownSignal;
use ra_launcher::server::{ServeError, ServeOutcome, ServeSpec, ServerRuntime};

#[allow(dead_code)]
/// What a runtime observed at the moment it was asked to serve.
#[derive(Debug, Clone)]
pub struct Observed {
    pub spec: ServeSpec,
    pub cwd: PathBuf,
    pub env_value: Option<OsString>,
}

#[allow(dead_code)]
/// A runtime that records its invocation instead of serving.
#[derive(Clone, Default)]
pub struct RecordingRuntime {
    pub env_var: String,
    pub calls: Arc<Mutex<Vec<Observed>>>,
}

#[allow(dead_code)]
impl RecordingRuntime {
    pub fn new(env_var: &str) -> Self {
        Self {
            env_var: env_var.to_string(),
            calls: Arc::default(),
        }
    }
}

impl ServerRuntime for RecordingRuntime {
    async fn serve(
        &self,
        spec: ServeSpec,
        _shutdown: ShutdownSignal,
    ) -> Result<ServeOutcome, ServeError> {
        let observed = Observed {
            spec,
            cwd: std::env::current_dir().unwrap(),
            env_value: std::env::var_os(&self.env_var),
        };
        self.calls.lock().unwrap().push(observed);
        Ok(ServeOutcome::Exited { code: Some(0) })
    }
}

/// Lay out a minimal `backend` package under `root`.
pub fn write_backend(root: &Path) {
    let backend = root.join("backend");
    fs::create_dir_all(&backend).unwrap();
    fs::write(backend.join("__init__.py"), "").unwrap();
    fs::write(backend.join("main.py"), "app = object()\n").unwrap();
}

/// Poll until `path` holds at least `lines` lines.
#[allow(dead_code)]
pub async fn wait_for_lines(path: &Path, lines: usize, limit: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        let count = fs::read_to_string(path)
            .map(|s| s.lines().count())
            .unwrap_or(0);
        if count >= lines {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}
