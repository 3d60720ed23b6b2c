//! The external server child process.

use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::time::timeout;

use crate::server::runtime::{ServeError, ServeSpec};

/// Render an argument template against the serve settings.
pub fn render_arg(template: &str, spec: &ServeSpec) -> String {
    template
        .replace("{app}", &spec.app.to_string())
        .replace("{host}", &spec.host)
        .replace("{port}", &spec.port.to_string())
        .replace("{root}", &spec.working_dir.to_string_lossy())
}

/// One incarnation of the server. A reload replaces it with a fresh one.
pub struct ServerProcess {
    program: String,
    child: Child,
}

impl ServerProcess {
    /// Spawn the configured command with the overlay environment, in the
    /// project root. The child is killed if this handle is dropped.
    pub fn spawn(spec: &ServeSpec) -> Result<Self, ServeError> {
        let program = spec.command.program.clone();
        let mut cmd = Command::new(&program);
        cmd.args(spec.command.args.iter().map(|t| render_arg(t, spec)));
        cmd.envs(spec.env.iter());
        cmd.current_dir(&spec.working_dir);
        cmd.kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| ServeError::Spawn {
            program: program.clone(),
            source,
        })?;

        tracing::info!(
            pid = child.id().unwrap_or(0),
            program = %program,
            "Server process started"
        );
        Ok(Self { program, child })
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the child to exit on its own.
    pub async fn wait(&mut self) -> Result<ExitStatus, ServeError> {
        self.child.wait().await.map_err(ServeError::Wait)
    }

    /// Ask the child to terminate, escalating to a kill after `grace`.
    pub async fn stop(mut self, grace: Duration) -> Result<ExitStatus, ServeError> {
        if let Ok(Some(status)) = self.child.try_wait() {
            return Ok(status);
        }

        self.terminate();
        match timeout(grace, self.child.wait()).await {
            Ok(status) => {
                let status = status.map_err(ServeError::Wait)?;
                tracing::info!(program = %self.program, %status, "Server process stopped");
                Ok(status)
            }
            Err(_) => {
                tracing::warn!(
                    program = %self.program,
                    grace_secs = grace.as_secs(),
                    "Server did not stop in time, killing it"
                );
                self.child.kill().await.map_err(ServeError::Wait)?;
                self.child.wait().await.map_err(ServeError::Wait)
            }
        }
    }

    #[cfg(unix)]
    fn terminate(&mut self) {
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = self.child.id() {
            if let Err(e) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                tracing::warn!(pid, "Failed to send SIGTERM: {}", e);
            }
        }
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) {
        if let Err(e) = self.child.start_kill() {
            tracing::warn!("Failed to kill server process: {}", e);
        }
    }
}
