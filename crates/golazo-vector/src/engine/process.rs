//! Engine child process owned by the client that launched it.

use std::path::Path;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use super::EngineError;

/// A launched engine process.
///
/// The child is killed when this value is dropped, so the engine never
/// outlives the store that started it. It is never restarted.
#[derive(Debug)]
pub struct EngineProcess {
    child: Child,
    launcher: String,
}

impl EngineProcess {
    /// Launch `launcher` with `port` as its only argument.
    ///
    /// With a non-empty `interpreter` the command is
    /// `<interpreter> <launcher> <port>`, otherwise `<launcher> <port>`.
    /// Output is discarded.
    ///
    /// Only the direct child is signalled on stop or drop, so a launcher
    /// script must `exec` the engine (or be the engine). Anything it forks
    /// and leaves running is not reaped.
    pub fn spawn(interpreter: &str, launcher: &Path, port: u16) -> Result<Self, EngineError> {
        let mut command = if interpreter.is_empty() {
            Command::new(launcher)
        } else {
            let mut command = Command::new(interpreter);
            command.arg(launcher);
            command
        };

        command
            .arg(port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|e| {
            EngineError::Startup(format!("failed to launch {}: {}", launcher.display(), e))
        })?;

        info!(
            pid = child.id(),
            launcher = %launcher.display(),
            port,
            "Engine process launched"
        );

        Ok(Self {
            child,
            launcher: launcher.display().to_string(),
        })
    }

    /// OS process id, or `None` once the process has been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Whether the process has already terminated.
    pub fn has_exited(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!(launcher = %self.launcher, %status, "Engine process exited");
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(launcher = %self.launcher, error = %e, "Could not poll engine process");
                false
            }
        }
    }

    /// Kill the process and wait for it to be reaped.
    pub async fn stop(&mut self) {
        if self.has_exited() {
            return;
        }
        if let Err(e) = self.child.kill().await {
            warn!(launcher = %self.launcher, error = %e, "Failed to stop engine process");
            return;
        }
        info!(launcher = %self.launcher, "Engine process stopped");
    }
}
