use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::server::monitor::OutputMonitor;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};

/// Name of the supervised executable. Fixed wire contract.
pub const SERVER_BINARY: &str = "gst-switch-srv";

/// Log file the server's output is redirected to when `log_to_file` is set.
/// Truncated on every run.
pub const SERVER_LOG_FILE: &str = "server.log";

/// Lifecycle state of the supervised server process.
///
/// A `ServerProcess` runs at most once: `NotStarted` transitions to `Running`
/// on a successful spawn, `Running` transitions to `Ended` when the process
/// is terminated, killed, or observed to have exited. There is no way back
/// from `Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// No spawn has been attempted yet.
    NotStarted,
    /// The server process is running and its pid is recorded.
    Running,
    /// The server process has been terminated, killed, or seen to exit.
    Ended,
}

/// Supervises a single `gst-switch-srv` process.
///
/// Owns the OS process handle and its output monitor exclusively: no other
/// component may signal or reap the child. All lifecycle operations are meant
/// to be issued from a single controlling task.
pub struct ServerProcess {
    /// Validated launch configuration, fixed for the life of this instance.
    config: ServerConfig,
    /// Current lifecycle state.
    state: ServerState,
    /// Pid of the child, recorded only while `Running`.
    pid: Option<u32>,
    /// OS process handle, held only while `Running`.
    child: Option<Child>,
    /// Output monitor, attached only when output is piped.
    monitor: Option<OutputMonitor>,
}

impl ServerProcess {
    /// Creates a supervisor for the given configuration. Nothing is spawned
    /// until [`ServerProcess::run`] is called.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            state: ServerState::NotStarted,
            pid: None,
            child: None,
            monitor: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Pid of the running server, if any.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// The launch configuration this supervisor was created with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Resolves the full path of the server executable.
    ///
    /// With an explicit executable path configured, joins it with the fixed
    /// binary name; existence is checked by the spawn itself. Otherwise the
    /// binary is looked up on `$PATH`, and a failed lookup is a
    /// [`Error::Path`] raised before any spawn is attempted.
    pub fn resolve_executable(&self) -> Result<PathBuf> {
        match self.config.executable_path() {
            Some(dir) => Ok(dir.join(SERVER_BINARY)),
            None => which::which(SERVER_BINARY).map_err(|_| {
                Error::Path(format!(
                    "cannot find {} in $PATH; specify the executable path",
                    SERVER_BINARY
                ))
            }),
        }
    }

    /// Launches the server process.
    ///
    /// `gst_option` is a free-form GStreamer option inserted as a single
    /// argument ahead of the server's own flags; pass `""` for none.
    ///
    /// Exactly one of two outcomes is observable: the state becomes
    /// `Running` with a recorded pid, or an error is returned and the state
    /// is unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::Process`] if this instance has already run
    /// - [`Error::Path`] if the executable cannot be located
    /// - [`Error::Process`] for any other OS-level spawn failure
    #[tracing::instrument(skip(self), fields(gst_option = %gst_option))]
    pub async fn run(&mut self, gst_option: &str) -> Result<()> {
        match self.state {
            ServerState::NotStarted => {}
            ServerState::Running => {
                return Err(Error::Process("server is already running".to_string()));
            }
            ServerState::Ended => {
                return Err(Error::Process(
                    "server already ran; create a new instance to run again".to_string(),
                ));
            }
        }

        let executable = self.resolve_executable()?;
        let args = self.config.to_args(gst_option);
        tracing::info!(executable = %executable.display(), ?args, "Starting server");

        let mut command = Command::new(&executable);
        command.args(&args);
        command.stdin(Stdio::null());

        if self.config.log_to_file() {
            let log = std::fs::File::create(SERVER_LOG_FILE).map_err(|e| {
                Error::Process(format!("failed to open {}: {}", SERVER_LOG_FILE, e))
            })?;
            let log_err = log.try_clone().map_err(|e| {
                Error::Process(format!("failed to clone {} handle: {}", SERVER_LOG_FILE, e))
            })?;
            command.stdout(Stdio::from(log)).stderr(Stdio::from(log_err));
        } else {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                tracing::error!(executable = %executable.display(), "Executable not found");
                Error::Path(format!(
                    "cannot find {} at '{}'",
                    SERVER_BINARY,
                    executable.display()
                ))
            } else {
                tracing::error!(error = %e, "Failed to spawn server");
                Error::Process(format!("internal error while launching process: {}", e))
            }
        })?;

        let pid = match child.id() {
            Some(pid) => pid,
            None => {
                let _ = child.start_kill();
                return Err(Error::Process(
                    "spawned server did not report a pid".to_string(),
                ));
            }
        };

        let monitor = if self.config.log_to_file() {
            None
        } else {
            match (child.stdout.take(), child.stderr.take()) {
                (Some(stdout), Some(stderr)) => Some(OutputMonitor::attach(stdout, stderr)),
                _ => {
                    let _ = child.start_kill();
                    return Err(Error::Process(
                        "failed to take output pipes from server process".to_string(),
                    ));
                }
            }
        };

        self.child = Some(child);
        self.monitor = monitor;
        self.pid = Some(pid);
        self.state = ServerState::Running;
        tracing::info!(pid, "Server started");
        Ok(())
    }

    /// Non-blocking liveness poll.
    ///
    /// Returns `true` iff the process has not yet exited. An exit observed
    /// here transitions the state to `Ended` and releases the handle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Process`] if no process was ever started, or if the
    /// OS-level poll fails.
    pub fn is_alive(&mut self) -> Result<bool> {
        match self.state {
            ServerState::NotStarted => {
                Err(Error::Process("server has not been started".to_string()))
            }
            ServerState::Ended => Ok(false),
            ServerState::Running => {
                let child = self.child.as_mut().ok_or_else(|| {
                    Error::Process("server process handle is missing".to_string())
                })?;
                let exit = child
                    .try_wait()
                    .map_err(|e| Error::Process(format!("failed to poll server process: {}", e)))?;
                match exit {
                    Some(status) => {
                        tracing::info!(%status, "Server exited on its own");
                        self.mark_ended();
                        Ok(false)
                    }
                    None => Ok(true),
                }
            }
        }
    }

    /// Waits until `count` occurrences of `pattern` appear in the server's
    /// output.
    ///
    /// Pure delegation to the attached [`OutputMonitor`]; parameters and the
    /// monitor's result are passed through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Process`] when no monitor is attached (output is
    /// going to the log file, or the server never started), and propagates
    /// [`Error::Timeout`] from the monitor.
    pub async fn wait_for_output(
        &self,
        pattern: &str,
        timeout: Duration,
        count: usize,
    ) -> Result<()> {
        let monitor = self.monitor.as_ref().ok_or_else(|| {
            Error::Process(
                "no output monitor attached; run with log_to_file disabled to watch output"
                    .to_string(),
            )
        })?;
        monitor.wait_for_output(pattern, timeout, count).await
    }

    /// Gracefully terminates the server with SIGTERM.
    ///
    /// With `flush_coverage` set, first requests a coverage-counter flush and
    /// runs the coverage-report command; both are best-effort and never abort
    /// the termination. On success the state becomes `Ended` and the pid is
    /// cleared; on failure the state is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Process`] if no process is running or the signal send
    /// fails.
    #[tracing::instrument(skip(self))]
    pub async fn terminate(&mut self, flush_coverage: bool) -> Result<()> {
        let pid = self.running_pid()?;
        if flush_coverage {
            self.flush_coverage_best_effort().await;
        }
        tracing::info!(pid, "Terminating server");
        send_signal(pid, Signal::SIGTERM).map_err(|e| {
            Error::Process(format!(
                "cannot terminate server process; try killing it: {}",
                e
            ))
        })?;
        self.mark_ended();
        Ok(())
    }

    /// Forcefully kills the server with SIGKILL.
    ///
    /// The signal goes directly to the recorded pid rather than through the
    /// process handle, so delivery does not depend on the handle's state.
    /// Coverage flushing behaves as in [`ServerProcess::terminate`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Process`] if no process is running or the signal send
    /// fails; the state is unchanged on failure.
    #[tracing::instrument(skip(self))]
    pub async fn kill(&mut self, flush_coverage: bool) -> Result<()> {
        let pid = self.running_pid()?;
        if flush_coverage {
            self.flush_coverage_best_effort().await;
        }
        tracing::info!(pid, "Killing server");
        send_signal(pid, Signal::SIGKILL)
            .map_err(|e| Error::Process(format!("cannot kill server process: {}", e)))?;
        self.mark_ended();
        Ok(())
    }

    /// Requests a gcov coverage-counter flush by sending SIGUSR1.
    ///
    /// The server stays running; this never blocks waiting for the flush to
    /// complete.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Process`] if no process is running or the signal
    /// cannot be delivered.
    pub fn gcov_flush(&self) -> Result<()> {
        let pid = self.running_pid()?;
        tracing::debug!(pid, "Signaling gcov flush");
        send_signal(pid, Signal::SIGUSR1)
            .map_err(|e| Error::Process(format!("unable to send signal: {}", e)))
    }

    fn running_pid(&self) -> Result<u32> {
        match (self.state, self.pid) {
            (ServerState::Running, Some(pid)) => Ok(pid),
            _ => Err(Error::Process("server process does not exist".to_string())),
        }
    }

    fn mark_ended(&mut self) {
        self.state = ServerState::Ended;
        self.pid = None;
        // Dropping the handle releases the process; the runtime reaps it in
        // the background. The monitor's reader tasks go with it.
        self.child = None;
        self.monitor = None;
    }

    /// Coverage flush plus report, never failing the surrounding lifecycle
    /// call.
    async fn flush_coverage_best_effort(&self) {
        if let Err(e) = self.gcov_flush() {
            tracing::warn!(error = %e, "Coverage flush signal failed, skipping report");
            return;
        }
        self.run_coverage_report().await;
    }

    /// Runs `make coverage` in the configured tools directory, discarding the
    /// outcome.
    async fn run_coverage_report(&self) {
        let Some(tools_dir) = self.config.tools_dir() else {
            tracing::warn!("No tools directory configured, skipping coverage report");
            return;
        };
        tracing::info!(dir = %tools_dir.display(), "Running coverage report");
        let result = Command::new("make")
            .arg("-C")
            .arg(tools_dir)
            .arg("coverage")
            .status()
            .await;
        match result {
            Ok(status) => tracing::debug!(%status, "Coverage report finished"),
            Err(e) => tracing::warn!(error = %e, "Failed to run coverage report"),
        }
    }
}

fn send_signal(pid: u32, sig: Signal) -> std::result::Result<(), nix::errno::Errno> {
    signal::kill(Pid::from_raw(pid as i32), sig)
}
