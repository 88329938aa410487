// src/supervise/process.rs

//! A launched external process under supervision.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::process::{Child, ChildStderr, Command};
use tracing::{debug, warn};

use crate::config::EnvSnapshot;
use crate::errors::{AuditionError, Result};
use crate::supervise::plan::Terminable;
use crate::supervise::signal::{self, SignalDelivery};
use crate::types::GroupSignal;

/// How escalation signals reach the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalScope {
    /// The whole process group (the process was launched as group leader).
    Group,
    /// Only the process itself.
    Process,
}

/// Standard stream wiring for a launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    /// Share the runner's terminal.
    Inherit,
    /// stdin closed, stdout discarded, stderr piped for diagnostics.
    DiagnosticsOnly,
}

/// Everything needed to start one process.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Full child environment. `None` inherits the runner's.
    pub env: Option<EnvSnapshot>,
    pub scope: SignalScope,
    pub stdio: StdioMode,
}

/// One launched process: its group id, a handle to poll and reap it, and
/// when it started.
#[derive(Debug)]
pub struct SupervisedProcess {
    child: Child,
    /// Process id captured at launch; doubles as the group id for
    /// `SignalScope::Group` launches. Zero if the id was unavailable.
    pid: i32,
    scope: SignalScope,
    started_at: Instant,
    program: String,
}

impl SupervisedProcess {
    /// Start the process described by `spec`.
    ///
    /// With `SignalScope::Group` the child becomes leader of a new session
    /// and process group, so a group signal also reaches anything it spawns.
    pub fn launch(spec: &LaunchSpec) -> Result<Self> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).kill_on_drop(true);

        if let Some(env) = &spec.env {
            cmd.env_clear();
            cmd.envs(env.iter());
        }

        match spec.stdio {
            StdioMode::Inherit => {}
            StdioMode::DiagnosticsOnly => {
                cmd.stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::piped());
            }
        }

        #[cfg(unix)]
        if spec.scope == SignalScope::Group {
            // New session: the child leads its own group and has no
            // controlling terminal, so terminal reads cannot stop it.
            // SAFETY: setsid is async-signal-safe and touches no parent state.
            unsafe {
                cmd.pre_exec(|| {
                    nix::unistd::setsid()
                        .map(|_| ())
                        .map_err(io::Error::from)
                });
            }
        }

        let child = cmd.spawn().map_err(|source| AuditionError::LaunchError {
            program: spec.program.clone(),
            source,
        })?;

        let pid = child
            .id()
            .and_then(|id| i32::try_from(id).ok())
            .unwrap_or(0);

        debug!(program = %spec.program, pid, scope = ?spec.scope, "process launched");

        Ok(Self {
            child,
            pid,
            scope: spec.scope,
            started_at: Instant::now(),
            program: spec.program.clone(),
        })
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Wait for exit for at most `budget`.
    ///
    /// `Ok(None)` means the process is still running when the budget runs out.
    pub async fn wait_timeout(&mut self, budget: Duration) -> io::Result<Option<i32>> {
        match tokio::time::timeout(budget, self.child.wait()).await {
            Ok(status) => Ok(Some(exit_code(status?))),
            Err(_) => Ok(None),
        }
    }

    /// Reap without blocking; `None` while still running.
    pub fn poll_exit(&mut self) -> Option<i32> {
        match self.child.try_wait() {
            Ok(Some(status)) => Some(exit_code(status)),
            Ok(None) => None,
            Err(e) => {
                warn!(program = %self.program, pid = self.pid, error = %e, "unable to poll process");
                None
            }
        }
    }

    fn send(&mut self, signal: GroupSignal) -> SignalDelivery {
        let delivery = match self.scope {
            SignalScope::Group => signal::signal_group(self.pid, signal),
            SignalScope::Process => signal::signal_process(self.pid, signal),
        };

        if delivery == SignalDelivery::Unsupported && signal == GroupSignal::Kill {
            return match self.child.start_kill() {
                Ok(()) => SignalDelivery::Delivered,
                Err(e) if e.kind() == io::ErrorKind::InvalidInput => SignalDelivery::NoSuchProcess,
                Err(e) => SignalDelivery::Failed(e.to_string()),
            };
        }
        delivery
    }
}

impl Terminable for SupervisedProcess {
    fn try_exit(&mut self) -> Option<i32> {
        self.poll_exit()
    }

    fn deliver(&mut self, signal: GroupSignal) -> SignalDelivery {
        let delivery = self.send(signal);
        if delivery.is_expected() {
            debug!(program = %self.program, pid = self.pid, %signal, %delivery, "signal sent");
        } else {
            warn!(program = %self.program, pid = self.pid, %signal, %delivery, "signal delivery failed");
        }
        delivery
    }

    fn wait_for(&mut self, budget: Duration) -> Pin<Box<dyn Future<Output = Option<i32>> + Send + '_>> {
        Box::pin(async move {
            match self.wait_timeout(budget).await {
                Ok(code) => code,
                Err(e) => {
                    warn!(program = %self.program, pid = self.pid, error = %e, "error waiting for process");
                    None
                }
            }
        })
    }
}

/// Map an exit status to a single integer.
///
/// Processes ended by a signal report `128 + signo`, the shell convention.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }
    -1
}
