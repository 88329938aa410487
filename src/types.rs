// src/types.rs

use std::fmt;

/// Exit status reported when the engine executable cannot be found.
pub const EXIT_NOT_FOUND: i32 = 127;

/// Exit status reported when a timed-out engine could not be confirmed dead.
pub const EXIT_UNCONFIRMED_KILL: i32 = 124;

/// A signal sent as part of an escalation.
///
/// Delivered to a whole process group for the engine, and to the single
/// recorder process for the capture sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupSignal {
    Interrupt,
    Terminate,
    Kill,
}

impl fmt::Display for GroupSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupSignal::Interrupt => "SIGINT",
            GroupSignal::Terminate => "SIGTERM",
            GroupSignal::Kill => "SIGKILL",
        };
        f.write_str(name)
    }
}

/// Where a single invocation ended up.
///
/// Launching, running and escalating are transient; only terminal states
/// are ever reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalState {
    /// The engine exited on its own within the timeout.
    ExitedNormally,
    /// The engine executable could not be started.
    LaunchFailed,
    /// The engine timed out and exited after an interrupt or terminate signal.
    ExitedAfterSignal,
    /// The engine timed out and only exited after the kill signal.
    ForceKilled,
    /// The escalation ran out without the engine being reaped.
    Unkillable,
}

impl FinalState {
    pub fn timed_out(self) -> bool {
        matches!(
            self,
            FinalState::ExitedAfterSignal | FinalState::ForceKilled | FinalState::Unkillable
        )
    }
}
