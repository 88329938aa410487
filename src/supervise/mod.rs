// src/supervise/mod.rs

//! Process supervision layer.
//!
//! - [`process`] launches a process (optionally as a new group leader) and
//!   gives bounded waits over it.
//! - [`signal`] delivers signals to groups or single processes, with every
//!   delivery failure mode enumerated.
//! - [`plan`] applies an ordered escalation (e.g. terminate, then kill) with a
//!   wait budget after every signal.
//!
//! [`supervise`] composes them: launch, race the exit against the timeout,
//! escalate on timeout.

pub mod plan;
pub mod process;
pub mod signal;

use std::io;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::errors::{AuditionError, Result};
use crate::types::{EXIT_NOT_FOUND, EXIT_UNCONFIRMED_KILL, FinalState, GroupSignal};

pub use plan::{Escalation, EscalationOutcome, EscalationStep, Terminable, TerminationPlan};
pub use process::{LaunchSpec, SignalScope, StdioMode, SupervisedProcess, exit_code};
pub use signal::SignalDelivery;

/// Exit status for an engine that exists but could not be executed.
pub const EXIT_NOT_EXECUTABLE: i32 = 126;

/// Result of supervising one engine process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supervision {
    pub state: FinalState,
    pub exit_code: i32,
    pub signals_sent: Vec<GroupSignal>,
}

/// Launch `spec`, wait up to `timeout`, and escalate with `plan` on timeout.
///
/// Launch failures are reported as `FinalState::LaunchFailed` rather than as
/// errors; only an unexpected failure while waiting is returned as `Err`.
pub async fn supervise(
    spec: &LaunchSpec,
    timeout: Duration,
    plan: &TerminationPlan,
) -> Result<Supervision> {
    let mut process = match SupervisedProcess::launch(spec) {
        Ok(p) => p,
        Err(AuditionError::LaunchError { program, source }) => {
            return Ok(launch_failed(&program, &source));
        }
        Err(e) => return Err(e),
    };

    if let Some(code) = process.wait_timeout(timeout).await? {
        info!(exit_code = code, elapsed = ?process.elapsed(), "engine exited");
        return Ok(Supervision {
            state: FinalState::ExitedNormally,
            exit_code: code,
            signals_sent: Vec::new(),
        });
    }

    warn!(
        pid = process.pid(),
        "audition exceeded {:.1}s timeout; terminating engine session",
        timeout.as_secs_f64()
    );

    let escalation = plan.execute(&mut process).await;
    let (state, exit_code) = classify(&escalation);
    if state == FinalState::Unkillable {
        warn!(pid = process.pid(), "unable to fully terminate engine process tree");
    }

    Ok(Supervision {
        state,
        exit_code,
        signals_sent: escalation.signals_sent,
    })
}

/// Map an escalation of a timed-out engine to its terminal state and status.
pub fn classify(escalation: &Escalation) -> (FinalState, i32) {
    match escalation.outcome {
        EscalationOutcome::Exited {
            code,
            after: GroupSignal::Kill,
        } => (FinalState::ForceKilled, code),
        EscalationOutcome::Exited { code, .. } | EscalationOutcome::AlreadyExited { code } => {
            (FinalState::ExitedAfterSignal, code)
        }
        EscalationOutcome::Unconfirmed => (FinalState::Unkillable, EXIT_UNCONFIRMED_KILL),
    }
}

fn launch_failed(program: &str, source: &io::Error) -> Supervision {
    let exit_code = if source.kind() == io::ErrorKind::NotFound {
        error!("could not find engine executable at {program}");
        EXIT_NOT_FOUND
    } else {
        error!(error = %source, "could not execute engine at {program}");
        EXIT_NOT_EXECUTABLE
    };

    Supervision {
        state: FinalState::LaunchFailed,
        exit_code,
        signals_sent: Vec::new(),
    }
}
