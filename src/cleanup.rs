// src/cleanup.rs

//! Best-effort removal of engine instances left over from earlier runs.

use std::io;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

/// Upper bound for a single `pkill` call.
const PKILL_BUDGET: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// At least one matching process was asked to exit.
    Signalled,
    NoMatch,
    /// `pkill` is not available on this system.
    ToolMissing,
    Failed(String),
}

/// Send a termination request to every process named in `names`.
///
/// Stops early once the signaling tool turns out to be missing; the last
/// entry of the result is then `ToolMissing`.
pub async fn kill_stale_engines(names: &[String]) -> Vec<(String, CleanupOutcome)> {
    kill_with("pkill", names).await
}

async fn kill_with(tool: &str, names: &[String]) -> Vec<(String, CleanupOutcome)> {
    let mut outcomes = Vec::with_capacity(names.len());

    for name in names {
        let outcome = pkill(tool, name).await;
        debug!(process = %name, ?outcome, "stale engine cleanup");

        let stop = outcome == CleanupOutcome::ToolMissing;
        outcomes.push((name.clone(), outcome));
        if stop {
            break;
        }
    }

    outcomes
}

async fn pkill(tool: &str, name: &str) -> CleanupOutcome {
    let status = Command::new(tool)
        .arg(name)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status();

    match tokio::time::timeout(PKILL_BUDGET, status).await {
        Ok(Ok(status)) => match status.code() {
            Some(0) => CleanupOutcome::Signalled,
            Some(1) => CleanupOutcome::NoMatch,
            Some(code) => CleanupOutcome::Failed(format!("{tool} exited with code {code}")),
            None => CleanupOutcome::Failed(format!("{tool} terminated by signal")),
        },
        Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => CleanupOutcome::ToolMissing,
        Ok(Err(e)) => CleanupOutcome::Failed(e.to_string()),
        Err(_) => CleanupOutcome::Failed(format!("{tool} did not finish within {PKILL_BUDGET:?}")),
    }
}
