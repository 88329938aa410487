// src/supervise/signal.rs

//! Signal delivery to process groups and single processes.
//!
//! Delivery is best-effort and never fails the caller: every result is one of
//! the enumerated [`SignalDelivery`] cases, and the expected ones (invalid id,
//! target already gone) are distinguished from real failures.

use std::fmt;

use crate::types::GroupSignal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalDelivery {
    Delivered,
    /// The id was zero or negative; there is nothing to signal.
    InvalidTarget,
    /// The process (or every member of the group) has already exited.
    NoSuchProcess,
    /// The platform cannot deliver this signal.
    Unsupported,
    Failed(String),
}

impl SignalDelivery {
    /// True for outcomes that callers are expected to ignore silently.
    pub fn is_expected(&self) -> bool {
        !matches!(self, SignalDelivery::Failed(_))
    }
}

impl fmt::Display for SignalDelivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalDelivery::Delivered => f.write_str("delivered"),
            SignalDelivery::InvalidTarget => f.write_str("invalid target id"),
            SignalDelivery::NoSuchProcess => f.write_str("no such process"),
            SignalDelivery::Unsupported => f.write_str("unsupported on this platform"),
            SignalDelivery::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

/// Send `signal` to every process in group `pgid`.
#[cfg(unix)]
pub fn signal_group(pgid: i32, signal: GroupSignal) -> SignalDelivery {
    if pgid <= 0 {
        return SignalDelivery::InvalidTarget;
    }
    let result = nix::sys::signal::killpg(nix::unistd::Pid::from_raw(pgid), to_nix(signal));
    delivery_from(result)
}

/// Send `signal` to the single process `pid`.
#[cfg(unix)]
pub fn signal_process(pid: i32, signal: GroupSignal) -> SignalDelivery {
    if pid <= 0 {
        return SignalDelivery::InvalidTarget;
    }
    let result = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), to_nix(signal));
    delivery_from(result)
}

#[cfg(unix)]
fn to_nix(signal: GroupSignal) -> nix::sys::signal::Signal {
    use nix::sys::signal::Signal;
    match signal {
        GroupSignal::Interrupt => Signal::SIGINT,
        GroupSignal::Terminate => Signal::SIGTERM,
        GroupSignal::Kill => Signal::SIGKILL,
    }
}

#[cfg(unix)]
fn delivery_from(result: nix::Result<()>) -> SignalDelivery {
    match result {
        Ok(()) => SignalDelivery::Delivered,
        Err(nix::errno::Errno::ESRCH) => SignalDelivery::NoSuchProcess,
        Err(e) => SignalDelivery::Failed(e.to_string()),
    }
}

// Without process groups only the forced kill is available, and that goes
// through the child handle (see `SupervisedProcess::deliver`).
#[cfg(not(unix))]
pub fn signal_group(pgid: i32, _signal: GroupSignal) -> SignalDelivery {
    if pgid <= 0 {
        return SignalDelivery::InvalidTarget;
    }
    SignalDelivery::Unsupported
}

#[cfg(not(unix))]
pub fn signal_process(pid: i32, _signal: GroupSignal) -> SignalDelivery {
    if pid <= 0 {
        return SignalDelivery::InvalidTarget;
    }
    SignalDelivery::Unsupported
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn non_positive_ids_are_nothing_to_signal() {
        assert_eq!(signal_group(0, GroupSignal::Kill), SignalDelivery::InvalidTarget);
        assert_eq!(signal_group(-5, GroupSignal::Terminate), SignalDelivery::InvalidTarget);
        assert_eq!(signal_process(0, GroupSignal::Interrupt), SignalDelivery::InvalidTarget);
    }

    #[test]
    fn vanished_group_is_tolerated() {
        // Spawn and reap a child in its own group; its id is then free.
        use std::os::unix::process::CommandExt;
        let mut child = std::process::Command::new("true")
            .process_group(0)
            .spawn()
            .unwrap();
        let pgid = child.id() as i32;
        child.wait().unwrap();

        let delivery = signal_group(pgid, GroupSignal::Terminate);
        assert!(delivery.is_expected(), "got {delivery}");
    }

    #[test]
    fn failed_is_the_only_unexpected_outcome() {
        assert!(SignalDelivery::NoSuchProcess.is_expected());
        assert!(SignalDelivery::Unsupported.is_expected());
        assert!(!SignalDelivery::Failed("EPERM".into()).is_expected());
    }
}
