// src/supervise/plan.rs

//! Ordered signal escalation with bounded waits.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::debug;

use crate::config::{CaptureSettings, EscalationBudgets};
use crate::supervise::signal::SignalDelivery;
use crate::types::GroupSignal;

/// Something a [`TerminationPlan`] can be applied to.
///
/// Implemented by [`super::SupervisedProcess`]; tests provide scripted fakes.
pub trait Terminable: Send {
    /// Exit code if the process has already exited, without blocking.
    fn try_exit(&mut self) -> Option<i32>;

    /// Send one signal.
    fn deliver(&mut self, signal: GroupSignal) -> SignalDelivery;

    /// Wait up to `budget` for exit; `None` if still running afterwards.
    fn wait_for(&mut self, budget: Duration) -> Pin<Box<dyn Future<Output = Option<i32>> + Send + '_>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationStep {
    pub signal: GroupSignal,
    pub wait: Duration,
}

impl EscalationStep {
    pub fn new(signal: GroupSignal, wait: Duration) -> Self {
        Self { signal, wait }
    }
}

/// Steps run strictly in order; a step only runs while the process is still
/// alive after the previous step's wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminationPlan {
    steps: Vec<EscalationStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationOutcome {
    /// Gone before the first signal was needed.
    AlreadyExited { code: i32 },
    /// Exited during the wait that followed `after`.
    Exited { code: i32, after: GroupSignal },
    /// Still not reaped when the plan ran out.
    Unconfirmed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escalation {
    /// Signals in the order they were sent.
    pub signals_sent: Vec<GroupSignal>,
    pub outcome: EscalationOutcome,
}

impl Escalation {
    pub fn exit_code(&self) -> Option<i32> {
        match self.outcome {
            EscalationOutcome::AlreadyExited { code } | EscalationOutcome::Exited { code, .. } => {
                Some(code)
            }
            EscalationOutcome::Unconfirmed => None,
        }
    }
}

impl TerminationPlan {
    pub fn new(steps: Vec<EscalationStep>) -> Self {
        Self { steps }
    }

    /// Terminate then kill, for a timed-out engine's process group.
    pub fn for_engine(budgets: EscalationBudgets) -> Self {
        Self::new(vec![
            EscalationStep::new(GroupSignal::Terminate, budgets.terminate_wait),
            EscalationStep::new(GroupSignal::Kill, budgets.kill_wait),
        ])
    }

    /// Interrupt, terminate, kill, for the recorder. Interrupt comes first so
    /// the tool can finalize its output file.
    pub fn for_capture(settings: &CaptureSettings) -> Self {
        Self::new(vec![
            EscalationStep::new(GroupSignal::Interrupt, settings.interrupt_wait),
            EscalationStep::new(GroupSignal::Terminate, settings.terminate_wait),
            EscalationStep::new(GroupSignal::Kill, settings.kill_wait),
        ])
    }

    pub fn steps(&self) -> &[EscalationStep] {
        &self.steps
    }

    /// Upper bound on the time spent in [`TerminationPlan::execute`].
    pub fn total_wait(&self) -> Duration {
        self.steps.iter().map(|s| s.wait).sum()
    }

    pub async fn execute<T: Terminable + ?Sized>(&self, target: &mut T) -> Escalation {
        let mut signals_sent = Vec::with_capacity(self.steps.len());

        if let Some(code) = target.try_exit() {
            return Escalation {
                signals_sent,
                outcome: EscalationOutcome::AlreadyExited { code },
            };
        }

        for step in &self.steps {
            target.deliver(step.signal);
            signals_sent.push(step.signal);

            if let Some(code) = target.wait_for(step.wait).await {
                debug!(signal = %step.signal, code, "process exited during escalation");
                return Escalation {
                    signals_sent,
                    outcome: EscalationOutcome::Exited {
                        code,
                        after: step.signal,
                    },
                };
            }
            debug!(signal = %step.signal, wait = ?step.wait, "process still alive after wait");
        }

        Escalation {
            signals_sent,
            outcome: EscalationOutcome::Unconfirmed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_plan_is_terminate_then_kill() {
        let plan = TerminationPlan::for_engine(EscalationBudgets {
            terminate_wait: Duration::from_secs(5),
            kill_wait: Duration::from_secs(2),
        });
        let signals: Vec<_> = plan.steps().iter().map(|s| s.signal).collect();
        assert_eq!(signals, vec![GroupSignal::Terminate, GroupSignal::Kill]);
        assert_eq!(plan.total_wait(), Duration::from_secs(7));
    }

    #[test]
    fn exit_code_follows_outcome() {
        let esc = Escalation {
            signals_sent: vec![GroupSignal::Terminate],
            outcome: EscalationOutcome::Exited { code: 143, after: GroupSignal::Terminate },
        };
        assert_eq!(esc.exit_code(), Some(143));

        let esc = Escalation {
            signals_sent: vec![],
            outcome: EscalationOutcome::Unconfirmed,
        };
        assert_eq!(esc.exit_code(), None);
    }
}
