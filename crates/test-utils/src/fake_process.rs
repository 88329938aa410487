use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use audition_runner::supervise::{SignalDelivery, Terminable};
use audition_runner::types::GroupSignal;

/// A scripted stand-in for a supervised process.
///
/// - records every signal delivered to it
/// - exits with a chosen code when it receives a chosen signal
/// - otherwise keeps "running", so waits consume their full budget
#[derive(Debug, Clone, Default)]
pub struct FakeProcess {
    exited: Option<i32>,
    responses: Vec<(GroupSignal, i32)>,
    delivered: Vec<GroupSignal>,
}

impl FakeProcess {
    /// A process that ignores every signal.
    pub fn running() -> Self {
        Self::default()
    }

    /// A process that is already gone.
    pub fn exited(code: i32) -> Self {
        Self {
            exited: Some(code),
            ..Self::default()
        }
    }

    /// Exit with `code` once `signal` arrives.
    pub fn exits_on(mut self, signal: GroupSignal, code: i32) -> Self {
        self.responses.push((signal, code));
        self
    }

    pub fn delivered(&self) -> &[GroupSignal] {
        &self.delivered
    }
}

impl Terminable for FakeProcess {
    fn try_exit(&mut self) -> Option<i32> {
        self.exited
    }

    fn deliver(&mut self, signal: GroupSignal) -> SignalDelivery {
        if self.exited.is_some() {
            return SignalDelivery::NoSuchProcess;
        }
        self.delivered.push(signal);
        if let Some((_, code)) = self.responses.iter().find(|(s, _)| *s == signal) {
            self.exited = Some(*code);
        }
        SignalDelivery::Delivered
    }

    fn wait_for(&mut self, budget: Duration) -> Pin<Box<dyn Future<Output = Option<i32>> + Send + '_>> {
        let exited = self.exited;
        Box::pin(async move {
            if exited.is_none() {
                tokio::time::sleep(budget).await;
            }
            exited
        })
    }
}
