use std::{fmt, time::Duration};

use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::runner::QuizEvent;

/// Remaining quiz time, displayed as `M:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub seconds: u64,
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.seconds / 60, self.seconds % 60)
    }
}

/// Exclusively owned handle of a recurring tick. Once cancelled it never
/// fires again.
pub trait TickHandle {
    fn cancel(&mut self);
}

pub trait Scheduler {
    type Handle: TickHandle;

    /// Starts delivering a tick every `period`, the first one a full period
    /// from now.
    fn every(&mut self, period: Duration) -> Self::Handle;
}

/// Delivers [`QuizEvent::Tick`] into the quiz's event channel from a
/// spawned tokio task.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    events: UnboundedSender<QuizEvent>,
}

impl TokioScheduler {
    pub fn new(events: UnboundedSender<QuizEvent>) -> Self {
        Self { events }
    }
}

impl Scheduler for TokioScheduler {
    type Handle = TokioTick;

    fn every(&mut self, period: Duration) -> TokioTick {
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if events.send(QuizEvent::Tick).is_err() {
                    tracing::debug!("event channel closed, stopping ticks");
                    break;
                }
            }
        });
        TokioTick { task: Some(task) }
    }
}

#[derive(Debug)]
pub struct TokioTick {
    task: Option<JoinHandle<()>>,
}

impl TickHandle for TokioTick {
    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TokioTick {
    fn drop(&mut self) {
        self.cancel();
    }
}
