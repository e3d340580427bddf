use tokio::sync::mpsc::UnboundedReceiver;
use tracing::instrument;

use crate::{
    engine::{FinishReason, QuizEngine, QuizResults},
    render::{InputSink, Renderer},
    state::Phase,
    timer::Scheduler,
};

/// Everything that can happen to a running quiz. Events are applied one at
/// a time, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    Next,
    Previous,
    Finish,
    Tick,
    /// Raw user input for the visible question.
    Input(String),
}

pub fn dispatch<R, S>(engine: &mut QuizEngine<R, S>, event: QuizEvent)
where
    R: Renderer + InputSink,
    S: Scheduler,
{
    match event {
        QuizEvent::Next => engine.go_next(),
        QuizEvent::Previous => engine.go_previous(),
        QuizEvent::Finish => engine.finish(FinishReason::Completed),
        QuizEvent::Tick => engine.tick(),
        QuizEvent::Input(input) => engine.enter_input(&input),
    }
}

/// Starts the quiz and feeds it events until it finishes. Returns `None` if
/// the quiz could not start or the channel closed first.
#[instrument(level = "info", skip_all, fields(quiz = %engine.id()))]
pub async fn run<R, S>(
    engine: &mut QuizEngine<R, S>,
    events: &mut UnboundedReceiver<QuizEvent>,
) -> Option<QuizResults>
where
    R: Renderer + InputSink,
    S: Scheduler,
{
    engine.start();
    if engine.phase() == Phase::NotStarted {
        return None;
    }

    while !engine.is_finished() {
        let Some(event) = events.recv().await else {
            tracing::warn!("event channel closed before the quiz finished");
            break;
        };
        tracing::trace!(?event, "dispatching");
        dispatch(engine, event);
    }
    engine.outcome().copied()
}

/// Throws away events left over from a previous quiz.
pub fn drain(events: &mut UnboundedReceiver<QuizEvent>) -> usize {
    let mut dropped = 0;
    while events.try_recv().is_ok() {
        dropped += 1;
    }
    dropped
}
