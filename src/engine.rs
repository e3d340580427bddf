use std::{fmt, time::Duration};

use serde::Serialize;
use tokio::time::Instant;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    config::{Config, FeedbackMode},
    controls::{self, Position},
    grading::{self, Answer},
    question::Question,
    render::{Feedback, InputSink, Renderer},
    state::{AnswerRecord, Phase, QuizState},
    timer::{Remaining, Scheduler, TickHandle},
};

const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Completed,
    TimeUp,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishReason::Completed => f.write_str("completed"),
            FinishReason::TimeUp => f.write_str("time_up"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizResults {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub reason: FinishReason,
}

impl QuizResults {
    pub fn new(score: usize, total: usize, reason: FinishReason) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            (score as f64 * 100.0 / total as f64).round() as u32
        };
        Self {
            score,
            total,
            percentage,
            reason,
        }
    }
}

impl fmt::Display for QuizResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "You scored {} out of {} ({}%).",
            self.score, self.total, self.percentage
        )
    }
}

type StartHook = Box<dyn FnMut()>;
type QuestionChangeHook = Box<dyn FnMut(&Question, usize)>;
type CompleteHook = Box<dyn FnMut(&QuizResults)>;

/// Notifications fired synchronously by the engine.
#[derive(Default)]
pub struct Hooks {
    on_start: Option<StartHook>,
    on_question_change: Option<QuestionChangeHook>,
    on_complete: Option<CompleteHook>,
}

impl Hooks {
    pub fn on_start(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    pub fn on_question_change(mut self, hook: impl FnMut(&Question, usize) + 'static) -> Self {
        self.on_question_change = Some(Box::new(hook));
        self
    }

    pub fn on_complete(mut self, hook: impl FnMut(&QuizResults) + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_start", &self.on_start.is_some())
            .field("on_question_change", &self.on_question_change.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// The quiz state machine: `NotStarted -> Running -> Finished`.
///
/// Every command runs to completion and commands that make no sense in the
/// current state are ignored.
pub struct QuizEngine<R, S: Scheduler> {
    id: Uuid,
    config: Config,
    questions: Vec<Question>,
    state: QuizState,
    outcome: Option<QuizResults>,
    timer: Option<S::Handle>,
    renderer: R,
    scheduler: S,
    hooks: Hooks,
}

impl<R: Renderer, S: Scheduler> QuizEngine<R, S> {
    pub fn new(config: Config, questions: Vec<Question>, renderer: R, scheduler: S) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            questions,
            state: QuizState::default(),
            outcome: None,
            timer: None,
            renderer,
            scheduler,
            hooks: Hooks::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Results published when the quiz finished.
    pub fn outcome(&self) -> Option<&QuizResults> {
        self.outcome.as_ref()
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.state
            .current_index()
            .and_then(|index| self.questions.get(index))
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Starts the quiz on its first question. Ignored unless the quiz has
    /// not started yet and has at least one question.
    #[instrument(level = "debug", skip(self), fields(quiz = %self.id))]
    pub fn start(&mut self) {
        if self.phase() != Phase::NotStarted {
            tracing::debug!("start ignored, quiz is {:?}", self.phase());
            return;
        }
        if self.questions.is_empty() {
            tracing::warn!("start ignored, quiz has no questions");
            return;
        }

        self.state.mark_started(Instant::now());
        if self.config.timer_seconds > 0 {
            self.renderer.update_timer(Remaining {
                seconds: u64::from(self.config.timer_seconds),
            });
            self.timer = Some(self.scheduler.every(TICK_PERIOD));
        }
        tracing::info!(
            questions = self.questions.len(),
            mode = %self.config.feedback_mode,
            timer = self.config.timer_seconds,
            "quiz started"
        );

        self.render_question(0);
        if let Some(hook) = self.hooks.on_start.as_mut() {
            hook();
        }
    }

    /// Grades the visible question and applies the feedback policy.
    #[instrument(level = "debug", skip(self), fields(quiz = %self.id))]
    pub fn go_next(&mut self) {
        if self.phase() != Phase::Running {
            tracing::debug!("next ignored, quiz is {:?}", self.phase());
            return;
        }
        let Some(index) = self.state.current_index() else {
            return;
        };

        let question = &self.questions[index];
        let answer = self.renderer.collect_answer(question);
        if !controls::can_advance(&self.config, &answer) {
            tracing::debug!(question = question.id(), "next ignored, no answer given");
            return;
        }

        let is_correct = grading::grade(question, &answer);
        tracing::info!(question = question.id(), %answer, is_correct, "answer submitted");
        self.state.record(AnswerRecord {
            question_id: question.id().to_owned(),
            answer,
            is_correct,
        });

        self.apply_feedback_policy(index, is_correct);
    }

    #[instrument(level = "debug", skip(self), fields(quiz = %self.id))]
    pub fn go_previous(&mut self) {
        if self.phase() != Phase::Running || !self.config.allow_back {
            tracing::debug!("previous ignored");
            return;
        }
        match self.state.current_index() {
            Some(index) if index > 0 => self.render_question(index - 1),
            _ => tracing::debug!("previous ignored, already on the first question"),
        }
    }

    /// Ends the quiz and publishes the results. Only the first call has any
    /// effect.
    #[instrument(level = "debug", skip(self), fields(quiz = %self.id))]
    pub fn finish(&mut self, reason: FinishReason) {
        if !self.state.latch_finished() {
            tracing::debug!("finish ignored, quiz already finished");
            return;
        }
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }

        if self.config.feedback_mode == FeedbackMode::Standard {
            for question in &self.questions {
                if let Some(record) = self.state.answer(question.id()) {
                    let feedback = Feedback::for_submission(
                        FeedbackMode::Standard,
                        question,
                        record.is_correct,
                    );
                    self.renderer.show_feedback(question, &feedback);
                }
            }
        }
        self.renderer.hide_quiz();

        let results = self.results(reason);
        tracing::info!(
            score = results.score,
            total = results.total,
            percentage = results.percentage,
            %reason,
            "quiz finished"
        );
        self.renderer.show_results(&results);
        self.outcome = Some(results);
        if let Some(hook) = self.hooks.on_complete.as_mut() {
            hook(&results);
        }
    }

    /// One timer tick. Finishes the quiz once the time limit is reached,
    /// otherwise updates the remaining time.
    pub fn tick(&mut self) {
        if self.phase() != Phase::Running || self.config.timer_seconds == 0 {
            tracing::trace!(quiz = %self.id, "tick ignored");
            return;
        }
        let Some(started_at) = self.state.started_at() else {
            return;
        };

        let limit = u64::from(self.config.timer_seconds);
        let elapsed = Instant::now().saturating_duration_since(started_at).as_secs();
        if elapsed >= limit {
            self.finish(FinishReason::TimeUp);
        } else {
            self.renderer.update_timer(Remaining {
                seconds: limit - elapsed,
            });
        }
    }

    /// Recomputes the controls from what is currently entered. Called by the
    /// environment whenever an input changes.
    pub fn refresh_controls(&mut self) {
        if self.phase() == Phase::Running {
            self.sync_controls();
        }
    }

    /// Cancels the timer without finishing the quiz.
    pub fn teardown(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            tracing::debug!(quiz = %self.id, "timer cancelled on teardown");
            timer.cancel();
        }
    }

    pub fn results(&self, reason: FinishReason) -> QuizResults {
        let score = self
            .questions
            .iter()
            .filter(|question| {
                self.state
                    .answer(question.id())
                    .is_some_and(|record| record.is_correct)
            })
            .count();
        QuizResults::new(score, self.questions.len(), reason)
    }

    fn apply_feedback_policy(&mut self, index: usize, is_correct: bool) {
        let mode = self.config.feedback_mode;
        let question = &self.questions[index];
        match mode {
            FeedbackMode::Standard => {}
            FeedbackMode::Immediate => {
                let feedback = Feedback::for_submission(mode, question, is_correct);
                self.renderer.show_feedback(question, &feedback);
                self.renderer.disable_inputs(question);
            }
            FeedbackMode::Retry => {
                let feedback = Feedback::for_submission(mode, question, is_correct);
                self.renderer.show_feedback(question, &feedback);
                if !is_correct {
                    self.sync_controls();
                    return;
                }
            }
        }
        self.advance(index);
    }

    fn advance(&mut self, index: usize) {
        if index + 1 < self.questions.len() {
            self.render_question(index + 1);
        } else {
            self.finish(FinishReason::Completed);
        }
    }

    fn render_question(&mut self, index: usize) {
        let Some(question) = self.questions.get(index) else {
            return;
        };
        self.state.set_current_index(index);
        let prior = self.state.answer(question.id());
        tracing::debug!(quiz = %self.id, index, question = question.id(), "rendering question");
        self.renderer
            .render_question(question, index, self.questions.len(), prior);
        self.sync_controls();

        if let Some(hook) = self.hooks.on_question_change.as_mut() {
            hook(&self.questions[index], index);
        }
    }

    fn sync_controls(&mut self) {
        let Some(index) = self.state.current_index() else {
            return;
        };
        let question = &self.questions[index];
        let answer: Answer = self.renderer.collect_answer(question);
        let position = Position {
            index,
            total: self.questions.len(),
            marked_incorrect: self
                .state
                .answer(question.id())
                .is_some_and(|record| !record.is_correct),
        };
        let controls = controls::control_state(&self.config, &position, &answer);
        self.renderer.update_controls(&controls);
    }
}

impl<R: Renderer + InputSink, S: Scheduler> QuizEngine<R, S> {
    /// Hands raw user input to the visible question's controls.
    pub fn enter_input(&mut self, input: &str) {
        if self.phase() != Phase::Running {
            return;
        }
        let Some(index) = self.state.current_index() else {
            return;
        };
        self.renderer.accept_input(&self.questions[index], input);
        self.sync_controls();
    }
}

impl<R, S: Scheduler> fmt::Debug for QuizEngine<R, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizEngine")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("questions", &self.questions.len())
            .field("state", &self.state)
            .field("outcome", &self.outcome)
            .field("timer", &self.timer.is_some())
            .finish()
    }
}
