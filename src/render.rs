use std::fmt;

use crate::{
    config::FeedbackMode,
    controls::ControlState,
    engine::QuizResults,
    grading::Answer,
    question::Question,
    state::AnswerRecord,
    timer::Remaining,
};

/// Correctness feedback shown for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    TryAgain,
    Incorrect { correct_answer: String },
}

impl Feedback {
    pub fn for_submission(mode: FeedbackMode, question: &Question, is_correct: bool) -> Self {
        match (is_correct, mode) {
            (true, _) => Feedback::Correct,
            (false, FeedbackMode::Retry) => Feedback::TryAgain,
            (false, _) => Feedback::Incorrect {
                correct_answer: question.correct_answer().to_owned(),
            },
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Feedback::Correct)
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::Correct => f.write_str("Correct!"),
            Feedback::TryAgain => f.write_str("Incorrect. Please try again."),
            Feedback::Incorrect { correct_answer } => {
                write!(f, "Incorrect. The correct answer is: {correct_answer}")
            }
        }
    }
}

/// Presentation collaborator driven by the engine.
///
/// Implementations own every visible element. Controls built for a
/// question should be kept and updated in place when the question is shown
/// again, so restored values survive navigation.
pub trait Renderer {
    /// Shows question `index` of `total`, hiding the others, and restores
    /// `prior` into its controls when present.
    fn render_question(
        &mut self,
        question: &Question,
        index: usize,
        total: usize,
        prior: Option<&AnswerRecord>,
    );

    /// Reads back what is currently entered for `question`, in the shape
    /// its type calls for.
    fn collect_answer(&self, question: &Question) -> Answer;

    fn show_feedback(&mut self, question: &Question, feedback: &Feedback);

    fn disable_inputs(&mut self, question: &Question);

    fn update_controls(&mut self, controls: &ControlState);

    fn update_timer(&mut self, remaining: Remaining);

    /// Hides questions, controls and the timer once the quiz is over.
    fn hide_quiz(&mut self);

    fn show_results(&mut self, results: &QuizResults);
}

/// Renderers that take raw user input for the visible question.
pub trait InputSink {
    fn accept_input(&mut self, question: &Question, input: &str);
}
