use std::fmt;

use crate::{
    config::{Config, FeedbackMode},
    grading::Answer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextLabel {
    TryAgain,
    FinishQuiz,
    NextQuestion,
    Next,
}

impl NextLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NextLabel::TryAgain => "Try Again",
            NextLabel::FinishQuiz => "Finish Quiz",
            NextLabel::NextQuestion => "Next Question",
            NextLabel::Next => "Next",
        }
    }
}

impl fmt::Display for NextLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label and enablement of the navigation controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub next_label: NextLabel,
    pub next_enabled: bool,
    pub previous_enabled: bool,
}

/// Where the quiz currently stands, as far as the controls care.
#[derive(Debug, Clone, Copy)]
pub struct Position {
    pub index: usize,
    pub total: usize,
    /// The visible question's latest submission was graded incorrect.
    pub marked_incorrect: bool,
}

impl Position {
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }
}

pub fn can_advance(config: &Config, answer: &Answer) -> bool {
    !answer.is_empty() || config.allow_skip
}

pub fn next_label(config: &Config, position: &Position) -> NextLabel {
    if config.feedback_mode == FeedbackMode::Retry && position.marked_incorrect {
        NextLabel::TryAgain
    } else if position.is_last() {
        NextLabel::FinishQuiz
    } else if config.feedback_mode == FeedbackMode::Immediate {
        NextLabel::NextQuestion
    } else {
        NextLabel::Next
    }
}

pub fn control_state(config: &Config, position: &Position, answer: &Answer) -> ControlState {
    ControlState {
        next_label: next_label(config, position),
        next_enabled: can_advance(config, answer),
        previous_enabled: config.allow_back && position.index > 0,
    }
}
