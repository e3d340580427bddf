use std::collections::HashMap;

use tokio::time::Instant;

use crate::grading::Answer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    NotStarted,
    Running,
    Finished,
}

/// The stored result of the latest submission for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question_id: String,
    pub answer: Answer,
    pub is_correct: bool,
}

#[derive(Debug, Default)]
pub struct QuizState {
    current_index: Option<usize>,
    answers: HashMap<String, AnswerRecord>,
    finished: bool,
    started_at: Option<Instant>,
}

impl QuizState {
    pub fn phase(&self) -> Phase {
        if self.finished {
            Phase::Finished
        } else if self.started_at.is_some() {
            Phase::Running
        } else {
            Phase::NotStarted
        }
    }

    /// Index of the visible question, `None` before the quiz starts.
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn answer(&self, question_id: &str) -> Option<&AnswerRecord> {
        self.answers.get(question_id)
    }

    pub fn answers(&self) -> impl Iterator<Item = &AnswerRecord> {
        self.answers.values()
    }

    pub fn correct_count(&self) -> usize {
        self.answers.values().filter(|record| record.is_correct).count()
    }

    pub(crate) fn mark_started(&mut self, at: Instant) {
        self.started_at = Some(at);
    }

    pub(crate) fn set_current_index(&mut self, index: usize) {
        self.current_index = Some(index);
    }

    /// Stores `record`, replacing any earlier submission for its question.
    pub(crate) fn record(&mut self, record: AnswerRecord) {
        self.answers.insert(record.question_id.clone(), record);
    }

    /// One-way latch. Returns `false` if the quiz was already finished.
    pub(crate) fn latch_finished(&mut self) -> bool {
        !std::mem::replace(&mut self.finished, true)
    }
}
