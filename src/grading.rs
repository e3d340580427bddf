use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::question::{Question, QuestionType};

/// A raw answer as read back from the rendering collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    #[default]
    Empty,
    Single(String),
    Multiple(Vec<String>),
}

impl Answer {
    pub fn single(value: impl Into<String>) -> Self {
        Answer::Single(value.into())
    }

    pub fn multiple<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Answer::Multiple(values.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Answer::Empty => true,
            Answer::Single(value) => value.is_empty(),
            Answer::Multiple(values) => values.is_empty(),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Empty => Ok(()),
            Answer::Single(value) => f.write_str(value),
            Answer::Multiple(values) => f.write_str(&values.join(", ")),
        }
    }
}

/// Grades `answer` against `question`. Pure: no state is consulted.
pub fn grade(question: &Question, answer: &Answer) -> bool {
    if answer.is_empty() {
        return false;
    }

    let correct = question.correct_answer();
    match (question.kind(), answer) {
        (QuestionType::SelectMultiple, Answer::Multiple(given)) => {
            let expected: BTreeSet<&str> = correct.split(',').map(str::trim).collect();
            let given: BTreeSet<&str> = given.iter().map(String::as_str).collect();
            expected == given
        }
        (QuestionType::SelectMultiple, _) => false,
        (QuestionType::Text, Answer::Single(given)) => {
            given.trim().to_lowercase() == correct.trim().to_lowercase()
        }
        // Numbers compare by their text, so "5" and "5.0" differ.
        (
            QuestionType::Choice | QuestionType::TrueFalse | QuestionType::Number,
            Answer::Single(given),
        ) => given == correct,
        _ => false,
    }
}
