use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

const TRUE_FALSE_CHOICES: [&str; 2] = ["True", "False"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "choice")]
    Choice,
    #[serde(rename = "true/false")]
    TrueFalse,
    #[serde(rename = "select-multiple")]
    SelectMultiple,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "number")]
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown question type '{0}'")]
pub struct UnknownQuestionType(pub String);

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Choice => "choice",
            QuestionType::TrueFalse => "true/false",
            QuestionType::SelectMultiple => "select-multiple",
            QuestionType::Text => "text",
            QuestionType::Number => "number",
        }
    }

    /// Whether answers are picked from a fixed option set.
    pub fn has_choices(&self) -> bool {
        matches!(
            self,
            QuestionType::Choice | QuestionType::TrueFalse | QuestionType::SelectMultiple
        )
    }
}

impl FromStr for QuestionType {
    type Err = UnknownQuestionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "choice" => Ok(QuestionType::Choice),
            "true/false" => Ok(QuestionType::TrueFalse),
            "select-multiple" => Ok(QuestionType::SelectMultiple),
            "text" => Ok(QuestionType::Text),
            "number" => Ok(QuestionType::Number),
            other => Err(UnknownQuestionType(other.to_owned())),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single question definition. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: String,
    #[serde(rename = "type")]
    kind: QuestionType,
    #[serde(alias = "prompt")]
    text: String,
    #[serde(alias = "correctAnswer")]
    answer: String,
    #[serde(default)]
    options: Vec<String>,
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.id, self.text, self.kind)
    }
}

impl Question {
    pub fn new(
        id: impl Into<String>,
        kind: QuestionType,
        text: impl Into<String>,
        answer: impl Into<String>,
        options: Option<Vec<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            text: text.into(),
            answer: answer.into(),
            options: options.unwrap_or_default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> QuestionType {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The correct answer in its type-dependent encoding: a comma separated
    /// list for `select-multiple`, a plain string otherwise.
    pub fn correct_answer(&self) -> &str {
        &self.answer
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Options presented to the user. `true/false` questions ignore their
    /// declared options.
    pub fn choices(&self) -> Vec<&str> {
        match self.kind {
            QuestionType::TrueFalse => TRUE_FALSE_CHOICES.to_vec(),
            QuestionType::Choice | QuestionType::SelectMultiple => {
                self.options.iter().map(String::as_str).collect()
            }
            QuestionType::Text | QuestionType::Number => Vec::new(),
        }
    }
}
