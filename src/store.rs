use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    config::ConfigOverrides,
    markup,
    question::{Question, QuestionType, UnknownQuestionType},
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("question '{id}' has no type")]
    MissingType { id: String },

    #[error("question '{id}': {source}")]
    UnknownType {
        id: String,
        #[source]
        source: UnknownQuestionType,
    },

    #[error("question '{id}' has no answer")]
    MissingAnswer { id: String },

    #[error("question '{id}' has malformed options: {reason}")]
    MalformedOptions { id: String, reason: String },

    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Where a quiz gets its questions from. The two modes never mix.
#[derive(Debug, Clone)]
pub enum QuestionSource<'a> {
    /// Taken verbatim.
    List(Vec<Question>),
    /// Question blocks parsed out of HTML.
    Markup(&'a str),
}

/// Loads the ordered question sequence. Definition problems never abort the
/// load: bad blocks are skipped, and an unusable source yields no questions.
#[tracing::instrument(level = "debug", skip_all)]
pub fn load(source: QuestionSource<'_>) -> Vec<Question> {
    let questions = match source {
        QuestionSource::List(questions) => questions,
        QuestionSource::Markup(html) => match markup::questions_in_fragment(html) {
            Ok(questions) => questions,
            Err(e) => {
                tracing::error!("failed to read questions from markup: {e}");
                Vec::new()
            }
        },
    };
    tracing::debug!("loaded {} questions", questions.len());
    questions
}

/// A quiz stored as JSON: optional settings and an explicit question list.
///
/// Only malformed JSON fails the whole document. Settings with bad values
/// keep their defaults and bad questions are skipped, both with a warning.
#[derive(Debug, Clone, Default)]
pub struct QuizDocument {
    pub settings: ConfigOverrides,
    pub questions: Vec<Question>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDocument {
    settings: Map<String, Value>,
    questions: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    id: Value,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default, alias = "prompt")]
    text: String,
    #[serde(default, alias = "correctAnswer")]
    answer: Value,
    #[serde(default)]
    options: Value,
}

impl RawQuestion {
    fn into_question(self) -> Result<Question, StoreError> {
        let id = markup::scalar_text(self.id).unwrap_or_default();
        let Some(kind) = self.kind else {
            return Err(StoreError::MissingType { id });
        };
        let kind: QuestionType = kind.parse().map_err(|source| StoreError::UnknownType {
            id: id.clone(),
            source,
        })?;
        let Some(answer) = markup::scalar_text(self.answer) else {
            return Err(StoreError::MissingAnswer { id });
        };
        let options = match self.options {
            Value::Null => Vec::new(),
            value => markup::option_values(value)
                .map_err(|reason| StoreError::MalformedOptions {
                    id: id.clone(),
                    reason,
                })?,
        };
        Ok(Question::new(id, kind, self.text, answer, Some(options)))
    }
}

impl QuizDocument {
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let raw: RawDocument = serde_json::from_str(json)?;

        let mut settings = ConfigOverrides::default();
        for (key, value) in raw.settings {
            match markup::scalar_text(value) {
                Some(value) => settings.set(&key, &value),
                None => tracing::warn!("ignoring setting '{key}': not a plain value"),
            }
        }

        let questions = raw
            .questions
            .into_iter()
            .enumerate()
            .filter_map(|(position, value)| {
                let question = serde_json::from_value::<RawQuestion>(value)
                    .map_err(StoreError::from)
                    .and_then(RawQuestion::into_question);
                match question {
                    Ok(question) => Some(question),
                    Err(e) => {
                        tracing::warn!(position, "skipping question: {e}");
                        None
                    }
                }
            })
            .collect();

        Ok(Self {
            settings,
            questions,
        })
    }
}
