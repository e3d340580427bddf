//! Reading quizzes declared in HTML.
//!
//! A quiz root carries `data-swq-quiz` plus optional `data-swq-*` settings.
//! Each question block carries `data-swq-question-id`, a `<p>` prompt and one
//! element with `data-swq-type`, `data-swq-answer` and, for option based
//! types, a JSON array in `data-swq-options`:
//!
//! ```html
//! <div data-swq-quiz data-swq-feedback-mode="retry" data-swq-timer="60">
//!   <div data-swq-question-id="q1">
//!     <p>Pick the planets</p>
//!     <div data-swq-type="select-multiple" data-swq-answer="Mars, Venus"
//!          data-swq-options='["Mars", "Moon", "Venus"]'></div>
//!   </div>
//! </div>
//! ```

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::{
    config::ConfigOverrides,
    question::{Question, QuestionType},
    store::StoreError,
};

pub const QUIZ_SELECTOR: &str = "[data-swq-quiz]";
const QUESTION_SELECTOR: &str = "[data-swq-question-id]";
const TYPE_SELECTOR: &str = "[data-swq-type]";
const PROMPT_SELECTOR: &str = "p";

const ATTRIBUTE_PREFIX: &str = "data-swq-";
const QUESTION_ID_ATTRIBUTE: &str = "data-swq-question-id";
const TYPE_ATTRIBUTE: &str = "data-swq-type";
const ANSWER_ATTRIBUTE: &str = "data-swq-answer";
const OPTIONS_ATTRIBUTE: &str = "data-swq-options";

pub(crate) fn selector(css: &str) -> Result<Selector, StoreError> {
    Selector::parse(css).map_err(|e| StoreError::Selector {
        selector: css.to_owned(),
        reason: format!("{e:?}"),
    })
}

/// Settings declared as `data-swq-*` attributes on a quiz root.
pub fn config_attributes(root: ElementRef<'_>) -> ConfigOverrides {
    let mut overrides = ConfigOverrides::default();
    for (name, value) in root.value().attrs() {
        if let Some(key) = name.strip_prefix(ATTRIBUTE_PREFIX) {
            overrides.set(&camel_case(key), value);
        }
    }
    overrides
}

/// All well-formed questions below `root`, in document order. Malformed
/// blocks are skipped with a warning.
pub fn questions_in(root: ElementRef<'_>) -> Result<Vec<Question>, StoreError> {
    let blocks = selector(QUESTION_SELECTOR)?;
    let type_selector = selector(TYPE_SELECTOR)?;
    let prompt_selector = selector(PROMPT_SELECTOR)?;

    let mut questions = Vec::new();
    for block in root.select(&blocks) {
        match parse_question(block, &type_selector, &prompt_selector) {
            Ok(question) => questions.push(question),
            Err(e) => tracing::warn!("skipping question: {e}"),
        }
    }
    Ok(questions)
}

/// Questions found anywhere in an HTML fragment.
pub fn questions_in_fragment(html: &str) -> Result<Vec<Question>, StoreError> {
    let fragment = Html::parse_fragment(html);
    questions_in(fragment.root_element())
}

fn parse_question(
    block: ElementRef<'_>,
    type_selector: &Selector,
    prompt_selector: &Selector,
) -> Result<Question, StoreError> {
    let id = block
        .value()
        .attr(QUESTION_ID_ATTRIBUTE)
        .unwrap_or_default()
        .to_owned();

    let Some(type_element) = block.select(type_selector).next() else {
        return Err(StoreError::MissingType { id });
    };
    let type_element = type_element.value();

    let kind: QuestionType = type_element
        .attr(TYPE_ATTRIBUTE)
        .unwrap_or_default()
        .parse()
        .map_err(|source| StoreError::UnknownType {
            id: id.clone(),
            source,
        })?;

    let Some(answer) = type_element.attr(ANSWER_ATTRIBUTE) else {
        return Err(StoreError::MissingAnswer { id });
    };

    let options = match type_element.attr(OPTIONS_ATTRIBUTE) {
        Some(raw) => parse_options(raw).map_err(|reason| StoreError::MalformedOptions {
            id: id.clone(),
            reason,
        })?,
        None => Vec::new(),
    };

    let text = block
        .select(prompt_selector)
        .next()
        .map(|prompt| prompt.inner_html().trim().to_owned())
        .unwrap_or_default();

    Ok(Question::new(id, kind, text, answer, Some(options)))
}

/// Decodes an option list, turning numbers and booleans into their text.
fn parse_options(raw: &str) -> Result<Vec<String>, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    option_values(value)
}

pub(crate) fn option_values(value: Value) -> Result<Vec<String>, String> {
    let items = match value {
        Value::Array(items) => items,
        other => return Err(format!("expected a JSON array, got {other}")),
    };

    items
        .into_iter()
        .map(|item| {
            let shown = item.to_string();
            scalar_text(item).ok_or_else(|| format!("unsupported option {shown}"))
        })
        .collect()
}

/// Text of a JSON string, number or boolean.
pub(crate) fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn camel_case(kebab: &str) -> String {
    let mut parts = kebab.split('-');
    let mut out = parts.next().unwrap_or_default().to_owned();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
