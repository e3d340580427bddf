use std::{
    collections::HashMap,
    fmt,
    io::{self, Write},
};

use scraper::Html;

use crate::{
    controls::ControlState,
    engine::{FinishReason, QuizResults},
    grading::Answer,
    question::{Question, QuestionType},
    render::{Feedback, InputSink, Renderer},
    state::AnswerRecord,
    timer::Remaining,
};

/// What the terminal keeps for one question between visits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionView {
    pub draft: Answer,
    pub locked: bool,
    pub feedback: Option<Feedback>,
}

/// Plain-text front end writing to any [`Write`].
#[derive(Debug)]
pub struct TerminalRenderer<W> {
    out: W,
    views: HashMap<String, QuestionView>,
    visible: Option<String>,
    controls: Option<ControlState>,
    timer_shown: Option<u64>,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            views: HashMap::new(),
            visible: None,
            controls: None,
            timer_shown: None,
        }
    }

    pub fn view(&self, question_id: &str) -> Option<&QuestionView> {
        self.views.get(question_id)
    }

    pub fn visible(&self) -> Option<&str> {
        self.visible.as_deref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(args).and_then(|()| self.out.flush()) {
            tracing::warn!("failed to write to terminal: {e}");
        }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render_question(
        &mut self,
        question: &Question,
        index: usize,
        total: usize,
        prior: Option<&AnswerRecord>,
    ) {
        let view = self
            .views
            .entry(question.id().to_owned())
            .or_insert_with(|| {
                tracing::trace!(question = question.id(), "building view");
                QuestionView::default()
            });
        if let Some(record) = prior {
            view.draft = record.answer.clone();
        }
        let draft = view.draft.clone();
        let locked = view.locked;

        self.visible = Some(question.id().to_owned());
        self.controls = None;

        self.emit(format_args!(
            "\nQuestion {}/{}\n{}\n",
            index + 1,
            total,
            plain_text(question.text())
        ));
        for (position, choice) in question.choices().iter().enumerate() {
            self.emit(format_args!("  {}) {}\n", position + 1, choice));
        }
        if !draft.is_empty() {
            self.emit(format_args!("Current answer: {draft}\n"));
        }
        if locked {
            self.emit(format_args!("(answered, inputs locked)\n"));
        }
    }

    fn collect_answer(&self, question: &Question) -> Answer {
        self.views
            .get(question.id())
            .map(|view| view.draft.clone())
            .unwrap_or_default()
    }

    fn show_feedback(&mut self, question: &Question, feedback: &Feedback) {
        if let Some(view) = self.views.get_mut(question.id()) {
            view.feedback = Some(feedback.clone());
        }
        // Every feedback line names its question.
        self.emit(format_args!("{}: {feedback}\n", plain_text(question.text())));
    }

    fn disable_inputs(&mut self, question: &Question) {
        if let Some(view) = self.views.get_mut(question.id()) {
            view.locked = true;
        }
    }

    fn update_controls(&mut self, controls: &ControlState) {
        if self.controls.as_ref() == Some(controls) {
            return;
        }
        self.controls = Some(*controls);

        let previous = if controls.previous_enabled {
            "[/prev] Previous"
        } else {
            "[/prev] Previous (disabled)"
        };
        let next = if controls.next_enabled { "" } else { " (disabled)" };
        self.emit(format_args!(
            "{previous}   [Enter] {}{next}\n",
            controls.next_label
        ));
    }

    fn update_timer(&mut self, remaining: Remaining) {
        let due = match self.timer_shown {
            None => true,
            Some(_) => remaining.seconds <= 10 || remaining.seconds % 10 == 0,
        };
        if due && self.timer_shown != Some(remaining.seconds) {
            self.timer_shown = Some(remaining.seconds);
            self.emit(format_args!("Time left: {remaining}\n"));
        }
    }

    fn hide_quiz(&mut self) {
        self.visible = None;
        self.controls = None;
        self.emit(format_args!("----------------------------------------\n"));
    }

    fn show_results(&mut self, results: &QuizResults) {
        self.emit(format_args!("Quiz Complete!\n{results}\n"));
        if results.reason == FinishReason::TimeUp {
            self.emit(format_args!("Time ran out!\n"));
        }
    }
}

impl<W: Write> InputSink for TerminalRenderer<W> {
    fn accept_input(&mut self, question: &Question, input: &str) {
        let locked = self
            .views
            .get(question.id())
            .is_some_and(|view| view.locked);
        if locked {
            self.emit(format_args!("Answers to this question are locked.\n"));
            return;
        }

        let answer = parse_answer(question, input);
        if answer.is_empty() && !input.trim().is_empty() {
            self.emit(format_args!("'{}' is not a valid answer here.\n", input.trim()));
        }
        self.views
            .entry(question.id().to_owned())
            .or_default()
            .draft = answer;
    }
}

/// Turns typed text into the answer shape of `question`'s type. Options are
/// picked by 1-based number or by case-insensitive text; anything else
/// leaves the question unanswered.
pub fn parse_answer(question: &Question, input: &str) -> Answer {
    let input = input.trim();
    match question.kind() {
        QuestionType::Choice | QuestionType::TrueFalse => match pick(&question.choices(), input) {
            Some(choice) => Answer::single(choice),
            None => Answer::Empty,
        },
        QuestionType::SelectMultiple => {
            let choices = question.choices();
            let mut picked: Vec<String> = Vec::new();
            for part in input.split(',') {
                if let Some(choice) = pick(&choices, part.trim()) {
                    if !picked.iter().any(|p| p == choice) {
                        picked.push(choice.to_owned());
                    }
                }
            }
            Answer::Multiple(picked)
        }
        QuestionType::Text if input.is_empty() => Answer::Empty,
        QuestionType::Text => Answer::single(input),
        QuestionType::Number => match input.parse::<f64>() {
            Ok(value) if value.is_finite() => Answer::single(input),
            _ => Answer::Empty,
        },
    }
}

fn pick<'a>(choices: &[&'a str], input: &str) -> Option<&'a str> {
    if input.is_empty() {
        return None;
    }
    if let Ok(number) = input.parse::<usize>() {
        if let Some(choice) = number.checked_sub(1).and_then(|i| choices.get(i).copied()) {
            return Some(choice);
        }
    }
    let input = input.to_lowercase();
    choices
        .iter()
        .copied()
        .find(|choice| choice.to_lowercase() == input)
}

/// Prompts may carry inline HTML; the terminal shows their text only.
fn plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
