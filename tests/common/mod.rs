#![allow(dead_code)]

use std::{cell::Cell, collections::HashMap, rc::Rc, time::Duration};

use quizdeck::{
    config::Config,
    controls::ControlState,
    engine::{QuizEngine, QuizResults},
    grading::Answer,
    question::{Question, QuestionType},
    render::{Feedback, InputSink, Renderer},
    state::AnswerRecord,
    timer::{Remaining, Scheduler, TickHandle},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Render {
        id: String,
        index: usize,
        prior: Option<Answer>,
    },
    Feedback {
        id: String,
        feedback: Feedback,
    },
    Disable(String),
    Controls(ControlState),
    Timer(u64),
    Hide,
    Results(QuizResults),
}

/// Renderer that records every call and answers from a map the test fills.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub events: Vec<Event>,
    entered: HashMap<String, Answer>,
}

impl RecordingRenderer {
    pub fn enter(&mut self, question_id: &str, answer: Answer) {
        self.entered.insert(question_id.to_owned(), answer);
    }

    pub fn renders(&self) -> Vec<(String, usize)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Render { id, index, .. } => Some((id.clone(), *index)),
                _ => None,
            })
            .collect()
    }

    pub fn feedback(&self) -> Vec<(String, Feedback)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Feedback { id, feedback } => Some((id.clone(), feedback.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn last_controls(&self) -> Option<ControlState> {
        self.events.iter().rev().find_map(|event| match event {
            Event::Controls(controls) => Some(*controls),
            _ => None,
        })
    }

    pub fn results(&self) -> Vec<QuizResults> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Results(results) => Some(*results),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn render_question(
        &mut self,
        question: &Question,
        index: usize,
        _total: usize,
        prior: Option<&AnswerRecord>,
    ) {
        if let Some(record) = prior {
            self.entered
                .insert(question.id().to_owned(), record.answer.clone());
        }
        self.events.push(Event::Render {
            id: question.id().to_owned(),
            index,
            prior: prior.map(|record| record.answer.clone()),
        });
    }

    fn collect_answer(&self, question: &Question) -> Answer {
        self.entered.get(question.id()).cloned().unwrap_or_default()
    }

    fn show_feedback(&mut self, question: &Question, feedback: &Feedback) {
        self.events.push(Event::Feedback {
            id: question.id().to_owned(),
            feedback: feedback.clone(),
        });
    }

    fn disable_inputs(&mut self, question: &Question) {
        self.events.push(Event::Disable(question.id().to_owned()));
    }

    fn update_controls(&mut self, controls: &ControlState) {
        self.events.push(Event::Controls(*controls));
    }

    fn update_timer(&mut self, remaining: Remaining) {
        self.events.push(Event::Timer(remaining.seconds));
    }

    fn hide_quiz(&mut self) {
        self.events.push(Event::Hide);
    }

    fn show_results(&mut self, results: &QuizResults) {
        self.events.push(Event::Results(*results));
    }
}

impl InputSink for RecordingRenderer {
    fn accept_input(&mut self, question: &Question, input: &str) {
        self.enter(question.id(), Answer::single(input));
    }
}

/// Scheduler that never fires on its own; tests call `tick()` themselves.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    pub started: Rc<Cell<usize>>,
    pub cancelled: Rc<Cell<usize>>,
}

#[derive(Debug)]
pub struct ManualTick {
    cancelled: Rc<Cell<usize>>,
    active: bool,
}

impl TickHandle for ManualTick {
    fn cancel(&mut self) {
        if std::mem::replace(&mut self.active, false) {
            self.cancelled.set(self.cancelled.get() + 1);
        }
    }
}

impl Scheduler for ManualScheduler {
    type Handle = ManualTick;

    fn every(&mut self, period: Duration) -> ManualTick {
        assert_eq!(period, Duration::from_secs(1));
        self.started.set(self.started.get() + 1);
        ManualTick {
            cancelled: self.cancelled.clone(),
            active: true,
        }
    }
}

pub type TestEngine = QuizEngine<RecordingRenderer, ManualScheduler>;

pub fn text_question(id: &str, answer: &str) -> Question {
    Question::new(id, QuestionType::Text, format!("Question {id}"), answer, None)
}

/// `count` text questions whose correct answers are `a0`, `a1`, ...
pub fn text_questions(count: usize) -> Vec<Question> {
    (0..count)
        .map(|i| text_question(&format!("q{i}"), &format!("a{i}")))
        .collect()
}

pub fn engine(config: Config, questions: Vec<Question>) -> (TestEngine, ManualScheduler) {
    let scheduler = ManualScheduler::default();
    let engine = QuizEngine::new(
        config,
        questions,
        RecordingRenderer::default(),
        scheduler.clone(),
    );
    (engine, scheduler)
}

/// Enters `answer` for the visible question and presses Next.
pub fn answer_current(engine: &mut TestEngine, answer: Answer) {
    let id = engine
        .current_question()
        .map(|question| question.id().to_owned())
        .expect("a question is visible");
    engine.renderer_mut().enter(&id, answer);
    engine.go_next();
}
