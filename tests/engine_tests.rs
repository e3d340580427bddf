mod common;

use std::{cell::Cell, cell::RefCell, rc::Rc, time::Duration};

use common::{answer_current, engine, text_questions, Event};
use quizdeck::{
    config::{Config, FeedbackMode},
    controls::NextLabel,
    engine::{FinishReason, Hooks, QuizResults},
    grading::Answer,
    render::Feedback,
    state::Phase,
};

fn mode(feedback_mode: FeedbackMode) -> Config {
    Config {
        feedback_mode,
        ..Config::default()
    }
}

#[test]
fn standard_run_renders_each_question_once_and_finishes_once() {
    let completed = Rc::new(Cell::new(0));
    let started = Rc::new(Cell::new(0));
    let visited = Rc::new(RefCell::new(Vec::new()));

    let (engine, _) = engine(Config::default(), text_questions(3));
    let hooks = Hooks::default()
        .on_start({
            let started = started.clone();
            move || started.set(started.get() + 1)
        })
        .on_question_change({
            let visited = visited.clone();
            move |_, index| visited.borrow_mut().push(index)
        })
        .on_complete({
            let completed = completed.clone();
            move |_| completed.set(completed.get() + 1)
        });
    let mut engine = engine.with_hooks(hooks);

    engine.start();
    for i in 0..3 {
        answer_current(&mut engine, Answer::single(format!("a{i}")));
    }

    assert_eq!(engine.renderer().renders().len(), 3);
    assert_eq!(*visited.borrow(), vec![0, 1, 2]);
    assert_eq!(started.get(), 1);
    assert_eq!(completed.get(), 1);
    assert_eq!(engine.phase(), Phase::Finished);
    assert_eq!(
        engine.outcome(),
        Some(&QuizResults::new(3, 3, FinishReason::Completed))
    );
}

#[test]
fn commands_before_start_are_ignored() {
    let (mut engine, _) = engine(Config::default(), text_questions(2));
    engine.go_next();
    engine.go_previous();
    engine.tick();
    engine.refresh_controls();

    assert_eq!(engine.phase(), Phase::NotStarted);
    assert_eq!(engine.state().current_index(), None);
    assert!(engine.renderer().events.is_empty());
}

#[test]
fn empty_quiz_never_starts() {
    let started = Rc::new(Cell::new(false));
    let (engine, _) = engine(Config::default(), Vec::new());
    let mut engine = engine.with_hooks(Hooks::default().on_start({
        let started = started.clone();
        move || started.set(true)
    }));

    engine.start();
    assert_eq!(engine.phase(), Phase::NotStarted);
    assert!(!started.get());
    assert!(engine.renderer().events.is_empty());
}

#[test]
fn second_start_is_a_no_op() {
    let (mut engine, _) = engine(Config::default(), text_questions(2));
    engine.start();
    engine.start();
    assert_eq!(engine.renderer().renders(), vec![("q0".to_owned(), 0)]);
}

#[test]
fn retry_holds_on_a_wrong_answer_until_it_is_right() {
    let (mut engine, _) = engine(mode(FeedbackMode::Retry), text_questions(2));
    engine.start();
    assert_eq!(
        engine.renderer().last_controls().map(|c| c.next_label),
        Some(NextLabel::Next)
    );

    answer_current(&mut engine, Answer::single("wrong"));
    assert_eq!(engine.state().current_index(), Some(0));
    assert_eq!(
        engine.renderer().last_controls().map(|c| c.next_label),
        Some(NextLabel::TryAgain)
    );

    answer_current(&mut engine, Answer::single("nope"));
    assert_eq!(engine.state().current_index(), Some(0));

    answer_current(&mut engine, Answer::single("A0"));
    assert_eq!(engine.state().current_index(), Some(1));
    assert_eq!(
        engine.renderer().last_controls().map(|c| c.next_label),
        Some(NextLabel::FinishQuiz)
    );

    let feedback: Vec<Feedback> = engine
        .renderer()
        .feedback()
        .into_iter()
        .map(|(_, feedback)| feedback)
        .collect();
    assert_eq!(
        feedback,
        vec![Feedback::TryAgain, Feedback::TryAgain, Feedback::Correct]
    );
    assert!(engine.state().answer("q0").is_some_and(|r| r.is_correct));
}

#[test]
fn immediate_mode_reveals_locks_and_moves_on() {
    let (mut engine, _) = engine(mode(FeedbackMode::Immediate), text_questions(2));
    engine.start();
    assert_eq!(
        engine.renderer().last_controls().map(|c| c.next_label),
        Some(NextLabel::NextQuestion)
    );

    answer_current(&mut engine, Answer::single("wrong"));
    assert_eq!(engine.state().current_index(), Some(1));

    let events = &engine.renderer().events;
    let feedback_at = events
        .iter()
        .position(|e| {
            *e == Event::Feedback {
                id: "q0".into(),
                feedback: Feedback::Incorrect {
                    correct_answer: "a0".into(),
                },
            }
        })
        .expect("feedback shown");
    assert_eq!(events[feedback_at + 1], Event::Disable("q0".into()));
    assert!(matches!(
        events[feedback_at + 2],
        Event::Render { index: 1, .. }
    ));

    answer_current(&mut engine, Answer::single("a1"));
    assert_eq!(
        engine.outcome(),
        Some(&QuizResults::new(1, 2, FinishReason::Completed))
    );
    // Nothing is revealed again at the end outside standard mode.
    assert_eq!(engine.renderer().feedback().len(), 2);
}

#[test]
fn standard_mode_reveals_answered_questions_at_the_end() {
    let (mut engine, _) = engine(Config::default(), text_questions(3));
    engine.start();
    answer_current(&mut engine, Answer::single("a0"));
    answer_current(&mut engine, Answer::single("wrong"));
    assert!(engine.renderer().feedback().is_empty());

    engine.finish(FinishReason::Completed);

    assert_eq!(
        engine.renderer().feedback(),
        vec![
            ("q0".to_owned(), Feedback::Correct),
            (
                "q1".to_owned(),
                Feedback::Incorrect {
                    correct_answer: "a1".into()
                }
            ),
        ]
    );
    let events = &engine.renderer().events;
    let hide = events.iter().position(|e| *e == Event::Hide).unwrap();
    assert!(matches!(events[hide + 1], Event::Results(_)));
    assert_eq!(
        engine.outcome(),
        Some(&QuizResults::new(1, 3, FinishReason::Completed))
    );
}

#[test]
fn score_counts_correct_answers() {
    let (mut engine, _) = engine(Config::default(), text_questions(5));
    engine.start();
    for answer in ["a0", "x", "a2", "y", "a4"] {
        answer_current(&mut engine, Answer::single(answer));
    }

    let results = engine.renderer().results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 3);
    assert_eq!(results[0].total, 5);
    assert_eq!(results[0].percentage, 60);
    assert_eq!(results[0].reason, FinishReason::Completed);
}

#[test]
fn next_stays_disabled_without_an_answer_unless_skipping() {
    let (mut strict, _) = engine(Config::default(), text_questions(2));
    strict.start();
    assert_eq!(
        strict.renderer().last_controls().map(|c| c.next_enabled),
        Some(false)
    );
    strict.go_next();
    strict.go_next();
    assert_eq!(strict.state().current_index(), Some(0));
    assert!(strict.state().answer("q0").is_none());

    strict.renderer_mut().enter("q0", Answer::single("a0"));
    strict.refresh_controls();
    assert_eq!(
        strict.renderer().last_controls().map(|c| c.next_enabled),
        Some(true)
    );

    let skipping = Config {
        allow_skip: true,
        ..Config::default()
    };
    let (mut lenient, _) = engine(skipping, text_questions(2));
    lenient.start();
    assert_eq!(
        lenient.renderer().last_controls().map(|c| c.next_enabled),
        Some(true)
    );
    lenient.go_next();
    assert_eq!(lenient.state().current_index(), Some(1));
    assert!(lenient
        .state()
        .answer("q0")
        .is_some_and(|r| !r.is_correct && r.answer.is_empty()));
}

#[test]
fn going_back_restores_without_grading() {
    let config = Config {
        allow_back: true,
        ..Config::default()
    };
    let (mut engine, _) = engine(config, text_questions(3));
    engine.start();
    engine.go_previous();
    assert_eq!(engine.renderer().renders().len(), 1);

    answer_current(&mut engine, Answer::single("a0"));
    assert_eq!(
        engine.renderer().last_controls().map(|c| c.previous_enabled),
        Some(true)
    );

    engine.go_previous();
    assert_eq!(engine.state().current_index(), Some(0));
    assert_eq!(
        engine.renderer().events.iter().rev().find_map(|e| match e {
            Event::Render { index, prior, .. } => Some((*index, prior.clone())),
            _ => None,
        }),
        Some((0, Some(Answer::single("a0"))))
    );
    assert_eq!(
        engine.renderer().last_controls().map(|c| c.previous_enabled),
        Some(false)
    );
    assert_eq!(engine.state().answers().count(), 1);

    // The restored answer is submitted again as-is.
    engine.go_next();
    assert_eq!(engine.state().current_index(), Some(1));
}

#[test]
fn going_back_needs_allow_back() {
    let (mut engine, _) = engine(Config::default(), text_questions(2));
    engine.start();
    answer_current(&mut engine, Answer::single("a0"));
    engine.go_previous();
    assert_eq!(engine.state().current_index(), Some(1));
    assert_eq!(
        engine.renderer().last_controls().map(|c| c.previous_enabled),
        Some(false)
    );
}

#[test]
fn finish_is_idempotent_and_final() {
    let completed = Rc::new(Cell::new(0));
    let (engine, _) = engine(Config::default(), text_questions(2));
    let mut engine = engine.with_hooks(Hooks::default().on_complete({
        let completed = completed.clone();
        move |_| completed.set(completed.get() + 1)
    }));

    engine.start();
    engine.finish(FinishReason::Completed);
    engine.finish(FinishReason::TimeUp);
    let events_after_finish = engine.renderer().events.len();

    engine.renderer_mut().enter("q0", Answer::single("a0"));
    engine.go_next();
    engine.go_previous();
    engine.start();
    engine.refresh_controls();

    assert_eq!(completed.get(), 1);
    assert_eq!(engine.renderer().events.len(), events_after_finish);
    assert_eq!(
        engine.outcome().map(|r| r.reason),
        Some(FinishReason::Completed)
    );
}

#[tokio::test(start_paused = true)]
async fn timer_runs_out_exactly_once() {
    let completed = Rc::new(Cell::new(0));
    let config = Config {
        timer_seconds: 2,
        ..Config::default()
    };
    let (engine, scheduler) = engine(config, text_questions(3));
    let mut engine = engine.with_hooks(Hooks::default().on_complete({
        let completed = completed.clone();
        move |_| completed.set(completed.get() + 1)
    }));

    engine.start();
    assert!(engine.has_timer());
    assert_eq!(scheduler.started.get(), 1);
    assert_eq!(engine.renderer().events[0], Event::Timer(2));

    tokio::time::advance(Duration::from_secs(1)).await;
    engine.tick();
    assert!(engine.renderer().events.contains(&Event::Timer(1)));
    assert_eq!(engine.phase(), Phase::Running);

    tokio::time::advance(Duration::from_secs(1)).await;
    engine.tick();
    assert_eq!(engine.phase(), Phase::Finished);
    assert!(!engine.has_timer());
    assert_eq!(scheduler.cancelled.get(), 1);
    assert_eq!(
        engine.outcome(),
        Some(&QuizResults::new(0, 3, FinishReason::TimeUp))
    );

    let events = engine.renderer().events.len();
    tokio::time::advance(Duration::from_secs(1)).await;
    engine.tick();
    assert_eq!(engine.renderer().events.len(), events);
    assert_eq!(completed.get(), 1);
    assert_eq!(scheduler.cancelled.get(), 1);
}

#[test]
fn no_timer_without_a_limit() {
    let (mut engine, scheduler) = engine(Config::default(), text_questions(1));
    engine.start();
    assert!(!engine.has_timer());
    assert_eq!(scheduler.started.get(), 0);

    engine.tick();
    assert!(!engine
        .renderer()
        .events
        .iter()
        .any(|e| matches!(e, Event::Timer(_))));

    answer_current(&mut engine, Answer::single("a0"));
    assert_eq!(scheduler.cancelled.get(), 0);
}

#[test]
fn finishing_early_cancels_the_timer() {
    let config = Config {
        timer_seconds: 60,
        ..Config::default()
    };
    let (mut engine, scheduler) = engine(config, text_questions(1));
    engine.start();
    answer_current(&mut engine, Answer::single("a0"));

    assert_eq!(engine.phase(), Phase::Finished);
    assert!(!engine.has_timer());
    assert_eq!(scheduler.cancelled.get(), 1);
    assert_eq!(
        engine.outcome(),
        Some(&QuizResults::new(1, 1, FinishReason::Completed))
    );
}
