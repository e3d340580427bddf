use std::io::{self, BufRead, Stdout};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use dotenvy::dotenv;
use quizdeck::commands::{Command, Input};
use quizdeck::config::{Config, ConfigOverrides};
use quizdeck::engine::QuizEngine;
use quizdeck::markup::QUIZ_SELECTOR;
use quizdeck::question::Question;
use quizdeck::registry::{QuizKey, QuizRegistry};
use quizdeck::runner::{self, QuizEvent};
use quizdeck::store::{self, QuestionSource, QuizDocument};
use quizdeck::terminal::TerminalRenderer;
use quizdeck::timer::TokioScheduler;
use quizdeck::HandlerResult;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;

type TerminalQuiz = QuizEngine<TerminalRenderer<Stdout>, TokioScheduler>;

#[tokio::main]
async fn main() -> HandlerResult {
    dotenv().ok();
    let log_level = std::env::var("LOG_LEVEL").unwrap_or("error".into());
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from_level(
            log_level.parse().unwrap_or(tracing::Level::ERROR),
        ))
        .json()
        .with_span_events(FmtSpan::ENTER)
        .with_line_number(true)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("QUIZ_FILE").ok())
        .ok_or("usage: quizdeck <quiz.html|quiz.json> (or set QUIZ_FILE)")?;
    tracing::info!(%path, "loading quiz file");
    let source = tokio::fs::read_to_string(&path).await?;

    let overrides = ConfigOverrides::from_env();
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let build = |key: &QuizKey, config: Config, questions: Vec<Question>| -> TerminalQuiz {
        tracing::debug!(%key, ?config, "building quiz");
        QuizEngine::new(
            config,
            questions,
            TerminalRenderer::stdout(),
            TokioScheduler::new(events_tx.clone()),
        )
    };

    let mut registry = QuizRegistry::new();
    if is_json(&path) {
        let document = QuizDocument::from_json(&source)?;
        let config = Config::resolve(&document.settings, &overrides);
        let questions = store::load(QuestionSource::List(document.questions));
        let key = QuizKey::new(file_stem(&path));
        let engine = build(&key, config, questions);
        registry.register(key, engine);
    } else {
        registry.init(&source, QUIZ_SELECTOR, &overrides, build)?;
    }

    if registry.is_empty() {
        println!("No quizzes found in {path}.");
        return Ok(());
    }

    let input_closed = Arc::new(AtomicBool::new(false));
    spawn_input_reader(events_tx.clone(), input_closed.clone());
    print!("{}", Command::descriptions());

    let keys: Vec<QuizKey> = registry.keys().cloned().collect();
    for key in keys {
        if input_closed.load(Ordering::SeqCst) {
            tracing::info!(%key, "input closed, skipping quiz");
            continue;
        }
        let Some(engine) = registry.get_mut(&key) else {
            continue;
        };

        runner::drain(&mut events_rx);
        println!("\n=== {key} ===");
        match runner::run(engine, &mut events_rx).await {
            Some(results) => tracing::info!(%key, ?results, "quiz completed"),
            None => println!("Quiz '{key}' has no questions."),
        }
    }

    registry.teardown_all();
    Ok(())
}

/// Reads stdin on a plain thread so a pending read never holds up runtime
/// shutdown.
fn spawn_input_reader(events: UnboundedSender<QuizEvent>, closed: Arc<AtomicBool>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("failed to read input: {e}");
                    break;
                }
            };
            match Input::parse(&line) {
                Ok(Input::Command(Command::Help)) => print!("{}", Command::descriptions()),
                Ok(input) => {
                    for event in input.events() {
                        if events.send(event).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => println!("{e}"),
            }
        }
        closed.store(true, Ordering::SeqCst);
        let _ = events.send(QuizEvent::Finish);
    });
}

fn is_json(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "quiz".to_owned())
}
