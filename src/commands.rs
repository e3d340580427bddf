use std::str::FromStr;

use crate::runner::QuizEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Next,
    Previous,
    Finish,
}

impl Command {
    const ALL: [Command; 4] = [
        Command::Help,
        Command::Next,
        Command::Previous,
        Command::Finish,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Next => "next",
            Command::Previous => "prev",
            Command::Finish => "finish",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Command::Help => "display help.",
            Command::Next => "submit the current answer (same as an empty line).",
            Command::Previous => "go back to the previous question, if allowed.",
            Command::Finish => "end the quiz now.",
        }
    }

    pub fn descriptions() -> String {
        let mut text = String::from("Type an answer and press Enter to submit it.\n");
        text.push_str("Pick options by number or text, several at once as 1,3.\n");
        for command in Self::ALL {
            text.push_str(&format!("/{} - {}\n", command.name(), command.description()));
        }
        text
    }

    pub fn event(&self) -> Option<QuizEvent> {
        match self {
            Command::Help => None,
            Command::Next => Some(QuizEvent::Next),
            Command::Previous => Some(QuizEvent::Previous),
            Command::Finish => Some(QuizEvent::Finish),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command '/{0}', enter /help to see usages")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches('/').to_lowercase();
        match name.as_str() {
            "help" | "h" => Ok(Command::Help),
            "next" | "n" => Ok(Command::Next),
            "prev" | "previous" | "back" | "p" => Ok(Command::Previous),
            "finish" | "quit" | "q" => Ok(Command::Finish),
            _ => Err(UnknownCommand(name)),
        }
    }
}

/// One line typed at the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    /// An empty line submits whatever is already entered.
    Submit,
    Answer(String),
}

impl Input {
    pub fn parse(line: &str) -> Result<Self, UnknownCommand> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            Ok(Input::Submit)
        } else if trimmed.starts_with('/') {
            trimmed.parse().map(Input::Command)
        } else {
            Ok(Input::Answer(trimmed.to_owned()))
        }
    }

    /// Events to send for this line. Typing an answer also submits it.
    pub fn events(self) -> Vec<QuizEvent> {
        match self {
            Input::Command(command) => command.event().into_iter().collect(),
            Input::Submit => vec![QuizEvent::Next],
            Input::Answer(text) => vec![QuizEvent::Input(text), QuizEvent::Next],
        }
    }
}
