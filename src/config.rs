use std::{env, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// When correctness is revealed to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackMode {
    /// Correctness is shown for every question once the quiz is over.
    #[default]
    Standard,
    /// Correctness is shown after each answer, then the quiz moves on.
    Immediate,
    /// Correctness is shown after each answer; a wrong answer must be retried.
    Retry,
}

impl FromStr for FeedbackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(FeedbackMode::Standard),
            "immediate" => Ok(FeedbackMode::Immediate),
            "retry" => Ok(FeedbackMode::Retry),
            other => Err(format!("unknown feedback mode '{other}'")),
        }
    }
}

impl fmt::Display for FeedbackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeedbackMode::Standard => "standard",
            FeedbackMode::Immediate => "immediate",
            FeedbackMode::Retry => "retry",
        };
        f.write_str(name)
    }
}

/// Resolved quiz configuration. Immutable after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Config {
    pub feedback_mode: FeedbackMode,
    pub allow_skip: bool,
    pub allow_back: bool,
    /// Quiz-wide time limit, 0 disables the timer.
    pub timer_seconds: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feedback_mode: FeedbackMode::Standard,
            allow_skip: false,
            allow_back: false,
            timer_seconds: 0,
        }
    }
}

impl Config {
    /// Merges, in increasing priority, the defaults, attributes declared on
    /// the quiz markup and explicit overrides.
    pub fn resolve(attributes: &ConfigOverrides, overrides: &ConfigOverrides) -> Self {
        Config::default().merged(attributes).merged(overrides)
    }

    fn merged(self, layer: &ConfigOverrides) -> Self {
        Self {
            feedback_mode: layer.feedback_mode.unwrap_or(self.feedback_mode),
            allow_skip: layer.allow_skip.unwrap_or(self.allow_skip),
            allow_back: layer.allow_back.unwrap_or(self.allow_back),
            timer_seconds: layer.timer_seconds.unwrap_or(self.timer_seconds),
        }
    }
}

/// One configuration layer; `None` leaves the lower layer's value in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigOverrides {
    pub feedback_mode: Option<FeedbackMode>,
    pub allow_skip: Option<bool>,
    pub allow_back: Option<bool>,
    #[serde(alias = "timer")]
    pub timer_seconds: Option<u32>,
}

impl ConfigOverrides {
    /// Applies one `key = value` pair, where `key` is the camel-cased
    /// setting name. Unknown keys and unparsable values are ignored.
    pub fn set(&mut self, key: &str, value: &str) {
        match key {
            "feedbackMode" => match value.parse() {
                Ok(mode) => self.feedback_mode = Some(mode),
                Err(e) => tracing::warn!("ignoring feedbackMode: {e}"),
            },
            "allowSkip" => self.allow_skip = parse_flag(key, value).or(self.allow_skip),
            "allowBack" => self.allow_back = parse_flag(key, value).or(self.allow_back),
            "timer" | "timerSeconds" => {
                self.timer_seconds = parse_seconds(value).or(self.timer_seconds)
            }
            other => tracing::debug!("ignoring unknown setting '{other}'"),
        }
    }

    /// Overrides read from `QUIZ_*` environment variables.
    pub fn from_env() -> Self {
        let mut overrides = Self::default();
        for (var, key) in [
            ("QUIZ_FEEDBACK_MODE", "feedbackMode"),
            ("QUIZ_ALLOW_SKIP", "allowSkip"),
            ("QUIZ_ALLOW_BACK", "allowBack"),
            ("QUIZ_TIMER", "timer"),
        ] {
            if let Ok(value) = env::var(var) {
                overrides.set(key, &value);
            }
        }
        overrides
    }

    /// `self` with every field present in `other` replaced.
    pub fn layered(self, other: &ConfigOverrides) -> Self {
        Self {
            feedback_mode: other.feedback_mode.or(self.feedback_mode),
            allow_skip: other.allow_skip.or(self.allow_skip),
            allow_back: other.allow_back.or(self.allow_back),
            timer_seconds: other.timer_seconds.or(self.timer_seconds),
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Option<bool> {
    match value.trim() {
        "true" => Some(true),
        "false" => Some(false),
        other => {
            tracing::warn!("ignoring {key}: '{other}' is not true/false");
            None
        }
    }
}

fn parse_seconds(value: &str) -> Option<u32> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u32>() {
        return Some(seconds);
    }
    match value.parse::<f64>() {
        Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => Some(seconds.trunc() as u32),
        _ => {
            tracing::warn!("ignoring timer: '{value}' is not a number of seconds");
            None
        }
    }
}
