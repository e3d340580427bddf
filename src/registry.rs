use std::{collections::HashMap, fmt};

use scraper::{ElementRef, Html};

use crate::{
    config::{Config, ConfigOverrides},
    engine::QuizEngine,
    markup,
    question::Question,
    store::StoreError,
    timer::Scheduler,
};

/// Identifies one quiz on a page: the root's `id`, else a non-empty
/// `data-swq-quiz` value, else its position among the roots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuizKey(String);

impl QuizKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn for_root(root: ElementRef<'_>, position: usize) -> Self {
        let element = root.value();
        element
            .attr("id")
            .or_else(|| element.attr("data-swq-quiz"))
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(QuizKey::new)
            .unwrap_or_else(|| QuizKey(format!("quiz-{}", position + 1)))
    }
}

impl fmt::Display for QuizKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Owns every live quiz engine, keyed by [`QuizKey`]. A quiz is registered
/// at most once; tearing it down cancels its timer and forgets it.
pub struct QuizRegistry<R, S: Scheduler> {
    engines: HashMap<QuizKey, QuizEngine<R, S>>,
    /// Keys in registration order.
    order: Vec<QuizKey>,
}

impl<R, S: Scheduler> Default for QuizRegistry<R, S> {
    fn default() -> Self {
        Self {
            engines: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<R: crate::render::Renderer, S: Scheduler> QuizRegistry<R, S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an engine for every quiz root in `html` matching `selector`
    /// that is not registered yet. `build` turns the resolved settings and
    /// questions into an engine. Returns the newly registered keys.
    #[tracing::instrument(level = "info", skip(self, html, overrides, build))]
    pub fn init<F>(
        &mut self,
        html: &str,
        selector: &str,
        overrides: &ConfigOverrides,
        mut build: F,
    ) -> Result<Vec<QuizKey>, StoreError>
    where
        F: FnMut(&QuizKey, Config, Vec<Question>) -> QuizEngine<R, S>,
    {
        let roots = markup::selector(selector)?;
        let document = Html::parse_document(html);

        let mut added = Vec::new();
        for (position, root) in document.select(&roots).enumerate() {
            let key = QuizKey::for_root(root, position);
            if self.contains(&key) {
                tracing::debug!(%key, "quiz already initialised");
                continue;
            }

            let config = Config::resolve(&markup::config_attributes(root), overrides);
            let questions = markup::questions_in(root)?;
            tracing::info!(%key, questions = questions.len(), "registering quiz");

            let engine = build(&key, config, questions);
            self.insert(key.clone(), engine);
            added.push(key);
        }
        Ok(added)
    }

    /// Registers an engine built elsewhere. Returns `false`, dropping
    /// `engine`, when `key` is already taken.
    pub fn register(&mut self, key: QuizKey, engine: QuizEngine<R, S>) -> bool {
        if self.contains(&key) {
            tracing::debug!(%key, "quiz already registered");
            return false;
        }
        self.insert(key, engine);
        true
    }

    pub fn contains(&self, key: &QuizKey) -> bool {
        self.engines.contains_key(key)
    }

    pub fn get(&self, key: &QuizKey) -> Option<&QuizEngine<R, S>> {
        self.engines.get(key)
    }

    pub fn get_mut(&mut self, key: &QuizKey) -> Option<&mut QuizEngine<R, S>> {
        self.engines.get_mut(key)
    }

    /// Keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &QuizKey> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn teardown(&mut self, key: &QuizKey) -> Option<QuizEngine<R, S>> {
        let mut engine = self.engines.remove(key)?;
        self.order.retain(|k| k != key);
        engine.teardown();
        tracing::info!(%key, "quiz torn down");
        Some(engine)
    }

    pub fn teardown_all(&mut self) {
        for key in self.order.drain(..) {
            if let Some(mut engine) = self.engines.remove(&key) {
                engine.teardown();
                tracing::debug!(%key, "quiz torn down");
            }
        }
    }

    fn insert(&mut self, key: QuizKey, engine: QuizEngine<R, S>) {
        self.order.push(key.clone());
        self.engines.insert(key, engine);
    }
}
