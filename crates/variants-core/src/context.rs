//! Evaluation context and call-scoped evaluation state.
//!
//! [`EvaluationContext`] is what the caller knows about the current request
//! (user, groups, query string). It is never mutated by the engine.
//!
//! [`EvaluationScope`] is created fresh for every resolution and carries the
//! state that must be shared between conditions of one call only: the random
//! number generator, the cached `RANDOM_MOD` draw, and the injected
//! experiment API.

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::hash;

/// Replacement for the username hash, used to pin buckets in tests.
pub type HashFn = Arc<dyn Fn(&str) -> i64 + Send + Sync>;

/// Source of the ambient query string when the context carries none.
pub trait UrlProvider: Send + Sync {
    /// Raw query string of the current location, with or without `?`.
    fn search(&self) -> Option<String>;
}

/// A URL provider with a fixed query string.
#[derive(Debug, Clone)]
pub struct StaticUrl(pub String);

impl UrlProvider for StaticUrl {
    fn search(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// External experiment service consulted by `GOOGLE_EXPERIMENTS`.
pub trait ExperimentApi: Send + Sync {
    /// The variation chosen for the current visitor.
    ///
    /// Negative values mean no variation was chosen.
    fn choose_variation(&self) -> i64;
}

/// An experiment API that always returns the same variation.
#[derive(Debug, Clone, Copy)]
pub struct FixedVariation(pub i64);

impl ExperimentApi for FixedVariation {
    fn choose_variation(&self) -> i64 {
        self.0
    }
}

/// Caller-supplied facts about the current request.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// Current user
    #[serde(default)]
    pub username: Option<String>,

    /// Groups the current user belongs to
    #[serde(default)]
    pub groups: Option<Vec<String>>,

    /// Raw query string, overriding the engine's URL provider
    #[serde(default)]
    pub search: Option<String>,

    #[serde(skip)]
    hash: Option<HashFn>,
}

impl EvaluationContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the group memberships.
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = Some(groups.into_iter().map(Into::into).collect());
        self
    }

    /// Set the raw query string.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Replace the username hash for this context.
    pub fn with_hash<F>(mut self, hash: F) -> Self
    where
        F: Fn(&str) -> i64 + Send + Sync + 'static,
    {
        self.hash = Some(Arc::new(hash));
        self
    }

    /// The username, if set and non-empty.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.is_empty())
    }

    /// The group memberships (empty when unset).
    pub fn groups(&self) -> &[String] {
        self.groups.as_deref().unwrap_or(&[])
    }

    /// The query string, if set and non-empty.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    /// Bucket for a username, using the injected hash when present.
    pub fn username_bucket(&self, username: &str) -> i64 {
        match &self.hash {
            Some(hash) => hash(username),
            None => hash::username_bucket(username),
        }
    }
}

impl fmt::Debug for EvaluationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationContext")
            .field("username", &self.username)
            .field("groups", &self.groups)
            .field("search", &self.search)
            .field("custom_hash", &self.hash.is_some())
            .finish()
    }
}

/// State scoped to a single resolution.
///
/// Never share a scope between resolutions: the cached `RANDOM_MOD` draw
/// would leak from one call into the next.
pub struct EvaluationScope {
    rng: Box<dyn RngCore + Send>,
    random_mod_draw: Option<u32>,
    experiments: Option<Arc<dyn ExperimentApi>>,
}

impl EvaluationScope {
    /// Create a scope seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Box::new(StdRng::from_entropy()),
            random_mod_draw: None,
            experiments: None,
        }
    }

    /// Use a specific random number generator.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Use a deterministic generator seeded with `seed`.
    pub fn seeded(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    /// Pin the shared `RANDOM_MOD` draw.
    pub fn with_random_mod_draw(mut self, draw: u32) -> Self {
        self.random_mod_draw = Some(draw % 100);
        self
    }

    /// Attach the experiment API.
    pub fn with_experiments(mut self, experiments: Option<Arc<dyn ExperimentApi>>) -> Self {
        self.experiments = experiments;
        self
    }

    /// A fresh uniform draw in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// The shared draw in `[0, 100)`, drawn on first use.
    pub fn random_mod_draw(&mut self) -> u32 {
        match self.random_mod_draw {
            Some(draw) => draw,
            None => {
                let draw = self.rng.gen_range(0..100);
                self.random_mod_draw = Some(draw);
                draw
            }
        }
    }

    /// The experiment API, if one is attached.
    pub fn experiments(&self) -> Option<&dyn ExperimentApi> {
        self.experiments.as_deref()
    }

    /// Attach `fallback` unless the scope already carries an API.
    pub(crate) fn inherit_experiments(&mut self, fallback: Option<&Arc<dyn ExperimentApi>>) {
        if self.experiments.is_none() {
            self.experiments = fallback.cloned();
        }
    }
}

impl Default for EvaluationScope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EvaluationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationScope")
            .field("random_mod_draw", &self.random_mod_draw)
            .field("experiments", &self.experiments.is_some())
            .finish()
    }
}
