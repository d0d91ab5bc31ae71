//! The variants engine.
//!
//! Resolution of a configuration against a context:
//! 1. Validate the whole configuration (fail closed on the first error)
//! 2. Read the `variants` URL parameter for forced variant ids
//! 3. For each variant in order: active if forced by URL (when allowed),
//!    otherwise if its conditions hold under its operator
//! 4. Merge the mods of active variants; later variants win on conflicts

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::conditions::{ConditionFactory, ConditionRegistry};
use crate::context::{EvaluationContext, EvaluationScope, ExperimentApi, UrlProvider};
use crate::overrides;
use crate::variant::{parse_variants, Mods, Variant, VariantConfigError};

/// Why a variant did or did not contribute its mods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Forced on by the `variants` URL parameter
    UrlOverride,

    /// Its conditions held
    Conditions,

    /// Not active
    Inactive,
}

impl Activation {
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Inactive)
    }
}

/// Outcome for one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantOutcome {
    pub id: String,
    pub activation: Activation,
}

/// Full result of a resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    /// Merged mods of all active variants
    pub mods: Mods,

    /// One outcome per variant, in configuration order
    pub variants: Vec<VariantOutcome>,

    /// Variant ids requested through the URL
    pub url_overrides: BTreeSet<String>,

    pub evaluated_at: DateTime<Utc>,
}

impl Resolution {
    /// Ids of the variants that contributed mods.
    pub fn active_ids(&self) -> Vec<&str> {
        self.variants
            .iter()
            .filter(|v| v.activation.is_active())
            .map(|v| v.id.as_str())
            .collect()
    }
}

/// Evaluates variants configurations.
///
/// Holds the condition registry and the injected capabilities; it keeps no
/// state between resolutions and can be shared across threads.
#[derive(Clone)]
pub struct Variants {
    registry: ConditionRegistry,
    url_provider: Option<Arc<dyn UrlProvider>>,
    experiments: Option<Arc<dyn ExperimentApi>>,
}

impl Variants {
    /// Create an engine with the built-in condition kinds.
    pub fn new() -> Self {
        Self::with_registry(ConditionRegistry::with_defaults())
    }

    /// Create an engine with a specific registry.
    pub fn with_registry(registry: ConditionRegistry) -> Self {
        Self {
            registry,
            url_provider: None,
            experiments: None,
        }
    }

    /// Source of the query string when the context has none.
    pub fn with_url_provider(mut self, provider: Arc<dyn UrlProvider>) -> Self {
        self.url_provider = Some(provider);
        self
    }

    /// Experiment service for `GOOGLE_EXPERIMENTS`.
    pub fn with_experiment_api(mut self, api: Arc<dyn ExperimentApi>) -> Self {
        self.experiments = Some(api);
        self
    }

    /// Register an additional condition kind.
    pub fn register_condition_type(
        &mut self,
        factory: Arc<dyn ConditionFactory>,
    ) -> Result<(), VariantConfigError> {
        self.registry.register(factory)
    }

    pub fn registry(&self) -> &ConditionRegistry {
        &self.registry
    }

    /// A fresh evaluation scope carrying this engine's capabilities.
    pub fn scope(&self) -> EvaluationScope {
        EvaluationScope::new().with_experiments(self.experiments.clone())
    }

    /// Validate a configuration without evaluating it.
    pub fn parse(&self, config: &JsonValue) -> Result<Vec<Variant>, VariantConfigError> {
        parse_variants(config, &self.registry)
    }

    /// Resolve the mods to apply.
    ///
    /// Returns an empty map when no variant is active.
    pub fn get_mods(
        &self,
        config: &JsonValue,
        context: &EvaluationContext,
    ) -> Result<Mods, VariantConfigError> {
        Ok(self.resolve(config, context)?.mods)
    }

    /// Resolve with a per-variant report.
    pub fn resolve(
        &self,
        config: &JsonValue,
        context: &EvaluationContext,
    ) -> Result<Resolution, VariantConfigError> {
        let mut scope = self.scope();
        self.resolve_in_scope(config, context, &mut scope)
    }

    /// Resolve using a caller-built scope, e.g. with a seeded RNG.
    ///
    /// A scope without an experiment API uses the engine's. The scope must
    /// not be reused for another resolution.
    pub fn resolve_in_scope(
        &self,
        config: &JsonValue,
        context: &EvaluationContext,
        scope: &mut EvaluationScope,
    ) -> Result<Resolution, VariantConfigError> {
        let variants = self.parse(config)?;
        scope.inherit_experiments(self.experiments.as_ref());
        let url_overrides = self.url_overrides(context);
        if !url_overrides.is_empty() {
            tracing::debug!(ids = ?url_overrides, "Variants requested by URL");
        }

        let mut mods = Mods::new();
        let mut outcomes = Vec::with_capacity(variants.len());

        for variant in &variants {
            let activation = Self::activation(variant, &url_overrides, context, scope);
            if activation.is_active() {
                tracing::debug!(variant = %variant.id, reason = ?activation, "Variant active");
                mods.extend(variant.mods.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            outcomes.push(VariantOutcome {
                id: variant.id.clone(),
                activation,
            });
        }

        tracing::debug!(
            active = outcomes.iter().filter(|o| o.activation.is_active()).count(),
            mods = mods.len(),
            "Variants resolved"
        );

        Ok(Resolution {
            mods,
            variants: outcomes,
            url_overrides,
            evaluated_at: Utc::now(),
        })
    }

    fn activation(
        variant: &Variant,
        url_overrides: &BTreeSet<String>,
        context: &EvaluationContext,
        scope: &mut EvaluationScope,
    ) -> Activation {
        if variant.allow_url_overrides && url_overrides.contains(&variant.id) {
            Activation::UrlOverride
        } else if variant.operator.evaluate(&variant.conditions, context, scope) {
            Activation::Conditions
        } else {
            Activation::Inactive
        }
    }

    fn url_overrides(&self, context: &EvaluationContext) -> BTreeSet<String> {
        match context.search() {
            Some(search) => overrides::requested_variants(Some(search)),
            None => {
                let ambient = self.url_provider.as_ref().and_then(|p| p.search());
                overrides::requested_variants(ambient.as_deref())
            }
        }
    }
}

impl Default for Variants {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Variants {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Variants")
            .field("registry", &self.registry)
            .field("url_provider", &self.url_provider.is_some())
            .field("experiments", &self.experiments.is_some())
            .finish()
    }
}
