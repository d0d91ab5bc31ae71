//! `GOOGLE_EXPERIMENTS`: delegate to an external experiment service.
//!
//! The service is injected into the engine as an [`ExperimentApi`]. When none
//! is attached the condition is simply false.
//!
//! [`ExperimentApi`]: crate::context::ExperimentApi

use serde_json::Value as JsonValue;

use super::fields;
use super::{Condition, ConditionFactory};
use crate::context::{EvaluationContext, EvaluationScope};
use crate::variant::VariantConfigError;

/// True when the externally chosen variation equals `variation`.
#[derive(Debug, Clone, Copy)]
pub struct GoogleExperimentsCondition {
    variation: u64,
}

impl GoogleExperimentsCondition {
    pub fn new(variation: u64) -> Self {
        Self { variation }
    }
}

impl Condition for GoogleExperimentsCondition {
    fn condition_type(&self) -> &str {
        "GOOGLE_EXPERIMENTS"
    }

    fn test(&self, _context: &EvaluationContext, scope: &mut EvaluationScope) -> bool {
        let Some(api) = scope.experiments() else {
            tracing::trace!("No experiment API attached");
            return false;
        };

        u64::try_from(api.choose_variation()).is_ok_and(|chosen| chosen == self.variation)
    }
}

/// Builds [`GoogleExperimentsCondition`] from `{"variation": 1}`.
pub struct GoogleExperimentsFactory;

impl ConditionFactory for GoogleExperimentsFactory {
    fn condition_type(&self) -> &'static str {
        "GOOGLE_EXPERIMENTS"
    }

    fn create(&self, spec: &JsonValue) -> Result<Box<dyn Condition>, VariantConfigError> {
        let variation = fields::non_negative_integer(spec, "variation", "GOOGLE_EXPERIMENTS")?;
        Ok(Box::new(GoogleExperimentsCondition::new(variation)))
    }

    fn description(&self) -> &'static str {
        "Variation chosen by the external experiment service"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FixedVariation;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_validation() {
        for bad in [
            json!({"type": "GOOGLE_EXPERIMENTS"}),
            json!({"type": "GOOGLE_EXPERIMENTS", "variation": "string"}),
            json!({"type": "GOOGLE_EXPERIMENTS", "variation": 0.5}),
            json!({"type": "GOOGLE_EXPERIMENTS", "variation": -1}),
        ] {
            assert!(GoogleExperimentsFactory.create(&bad).is_err());
        }
        assert!(GoogleExperimentsFactory.create(&json!({"variation": 0})).is_ok());
    }

    #[test]
    fn test_without_api_is_false() {
        let condition = GoogleExperimentsCondition::new(1);
        assert!(!condition.test(&EvaluationContext::new(), &mut EvaluationScope::new()));
    }

    #[test]
    fn test_matches_chosen_variation() {
        let context = EvaluationContext::new();
        let mut scope = EvaluationScope::new().with_experiments(Some(Arc::new(FixedVariation(1))));

        assert!(!GoogleExperimentsCondition::new(0).test(&context, &mut scope));
        assert!(GoogleExperimentsCondition::new(1).test(&context, &mut scope));
        assert!(!GoogleExperimentsCondition::new(2).test(&context, &mut scope));
    }

    #[test]
    fn test_negative_choice_never_matches() {
        let context = EvaluationContext::new();
        let mut scope = EvaluationScope::new().with_experiments(Some(Arc::new(FixedVariation(-1))));
        assert!(!GoogleExperimentsCondition::new(0).test(&context, &mut scope));
    }
}
