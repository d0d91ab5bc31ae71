//! `ALWAYS` and `NEVER`.

use serde_json::Value as JsonValue;

use super::{Condition, ConditionFactory};
use crate::context::{EvaluationContext, EvaluationScope};
use crate::variant::VariantConfigError;

/// Always true.
#[derive(Debug, Clone, Copy)]
pub struct AlwaysCondition;

impl Condition for AlwaysCondition {
    fn condition_type(&self) -> &str {
        "ALWAYS"
    }

    fn test(&self, _context: &EvaluationContext, _scope: &mut EvaluationScope) -> bool {
        true
    }
}

/// Builds [`AlwaysCondition`].
pub struct AlwaysFactory;

impl ConditionFactory for AlwaysFactory {
    fn condition_type(&self) -> &'static str {
        "ALWAYS"
    }

    fn create(&self, _spec: &JsonValue) -> Result<Box<dyn Condition>, VariantConfigError> {
        Ok(Box::new(AlwaysCondition))
    }

    fn description(&self) -> &'static str {
        "Always true"
    }
}

/// Always false.
#[derive(Debug, Clone, Copy)]
pub struct NeverCondition;

impl Condition for NeverCondition {
    fn condition_type(&self) -> &str {
        "NEVER"
    }

    fn test(&self, _context: &EvaluationContext, _scope: &mut EvaluationScope) -> bool {
        false
    }
}

/// Builds [`NeverCondition`].
pub struct NeverFactory;

impl ConditionFactory for NeverFactory {
    fn condition_type(&self) -> &'static str {
        "NEVER"
    }

    fn create(&self, _spec: &JsonValue) -> Result<Box<dyn Condition>, VariantConfigError> {
        Ok(Box::new(NeverCondition))
    }

    fn description(&self) -> &'static str {
        "Always false"
    }
}
