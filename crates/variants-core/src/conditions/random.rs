//! Randomized rollout: `RANDOM` and `RANDOM_MOD`.
//!
//! `RANDOM` draws afresh on every test. `RANDOM_MOD` shares one draw in
//! `[0, 100)` across every `RANDOM_MOD` condition of a resolution, so that
//! disjoint ranges in different variants stay mutually exclusive.

use serde_json::Value as JsonValue;

use super::fields;
use super::{Condition, ConditionFactory};
use crate::context::{EvaluationContext, EvaluationScope};
use crate::variant::VariantConfigError;

/// True with probability `value`.
#[derive(Debug, Clone, Copy)]
pub struct RandomCondition {
    value: f64,
}

impl RandomCondition {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Condition for RandomCondition {
    fn condition_type(&self) -> &str {
        "RANDOM"
    }

    fn test(&self, _context: &EvaluationContext, scope: &mut EvaluationScope) -> bool {
        scope.uniform() < self.value
    }
}

/// Builds [`RandomCondition`] from `{"value": 0.25}`.
pub struct RandomFactory;

impl ConditionFactory for RandomFactory {
    fn condition_type(&self) -> &'static str {
        "RANDOM"
    }

    fn create(&self, spec: &JsonValue) -> Result<Box<dyn Condition>, VariantConfigError> {
        let value = fields::number(spec, "value", "RANDOM")?;
        if !(0.0..=1.0).contains(&value) {
            return Err(VariantConfigError::InvalidCondition(
                "RANDOM requires value to be a number between 0 and 1".to_string(),
            ));
        }
        Ok(Box::new(RandomCondition::new(value)))
    }

    fn description(&self) -> &'static str {
        "Fresh random draw below a probability"
    }
}

/// True when the shared draw falls in `[from, to)`.
#[derive(Debug, Clone, Copy)]
pub struct RandomModCondition {
    from: f64,
    to: f64,
}

impl RandomModCondition {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }
}

impl Condition for RandomModCondition {
    fn condition_type(&self) -> &str {
        "RANDOM_MOD"
    }

    fn test(&self, _context: &EvaluationContext, scope: &mut EvaluationScope) -> bool {
        let draw = f64::from(scope.random_mod_draw());
        draw >= self.from && draw < self.to
    }
}

/// Builds [`RandomModCondition`] from `{"from": 0, "to": 10}`.
pub struct RandomModFactory;

impl ConditionFactory for RandomModFactory {
    fn condition_type(&self) -> &'static str {
        "RANDOM_MOD"
    }

    fn create(&self, spec: &JsonValue) -> Result<Box<dyn Condition>, VariantConfigError> {
        let (from, to) = fields::percent_range(spec, "RANDOM_MOD")?;
        Ok(Box::new(RandomModCondition::new(from, to)))
    }

    fn description(&self) -> &'static str {
        "Shared per-call random bucket within a range"
    }
}
