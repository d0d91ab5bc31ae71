//! `USERNAME_MOD`: sticky per-user bucketing.

use serde_json::Value as JsonValue;

use super::fields;
use super::{Condition, ConditionFactory};
use crate::context::{EvaluationContext, EvaluationScope};
use crate::variant::VariantConfigError;

/// True when the username's bucket falls in `[from, to)`.
///
/// Without a username the condition is false.
#[derive(Debug, Clone, Copy)]
pub struct UsernameModCondition {
    from: f64,
    to: f64,
}

impl UsernameModCondition {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }
}

impl Condition for UsernameModCondition {
    fn condition_type(&self) -> &str {
        "USERNAME_MOD"
    }

    fn test(&self, context: &EvaluationContext, _scope: &mut EvaluationScope) -> bool {
        let Some(username) = context.username() else {
            return false;
        };

        let bucket = context.username_bucket(username) as f64;
        bucket >= self.from && bucket < self.to
    }
}

/// Builds [`UsernameModCondition`] from `{"from": 0, "to": 10}`.
pub struct UsernameModFactory;

impl ConditionFactory for UsernameModFactory {
    fn condition_type(&self) -> &'static str {
        "USERNAME_MOD"
    }

    fn create(&self, spec: &JsonValue) -> Result<Box<dyn Condition>, VariantConfigError> {
        let (from, to) = fields::percent_range(spec, "USERNAME_MOD")?;
        Ok(Box::new(UsernameModCondition::new(from, to)))
    }

    fn description(&self) -> &'static str {
        "Username hash bucket within a range"
    }
}
