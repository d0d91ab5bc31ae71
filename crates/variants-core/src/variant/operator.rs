//! How a variant combines its conditions.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::VariantConfigError;
use crate::conditions::Condition;
use crate::context::{EvaluationContext, EvaluationScope};

/// Combinator over a variant's conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConditionalOperator {
    /// Every condition must hold
    And,

    /// At least one condition must hold
    #[default]
    Or,
}

impl ConditionalOperator {
    /// Parse the `conditionalOperator` field. Absent or `null` means OR.
    pub fn parse(value: Option<&JsonValue>) -> Result<Self, VariantConfigError> {
        match value {
            None | Some(JsonValue::Null) => Ok(Self::Or),
            Some(JsonValue::String(s)) if s.eq_ignore_ascii_case("and") => Ok(Self::And),
            Some(JsonValue::String(s)) if s.eq_ignore_ascii_case("or") => Ok(Self::Or),
            Some(other) => Err(VariantConfigError::InvalidOperator(format!(
                "conditionalOperator should be AND or OR, got {}",
                other
            ))),
        }
    }

    /// Test conditions in order, stopping as soon as the outcome is known.
    ///
    /// OR stops at the first true condition, AND at the first false one.
    /// With no conditions OR is false and AND is true.
    pub fn evaluate(
        self,
        conditions: &[Box<dyn Condition>],
        context: &EvaluationContext,
        scope: &mut EvaluationScope,
    ) -> bool {
        let all = self == Self::And;
        for condition in conditions {
            let holds = condition.test(context, scope);
            tracing::trace!(
                condition_type = condition.condition_type(),
                holds,
                "Condition tested"
            );
            if holds != all {
                return holds;
            }
        }
        all
    }
}
