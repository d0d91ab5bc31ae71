//! `USERS` and `GROUPS`: membership of the current user.

use serde_json::Value as JsonValue;

use super::fields;
use super::{Condition, ConditionFactory};
use crate::context::{EvaluationContext, EvaluationScope};
use crate::variant::VariantConfigError;

/// True when the current username is listed.
#[derive(Debug, Clone)]
pub struct UsersCondition {
    values: Vec<String>,
}

impl UsersCondition {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }
}

impl Condition for UsersCondition {
    fn condition_type(&self) -> &str {
        "USERS"
    }

    fn test(&self, context: &EvaluationContext, _scope: &mut EvaluationScope) -> bool {
        context
            .username()
            .is_some_and(|username| self.values.iter().any(|v| v == username))
    }
}

/// Builds [`UsersCondition`] from `{"values": [..]}`.
pub struct UsersFactory;

impl ConditionFactory for UsersFactory {
    fn condition_type(&self) -> &'static str {
        "USERS"
    }

    fn create(&self, spec: &JsonValue) -> Result<Box<dyn Condition>, VariantConfigError> {
        let values = fields::string_list(spec, "values", "USERS")?;
        Ok(Box::new(UsersCondition::new(values)))
    }

    fn description(&self) -> &'static str {
        "Current user is one of the listed usernames"
    }
}

/// True when any of the user's groups is listed.
#[derive(Debug, Clone)]
pub struct GroupsCondition {
    values: Vec<String>,
}

impl GroupsCondition {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }
}

impl Condition for GroupsCondition {
    fn condition_type(&self) -> &str {
        "GROUPS"
    }

    fn test(&self, context: &EvaluationContext, _scope: &mut EvaluationScope) -> bool {
        context
            .groups()
            .iter()
            .any(|group| self.values.contains(group))
    }
}

/// Builds [`GroupsCondition`] from `{"values": [..]}`.
pub struct GroupsFactory;

impl ConditionFactory for GroupsFactory {
    fn condition_type(&self) -> &'static str {
        "GROUPS"
    }

    fn create(&self, spec: &JsonValue) -> Result<Box<dyn Condition>, VariantConfigError> {
        let values = fields::string_list(spec, "values", "GROUPS")?;
        Ok(Box::new(GroupsCondition::new(values)))
    }

    fn description(&self) -> &'static str {
        "Current user belongs to one of the listed groups"
    }
}
