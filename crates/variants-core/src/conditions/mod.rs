//! Condition kinds and the registry that instantiates them.
//!
//! A condition is configured by a JSON object with a `type` tag plus
//! kind-specific fields:
//!
//! ```json
//! { "type": "USERNAME_MOD", "from": 0, "to": 10 }
//! ```
//!
//! The [`ConditionRegistry`] maps each tag to a [`ConditionFactory`] that
//! validates the fields and builds a [`Condition`]. New kinds are added by
//! registering another factory; the engine itself never changes.
//!
//! ## Usage
//!
//! ```ignore
//! let mut registry = ConditionRegistry::with_defaults();
//! registry.register(Arc::new(MyConditionFactory))?;
//!
//! let condition = registry.instantiate(&json!({"type": "USERS", "values": ["bob"]}))?;
//! ```

mod constant;
mod experiments;
pub mod fields;
mod membership;
mod random;
mod username_mod;

pub use constant::{AlwaysCondition, AlwaysFactory, NeverCondition, NeverFactory};
pub use experiments::{GoogleExperimentsCondition, GoogleExperimentsFactory};
pub use membership::{GroupsCondition, GroupsFactory, UsersCondition, UsersFactory};
pub use random::{RandomCondition, RandomFactory, RandomModCondition, RandomModFactory};
pub use username_mod::{UsernameModCondition, UsernameModFactory};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::context::{EvaluationContext, EvaluationScope};
use crate::variant::VariantConfigError;

/// A validated, immutable condition.
pub trait Condition: fmt::Debug + Send + Sync {
    /// Type tag this condition was built from.
    fn condition_type(&self) -> &str;

    /// Whether the condition holds for this context.
    ///
    /// Configuration has already been validated, so this never fails.
    fn test(&self, context: &EvaluationContext, scope: &mut EvaluationScope) -> bool;
}

/// Factory for one condition kind.
///
/// Each factory is responsible for:
/// 1. Declaring the type tag it handles
/// 2. Validating the kind-specific fields
/// 3. Building the condition
pub trait ConditionFactory: Send + Sync {
    /// Type tag, e.g. "USERS".
    fn condition_type(&self) -> &'static str;

    /// Validate `spec` and build a condition from it.
    fn create(&self, spec: &JsonValue) -> Result<Box<dyn Condition>, VariantConfigError>;

    /// Human-readable description of this kind.
    fn description(&self) -> &'static str {
        "Condition"
    }
}

/// Registry of condition kinds, keyed by type tag.
#[derive(Default, Clone)]
pub struct ConditionRegistry {
    factories: BTreeMap<String, Arc<dyn ConditionFactory>>,
}

impl ConditionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all built-in kinds registered.
    pub fn with_defaults() -> Self {
        let defaults: [Arc<dyn ConditionFactory>; 8] = [
            Arc::new(AlwaysFactory),
            Arc::new(NeverFactory),
            Arc::new(UsersFactory),
            Arc::new(GroupsFactory),
            Arc::new(RandomFactory),
            Arc::new(RandomModFactory),
            Arc::new(UsernameModFactory),
            Arc::new(GoogleExperimentsFactory),
        ];

        let factories = defaults
            .into_iter()
            .map(|factory| (factory.condition_type().to_string(), factory))
            .collect();
        Self { factories }
    }

    /// Register a condition kind under its declared type tag.
    ///
    /// If a kind with the same tag already exists, it will be replaced.
    pub fn register(
        &mut self,
        factory: Arc<dyn ConditionFactory>,
    ) -> Result<(), VariantConfigError> {
        let condition_type = factory.condition_type();
        if condition_type.trim().is_empty() {
            return Err(VariantConfigError::InvalidRegistration(
                "condition type tag must not be empty".to_string(),
            ));
        }

        if self
            .factories
            .insert(condition_type.to_string(), factory)
            .is_some()
        {
            tracing::warn!(condition_type, "Replaced existing condition type");
        }
        Ok(())
    }

    /// Build a condition from its raw configuration.
    pub fn instantiate(&self, spec: &JsonValue) -> Result<Box<dyn Condition>, VariantConfigError> {
        let condition_type = match spec.get("type") {
            None | Some(JsonValue::Null) => {
                return Err(VariantConfigError::MissingConditionType(
                    "Every condition must have a type".to_string(),
                ))
            }
            Some(JsonValue::String(s)) => s.as_str(),
            Some(other) => {
                return Err(VariantConfigError::InvalidConditionType(format!(
                    "Condition type must be a string, got {}",
                    other
                )))
            }
        };

        self.factories
            .get(condition_type)
            .ok_or_else(|| {
                VariantConfigError::UnknownConditionType(format!(
                    "'{}'. Available: {:?}",
                    condition_type,
                    self.available_types()
                ))
            })?
            .create(spec)
    }

    /// List registered type tags.
    pub fn available_types(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    /// Check if a type tag is registered.
    pub fn has_type(&self, condition_type: &str) -> bool {
        self.factories.contains_key(condition_type)
    }

    /// Get the factory for a type tag.
    pub fn get_factory(&self, condition_type: &str) -> Option<&Arc<dyn ConditionFactory>> {
        self.factories.get(condition_type)
    }
}

impl fmt::Debug for ConditionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionRegistry")
            .field("types", &self.available_types())
            .finish()
    }
}
