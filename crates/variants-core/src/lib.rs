//! # variants-core
//!
//! Condition-driven variant evaluation for feature flags and A/B tests.
//!
//! Product code describes which conditions activate which service
//! substitutions ("mods"); this crate decides, at evaluation time, which
//! substitutions are currently active. Applying them (service location,
//! injection) is left to the host.
//!
//! ## Key Guarantees
//!
//! 1. **Fail closed**: any malformed entry or condition aborts the whole call
//! 2. **Ordered**: later variants win when mods collide
//! 3. **Sticky**: `USERNAME_MOD` buckets are stable across sessions and hosts
//! 4. **Call-scoped**: `RANDOM_MOD` shares one draw per call, never across calls
//!
//! ## Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use variants_core::{get_mods, EvaluationContext};
//!
//! let config = json!([
//!     {
//!         "id": "new-nav",
//!         "conditions": [{"type": "USERS", "values": ["bob"]}],
//!         "mods": {"navService": "newNavService"}
//!     }
//! ]);
//!
//! let mods = get_mods(&config, &EvaluationContext::new().with_username("bob"))?;
//! assert_eq!(mods["navService"], "newNavService");
//! ```

pub mod conditions;
pub mod context;
pub mod engine;
pub mod hash;
pub mod overrides;
pub mod variant;

// Re-export main types at crate root
pub use conditions::{Condition, ConditionFactory, ConditionRegistry};
pub use context::{
    EvaluationContext, EvaluationScope, ExperimentApi, FixedVariation, HashFn, StaticUrl,
    UrlProvider,
};
pub use engine::{Activation, Resolution, VariantOutcome, Variants};
pub use variant::{
    schema_violations, validate_variants_schema, ConditionalOperator, LoadError, Mods,
    SchemaViolation, Variant, VariantConfigError,
};

use serde_json::Value as JsonValue;

/// Resolve the mods of a configuration with the built-in condition kinds.
///
/// This is the main entry point. Use [`Variants`] directly to register
/// extra condition kinds, inject a URL provider or an experiment API, or
/// get a per-variant report.
pub fn get_mods(
    config: &JsonValue,
    context: &EvaluationContext,
) -> Result<Mods, VariantConfigError> {
    Variants::new().get_mods(config, context)
}
