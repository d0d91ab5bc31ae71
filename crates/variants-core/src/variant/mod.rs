//! Variant configuration parsing and validation.
//!
//! A variants configuration is an ordered list of entries, each naming the
//! conditions under which its mods apply. This module validates that list,
//! instantiates conditions through the registry, and loads configurations
//! from YAML/JSON.

pub mod loader;
mod operator;
mod parser;
mod schema;

pub use loader::LoadError;
pub use operator::ConditionalOperator;
pub use parser::{parse_variants, Mods, Variant, VariantConfigError};
pub use schema::{schema_violations, validate_variants_schema, SchemaViolation};
