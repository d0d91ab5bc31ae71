//! Shape checks for variants configurations.
//!
//! `spec/variants.schema.json` describes the variant list: ids, non-empty
//! condition lists with a `type` tag, string-valued mods and the operator.
//! Kind-specific condition fields are left to the condition factories, since
//! kinds can be registered at runtime. Unlike parsing, which stops at the
//! first bad variant, a schema check reports every violation at once.

use std::fmt;
use std::sync::LazyLock;

use jsonschema::{Draft, Validator};
use serde_json::Value as JsonValue;

const VARIANTS_SCHEMA: &str = include_str!("../../../../spec/variants.schema.json");

static VALIDATOR: LazyLock<Result<Validator, String>> = LazyLock::new(compile_schema);

fn compile_schema() -> Result<Validator, String> {
    let schema: JsonValue = serde_json::from_str(VARIANTS_SCHEMA)
        .map_err(|e| format!("Variants schema is not valid JSON: {}", e))?;

    jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(&schema)
        .map_err(|e| format!("Variants schema does not compile: {}", e))
}

/// One place where a configuration breaks the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON pointer into the configuration, empty for the root
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} at {}", self.message, self.path)
        }
    }
}

/// Every schema violation in `config`, in document order.
///
/// A schema that fails to compile is reported as a single root violation.
pub fn schema_violations(config: &JsonValue) -> Vec<SchemaViolation> {
    match VALIDATOR.as_ref() {
        Ok(validator) => validator
            .iter_errors(config)
            .map(|error| SchemaViolation {
                path: error.instance_path.to_string(),
                message: error.to_string(),
            })
            .collect(),
        Err(message) => vec![SchemaViolation {
            path: String::new(),
            message: message.clone(),
        }],
    }
}

/// Check `config` against the schema, rendering each violation as text.
pub fn validate_variants_schema(config: &JsonValue) -> Result<(), Vec<String>> {
    let violations = schema_violations(config);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations.iter().map(ToString::to_string).collect())
    }
}
