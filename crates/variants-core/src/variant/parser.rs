//! Variant parsing and validation.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::ConditionalOperator;
use crate::conditions::{Condition, ConditionRegistry};

/// Resolved service replacements: key is replaced by value.
///
/// Keys keep the order in which they were first merged.
pub type Mods = IndexMap<String, String>;

/// A configuration authoring mistake.
///
/// Raised only while parsing and validating, never while testing
/// conditions, and never recovered internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantConfigError {
    #[error("Invalid variants config: {0}")]
    InvalidConfig(String),

    #[error("Invalid variant: {0}")]
    InvalidVariant(String),

    #[error("Missing condition type: {0}")]
    MissingConditionType(String),

    #[error("Invalid condition type: {0}")]
    InvalidConditionType(String),

    #[error("Unknown condition type: {0}")]
    UnknownConditionType(String),

    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    #[error("Invalid conditional operator: {0}")]
    InvalidOperator(String),

    #[error("Invalid condition registration: {0}")]
    InvalidRegistration(String),
}

impl VariantConfigError {
    /// Human-readable message.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// One validated variant entry.
#[derive(Debug)]
pub struct Variant {
    /// Identifier, matched against URL overrides
    pub id: String,

    /// Conditions in configuration order
    pub conditions: Vec<Box<dyn Condition>>,

    /// Service replacements applied when the variant is active
    pub mods: Mods,

    /// Whether the `variants` URL parameter may force this variant on
    pub allow_url_overrides: bool,

    /// How conditions are combined
    pub operator: ConditionalOperator,
}

impl Variant {
    /// Validate a raw entry and instantiate its conditions.
    ///
    /// Checks run in order: `id`, `conditions`, `mods`, each condition,
    /// then `conditionalOperator`.
    pub fn parse(
        value: &JsonValue,
        registry: &ConditionRegistry,
    ) -> Result<Self, VariantConfigError> {
        let id = value
            .get("id")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| {
                VariantConfigError::InvalidVariant("Every variant must have a string id".into())
            })?
            .to_string();

        let specs = value
            .get("conditions")
            .and_then(JsonValue::as_array)
            .filter(|specs| !specs.is_empty())
            .ok_or_else(|| {
                VariantConfigError::InvalidVariant(format!(
                    "Variant '{}' must have a non-empty list of conditions",
                    id
                ))
            })?;

        let mods = Self::parse_mods(&id, value.get("mods"))?;

        let conditions = specs
            .iter()
            .map(|spec| registry.instantiate(spec))
            .collect::<Result<Vec<_>, _>>()?;

        let operator = ConditionalOperator::parse(value.get("conditionalOperator"))?;
        let allow_url_overrides =
            matches!(value.get("allowUrlOverrides"), Some(JsonValue::Bool(true)));

        Ok(Self {
            id,
            conditions,
            mods,
            allow_url_overrides,
            operator,
        })
    }

    fn parse_mods(id: &str, value: Option<&JsonValue>) -> Result<Mods, VariantConfigError> {
        let entries = value
            .and_then(JsonValue::as_object)
            .filter(|entries| !entries.is_empty())
            .ok_or_else(|| {
                VariantConfigError::InvalidVariant(format!("Variant '{}' must have mods", id))
            })?;

        entries
            .iter()
            .map(|(key, replacement)| match replacement.as_str() {
                Some(replacement) => Ok((key.clone(), replacement.to_string())),
                None => Err(VariantConfigError::InvalidVariant(format!(
                    "Variant '{}' mod '{}' must name its replacement as a string",
                    id, key
                ))),
            })
            .collect()
    }
}

/// Validate a whole configuration.
///
/// The configuration must be a list; the first invalid entry aborts parsing.
pub fn parse_variants(
    config: &JsonValue,
    registry: &ConditionRegistry,
) -> Result<Vec<Variant>, VariantConfigError> {
    let entries = config.as_array().ok_or_else(|| {
        VariantConfigError::InvalidConfig("variants should be a list".to_string())
    })?;

    entries
        .iter()
        .map(|entry| Variant::parse(entry, registry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> ConditionRegistry {
        ConditionRegistry::with_defaults()
    }

    #[test]
    fn test_parse_valid_variant() {
        let variant = Variant::parse(
            &json!({
                "id": "new-nav",
                "conditions": [{"type": "USERS", "values": ["bob"]}, {"type": "NEVER"}],
                "mods": {"navService": "newNavService"},
                "allowUrlOverrides": true,
                "conditionalOperator": "and"
            }),
            &registry(),
        )
        .unwrap();

        assert_eq!(variant.id, "new-nav");
        assert_eq!(variant.conditions.len(), 2);
        assert_eq!(variant.conditions[0].condition_type(), "USERS");
        assert_eq!(variant.mods.get("navService").map(String::as_str), Some("newNavService"));
        assert!(variant.allow_url_overrides);
        assert_eq!(variant.operator, ConditionalOperator::And);
    }

    #[test]
    fn test_defaults() {
        let variant = Variant::parse(
            &json!({"id": "a", "conditions": [{"type": "ALWAYS"}], "mods": {"x": "y"}}),
            &registry(),
        )
        .unwrap();
        assert!(!variant.allow_url_overrides);
        assert_eq!(variant.operator, ConditionalOperator::Or);
    }

    #[test]
    fn test_url_override_flag_needs_literal_true() {
        for flag in [json!("yes"), json!(1), json!("true"), json!(null)] {
            let variant = Variant::parse(
                &json!({
                    "id": "a",
                    "conditions": [{"type": "ALWAYS"}],
                    "mods": {"x": "y"},
                    "allowUrlOverrides": flag
                }),
                &registry(),
            )
            .unwrap();
            assert!(!variant.allow_url_overrides, "{}", flag);
        }
    }

    #[test]
    fn test_only_literal_true_allows_overrides() {
        for flag in [json!("true"), json!(1), json!(false), JsonValue::Null] {
            let variant = Variant::parse(
                &json!({
                    "id": "a",
                    "conditions": [{"type": "ALWAYS"}],
                    "mods": {"x": "y"},
                    "allowUrlOverrides": flag
                }),
                &registry(),
            )
            .unwrap();
            assert!(!variant.allow_url_overrides);
        }
    }

    #[test]
    fn test_shape_errors() {
        let cases = [
            json!({"conditions": [{"type": "ALWAYS"}], "mods": {"x": "y"}}),
            json!({"id": 7, "conditions": [{"type": "ALWAYS"}], "mods": {"x": "y"}}),
            json!({"id": "a", "mods": {"x": "y"}}),
            json!({"id": "a", "conditions": [], "mods": {"x": "y"}}),
            json!({"id": "a", "conditions": {"type": "ALWAYS"}, "mods": {"x": "y"}}),
            json!({"id": "a", "conditions": [{"type": "ALWAYS"}]}),
            json!({"id": "a", "conditions": [{"type": "ALWAYS"}], "mods": {}}),
            json!({"id": "a", "conditions": [{"type": "ALWAYS"}], "mods": ["x"]}),
            json!({"id": "a", "conditions": [{"type": "ALWAYS"}], "mods": {"x": 1}}),
            json!("not an object"),
        ];

        for case in cases {
            assert!(
                matches!(
                    Variant::parse(&case, &registry()),
                    Err(VariantConfigError::InvalidVariant(_))
                ),
                "expected InvalidVariant for {}",
                case
            );
        }
    }

    #[test]
    fn test_condition_errors_propagate() {
        let result = Variant::parse(
            &json!({
                "id": "a",
                "conditions": [{"type": "ALWAYS"}, {"type": "FOO"}],
                "mods": {"x": "y"}
            }),
            &registry(),
        );
        assert!(matches!(result, Err(VariantConfigError::UnknownConditionType(_))));
    }

    #[test]
    fn test_conditions_checked_before_operator() {
        let result = Variant::parse(
            &json!({
                "id": "a",
                "conditions": [{"type": "RANDOM"}],
                "mods": {"x": "y"},
                "conditionalOperator": "bad"
            }),
            &registry(),
        );
        assert!(matches!(result, Err(VariantConfigError::InvalidCondition(_))));
    }

    #[test]
    fn test_parse_variants_requires_list() {
        let result = parse_variants(
            &json!({"id": "a", "conditions": [{"type": "ALWAYS"}], "mods": {"x": "y"}}),
            &registry(),
        );
        assert!(matches!(result, Err(VariantConfigError::InvalidConfig(_))));
        assert!(parse_variants(&json!([]), &registry()).unwrap().is_empty());
    }

    #[test]
    fn test_error_message() {
        let err = VariantConfigError::InvalidConfig("variants should be a list".to_string());
        assert_eq!(err.message(), "Invalid variants config: variants should be a list");
    }
}
