//! Loading variants configurations from YAML/JSON.
//!
//! The `from_*` functions only deserialize. `load_and_validate` also checks
//! the schema and parses every variant against a registry.

use std::fs;
use std::path::Path;

use serde_json::Value as JsonValue;
use thiserror::Error;

use super::{parse_variants, validate_variants_schema, Variant, VariantConfigError};
use crate::conditions::ConditionRegistry;

/// Errors that can occur when loading configurations.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read variants file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] VariantConfigError),

    #[error("Schema validation failed: {}", .0.join("; "))]
    Schema(Vec<String>),
}

/// Parse a configuration from a YAML string.
pub fn from_yaml(yaml: &str) -> Result<JsonValue, LoadError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Parse a configuration from a JSON string.
pub fn from_json(json: &str) -> Result<JsonValue, LoadError> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a configuration from a YAML file.
pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<JsonValue, LoadError> {
    let contents = fs::read_to_string(path)?;
    from_yaml(&contents)
}

/// Parse a configuration from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<JsonValue, LoadError> {
    let contents = fs::read_to_string(path)?;
    from_json(&contents)
}

/// Parse a configuration file, choosing the format from its extension.
///
/// `.yaml` and `.yml` are read as YAML, anything else as JSON.
pub fn from_file(path: impl AsRef<Path>) -> Result<JsonValue, LoadError> {
    let path = path.as_ref();
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        from_yaml_file(path)
    } else {
        from_json_file(path)
    }
}

/// Load a configuration file, check it against the schema, then parse it
/// with `registry`.
///
/// Schema violations are all reported together; parsing stops at the first
/// invalid variant.
pub fn load_and_validate(
    path: impl AsRef<Path>,
    registry: &ConditionRegistry,
) -> Result<Vec<Variant>, LoadError> {
    let config = from_file(path)?;
    validate_variants_schema(&config).map_err(LoadError::Schema)?;
    Ok(parse_variants(&config, registry)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const YAML_CONFIG: &str = r#"
- id: new-nav
  conditions:
    - type: USERS
      values: [bob, alice]
  mods:
    navService: newNavService
- id: half
  allowUrlOverrides: true
  conditionalOperator: AND
  conditions:
    - type: RANDOM_MOD
      from: 0
      to: 50
  mods:
    searchService: fastSearchService
"#;

    fn write_config(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_from_yaml() {
        let config = from_yaml(YAML_CONFIG).unwrap();
        let entries = config.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["conditions"][0]["to"], 50);
        assert_eq!(entries[1]["allowUrlOverrides"], true);
    }

    #[test]
    fn test_yaml_and_json_agree() {
        let yaml = from_yaml(YAML_CONFIG).unwrap();
        let json = from_json(&serde_json::to_string(&yaml).unwrap()).unwrap();
        assert_eq!(yaml, json);
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(from_json("[{"), Err(LoadError::JsonError(_))));
        assert!(matches!(from_yaml("- [unclosed"), Err(LoadError::YamlError(_))));
        assert!(matches!(
            from_file("/nonexistent/variants.json"),
            Err(LoadError::IoError(_))
        ));
    }

    #[test]
    fn test_load_and_validate_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ConditionRegistry::with_defaults();

        let yaml_path = write_config(&dir, "variants.yml", YAML_CONFIG);
        let variants = load_and_validate(&yaml_path, &registry).unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].id, "new-nav");

        let json_path = write_config(
            &dir,
            "variants.json",
            r#"[{"id": "a", "conditions": [{"type": "FOO"}], "mods": {"x": "y"}}]"#,
        );
        assert!(matches!(
            load_and_validate(&json_path, &registry),
            Err(LoadError::Config(VariantConfigError::UnknownConditionType(_)))
        ));
    }

    #[test]
    fn test_load_and_validate_reports_schema_violations() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "broken.json",
            r#"[
                {"conditions": [{"type": "ALWAYS"}], "mods": {"x": "y"}},
                {"id": "b", "conditions": [], "mods": {"x": 1}}
            ]"#,
        );

        match load_and_validate(&path, &ConditionRegistry::with_defaults()) {
            Err(LoadError::Schema(errors)) => {
                assert!(errors.len() >= 3, "got {:?}", errors);
                assert!(errors.iter().any(|e| e.contains("/1")));
            }
            other => panic!("Expected schema errors, got {:?}", other.map(|v| v.len())),
        }
    }
}
