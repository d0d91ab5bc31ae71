//! Field validators shared by the built-in condition kinds.

use serde_json::Value as JsonValue;

use crate::variant::VariantConfigError;

/// Read a non-empty list of strings.
pub fn string_list(
    spec: &JsonValue,
    field: &str,
    kind: &str,
) -> Result<Vec<String>, VariantConfigError> {
    let invalid = || {
        VariantConfigError::InvalidCondition(format!(
            "{} requires {} to be a non-empty list of strings",
            kind, field
        ))
    };

    let items = spec.get(field).and_then(JsonValue::as_array).ok_or_else(invalid)?;
    if items.is_empty() {
        return Err(invalid());
    }

    items
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

/// Read a JSON number.
pub fn number(spec: &JsonValue, field: &str, kind: &str) -> Result<f64, VariantConfigError> {
    spec.get(field)
        .and_then(JsonValue::as_f64)
        .filter(|n| n.is_finite())
        .ok_or_else(|| {
            VariantConfigError::InvalidCondition(format!(
                "{} requires {} to be a number",
                kind, field
            ))
        })
}

/// Read a half-open `[from, to)` range within `[0, 100]`.
pub fn percent_range(spec: &JsonValue, kind: &str) -> Result<(f64, f64), VariantConfigError> {
    let from = number(spec, "from", kind)?;
    let to = number(spec, "to", kind)?;

    if from < 0.0 || to > 100.0 {
        return Err(VariantConfigError::InvalidCondition(format!(
            "{} requires a range between 0 and 100",
            kind
        )));
    }
    if from >= to {
        return Err(VariantConfigError::InvalidCondition(format!(
            "{} cannot have from >= to",
            kind
        )));
    }

    Ok((from, to))
}

/// Read a non-negative integer. Integral floats such as `2.0` are accepted.
pub fn non_negative_integer(
    spec: &JsonValue,
    field: &str,
    kind: &str,
) -> Result<u64, VariantConfigError> {
    let invalid = || {
        VariantConfigError::InvalidCondition(format!(
            "{} requires {} to be a non-negative integer",
            kind, field
        ))
    };

    let value = spec.get(field).ok_or_else(invalid)?;
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }

    match value.as_f64() {
        Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64 => Ok(n as u64),
        _ => Err(invalid()),
    }
}
