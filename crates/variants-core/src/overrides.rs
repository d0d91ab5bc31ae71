//! URL overrides.
//!
//! A variant that sets `allowUrlOverrides: true` is forced on when its id is
//! listed in the `variants` query parameter, e.g. `?variants=new-nav,beta`.

use std::collections::BTreeSet;

use url::form_urlencoded;

/// Query parameter listing the variant ids to force on.
pub const VARIANTS_PARAM: &str = "variants";

/// Look up a query parameter in a raw search string.
///
/// The search string may start with `?`. The first occurrence of `name`
/// wins, and its value is percent-decoded.
pub fn query_param(search: &str, name: &str) -> Option<String> {
    let query = search.strip_prefix('?').unwrap_or(search);
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Variant ids requested through the `variants` parameter.
///
/// Returns an empty set when there is no search string or no parameter.
pub fn requested_variants(search: Option<&str>) -> BTreeSet<String> {
    let Some(value) = search.and_then(|s| query_param(s, VARIANTS_PARAM)) else {
        return BTreeSet::new();
    };

    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_single_param() {
        assert_eq!(requested_variants(Some("variants=foo,bar")), ids(&["foo", "bar"]));
    }

    #[test]
    fn test_leading_question_mark() {
        assert_eq!(requested_variants(Some("?variants=foo")), ids(&["foo"]));
    }

    #[test]
    fn test_param_among_others() {
        assert_eq!(
            requested_variants(Some("foo=bar&variants=foo,my-test&x=1")),
            ids(&["foo", "my-test"])
        );
    }

    #[test]
    fn test_first_occurrence_wins() {
        assert_eq!(
            requested_variants(Some("variants=a&variants=b")),
            ids(&["a"])
        );
    }

    #[test]
    fn test_percent_encoded_commas() {
        assert_eq!(requested_variants(Some("variants=a%2Cb")), ids(&["a", "b"]));
    }

    #[test]
    fn test_missing_or_empty() {
        assert!(requested_variants(None).is_empty());
        assert!(requested_variants(Some("")).is_empty());
        assert!(requested_variants(Some("foo=bar")).is_empty());
        assert!(requested_variants(Some("variants=")).is_empty());
        assert!(requested_variants(Some("variants")).is_empty());
        assert_eq!(requested_variants(Some("variants=a,,b")), ids(&["a", "b"]));
    }

    #[test]
    fn test_query_param_lookup() {
        assert_eq!(query_param("a=1&b=2", "b").as_deref(), Some("2"));
        assert_eq!(query_param("a=1&b=2", "c"), None);
    }
}
