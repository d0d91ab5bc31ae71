//! Stable username hashing for `USERNAME_MOD` bucketing.
//!
//! The hash is the classic 32-bit polynomial string hash (`h = 31 * h + c`,
//! wrapping on signed overflow) over UTF-16 code units, so the same username
//! lands in the same bucket in every implementation that follows the
//! Java/JavaScript string hashing rules.

/// Number of buckets usernames are spread across.
pub const BUCKETS: i32 = 100;

/// 32-bit polynomial hash of a string.
///
/// Identical to Java's `String::hashCode`.
pub fn string_hash(value: &str) -> i32 {
    value
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_mul(31).wrapping_add(i32::from(unit))
        })
}

/// Bucket in `[0, 100)` for a username.
pub fn username_bucket(username: &str) -> i64 {
    i64::from(string_hash(username).rem_euclid(BUCKETS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_hashes() {
        assert_eq!(string_hash(""), 0);
        assert_eq!(string_hash("a"), 97);
        assert_eq!(string_hash("hello"), 99_162_322);
    }

    #[test]
    fn test_colliding_strings_share_bucket() {
        assert_eq!(string_hash("Aa"), string_hash("BB"));
        assert_eq!(username_bucket("Aa"), 12);
        assert_eq!(username_bucket("BB"), 12);
    }

    #[test]
    fn test_overflow_wraps_and_sign_is_normalized() {
        assert_eq!(string_hash("polygenelubricants"), i32::MIN);
        assert_eq!(username_bucket("polygenelubricants"), 52);
    }

    #[test]
    fn test_non_ascii_uses_utf16_units() {
        // U+1F600 is the surrogate pair D83D DE00
        let expected = 0xD83Di32.wrapping_mul(31).wrapping_add(0xDE00);
        assert_eq!(string_hash("\u{1F600}"), expected);
    }

    proptest! {
        #[test]
        fn prop_bucket_in_range(name in ".*") {
            let bucket = username_bucket(&name);
            prop_assert!((0..100).contains(&bucket));
        }

        #[test]
        fn prop_bucket_is_deterministic(name in "[a-z0-9._-]{1,24}") {
            let copy = String::from(name.as_str());
            prop_assert_eq!(username_bucket(&name), username_bucket(&copy));
            prop_assert_eq!(string_hash(&name), string_hash(&copy));
        }
    }
}
