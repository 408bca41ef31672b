//! Fuzzy comparison of free-text strings (titles, author lists).

use regex::Regex;
use std::sync::LazyLock;

use super::text::{remove_diacritics, remove_initials, trim_spaces};

static NOT_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").expect("valid alphanumeric regex"));

/// Compare two strings ignoring case, diacritics, initials and symbols.
///
/// In strict mode the normalized forms must be equal. Otherwise the normalized
/// `expected` only needs to appear in the normalized `actual`, which is what
/// author matching needs: a result may list more authors than the query.
pub fn fuzzy_compare(expected: &str, actual: &str, strict: bool) -> bool {
    let expected = fuzzy_normalize(expected);
    let actual = fuzzy_normalize(actual);

    if strict {
        actual == expected
    } else {
        actual.contains(&expected)
    }
}

/// The normalized form used by [`fuzzy_compare`].
pub fn fuzzy_normalize(s: &str) -> String {
    let lower = remove_diacritics(&s.to_lowercase());
    let without_initials = remove_initials(&lower);
    trim_spaces(&NOT_ALPHANUMERIC.replace_all(&without_initials, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzy_compare_strict_positive() {
        for (expected, actual) in [
            ("Camel Case", "camel case"),
            ("éàôç...", "eaoc"),
            ("  !! SIMPLé TITLE  !!", "simple title"),
            ("some title with !accents!", "SOME TITLE   With !àccents!"),
            ("Œuvre complète", "oeuvre complete"),
        ] {
            assert!(
                fuzzy_compare(expected, actual, true),
                "{:?} should match {:?}",
                expected,
                actual
            );
        }
    }

    #[test]
    fn test_fuzzy_compare_strict_negative() {
        for (expected, actual) in [
            ("Title One", "Title Two"),
            ("mispeling", "mispelling"),
            ("prefix suffix", "prefix"),
            ("title", "title: with subtitle"),
        ] {
            assert!(
                !fuzzy_compare(expected, actual, true),
                "{:?} should not match {:?}",
                expected,
                actual
            );
        }
    }

    #[test]
    fn test_non_strict_is_containment() {
        for (expected, actual) in [
            ("prefix", "prefix suffix"),
            ("Author One", "Author One, Author Two"),
            ("Author One", "Author Two, Author One"),
            ("x-y", "xyz"),
        ] {
            assert!(fuzzy_compare(expected, actual, false), "not strict: {:?}", expected);
            assert!(!fuzzy_compare(expected, actual, true), "strict: {:?}", expected);
        }
    }

    #[test]
    fn test_fuzzy_normalize() {
        assert_eq!(fuzzy_normalize("  The   K. AUTHÔR, \n"), "the k author");
        assert_eq!(fuzzy_normalize("x-y"), "xy");
        assert_eq!(fuzzy_normalize(""), "");
    }
}
