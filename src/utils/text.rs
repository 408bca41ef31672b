//! Text normalization for search queries and comparisons.
//!
//! All functions are total and idempotent on already-clean input.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// A one or two letter uppercase token followed by a period, e.g. `K.` or `JJ.`.
/// The surrounding boundary characters are captured so they can be put back.
static INITIALS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\b|\W)[A-Z]{1,2}\.(\W|$)").expect("valid initials regex"));

static PARENTHESES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\(.*\)").expect("valid parentheses regex"));

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,:;&]|\band\b").expect("valid separators regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Clean a title before sending it to the catalog search.
///
/// The catalog does not cope well with commas, colons or parentheses in the
/// search text. Diacritics are kept: stripping them usually worsens results.
pub fn clean_title_for_query(title: &str) -> String {
    let lower = title.to_lowercase();
    let without_series = remove_content_in_parentheses(&lower);
    replace_special_chars(&without_series)
}

/// Clean an author (or list of authors) before sending it to the catalog search.
///
/// Separators go first so that an initial glued to one (`K.&`) is still found.
pub fn clean_author_for_query(author: &str) -> String {
    trim_spaces(&remove_initials(&remove_separators(author)))
}

/// Strip accents and other combining marks, expanding `Œ`/`œ` to `Oe`/`oe`.
pub fn remove_diacritics(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .replace('Œ', "Oe")
        .replace('œ', "oe")
}

/// Remove initials such as `K.` or `JJ.`, keeping the characters around them.
///
/// Joined initials (`A.B.`) only lose one letter per regex pass, so passes are
/// repeated until nothing changes.
pub fn remove_initials(s: &str) -> String {
    let mut current = s.to_string();
    loop {
        let next = INITIALS.replace_all(&current, "$1$2");
        if next == current {
            return current;
        }
        current = next.into_owned();
    }
}

/// Remove anything between the first `(` and the last `)`, line breaks included,
/// e.g. series annotations.
pub fn remove_content_in_parentheses(s: &str) -> String {
    PARENTHESES.replace_all(s, "").into_owned()
}

/// Drop commas, turn colons into spaces and standalone `&` into `and`.
///
/// Works word by word, so whitespace comes out collapsed and trimmed.
pub fn replace_special_chars(s: &str) -> String {
    s.replace(',', "")
        .replace(':', " ")
        .split_whitespace()
        .map(|word| if word == "&" { "and" } else { word })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace author list separators (`,` `:` `;` `&` and the word `and`) by spaces.
pub fn remove_separators(s: &str) -> String {
    SEPARATORS.replace_all(s, " ").into_owned()
}

/// Collapse whitespace runs into a single space and trim both ends.
pub fn trim_spaces(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").trim().to_string()
}
