//! Grammars for the free-text fields found on catalog pages.
//!
//! These functions only deal with text; selecting the elements the text comes
//! from is the job of [`search`](super::search) and [`details`](super::details).

use chrono::{Datelike, Month, NaiveDate};
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

use super::CatalogError;
use crate::utils::trim_spaces;

/// Role marker the catalog puts on its own registered authors.
pub const PRIMARY_AUTHOR_ROLE: &str = "goodreads author";

static AUTHOR_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^(]+) ?(\(.+\))?").expect("valid author regex"));

static ISBN13_IN_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(ISBN13:\s*(\d{13})\)").expect("valid ISBN13 regex"));

static BARE_ISBN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{13}|\d{9}[\dX])$").expect("valid ISBN regex"));

static PUBLISHED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*published\s+(.*?)\s*(?:\bby\b.*|\(.*)?$").expect("valid published regex")
});

static FIRST_PUBLISHED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(\s*first published\s+([^)]*)\)").expect("valid first published regex")
});

static FIRST_PUBLISHED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*first published\s+(.+?)\s*$").expect("valid first published regex")
});

static ORDINAL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(?:st|nd|rd|th)\b").expect("valid ordinal regex"));

static PAGE_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s+pages?\b").expect("valid pages regex"));

static RESULT_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([\d,]+)\s+results?").expect("valid results regex"));

/// Parse a CSS selector, turning a bad selector into a [`CatalogError::Parse`].
pub(crate) fn selector(css: &str) -> Result<Selector, CatalogError> {
    Selector::parse(css).map_err(|e| CatalogError::Parse(format!("Invalid selector {}: {:?}", css, e)))
}

/// Text content of an element with whitespace collapsed.
pub(crate) fn element_text(element: &ElementRef) -> String {
    trim_spaces(&element.text().collect::<String>())
}

/// Extract the main authors from a contributor string.
///
/// The string has the form `by First Last[ (Role)], First Last[ (Role)]`.
/// Contributors with a role (illustrator, translator...) are dropped, unless
/// the role is the catalog's own author designation.
pub fn parse_authors(text: &str) -> Vec<String> {
    let text = text.trim();
    let text = text
        .strip_prefix("by ")
        .or_else(|| text.strip_prefix("By "))
        .unwrap_or(text);

    text.split(',')
        .filter_map(|entry| {
            let caps = AUTHOR_ENTRY.captures(entry.trim())?;
            let name = caps.get(1)?.as_str().trim();
            let roles = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

            let is_main_author =
                roles.trim().is_empty() || roles.to_lowercase().contains(PRIMARY_AUTHOR_ROLE);

            (is_main_author && !name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// Extract an ISBN, preferring the ISBN-13 when both forms are given.
///
/// Accepts a bare ISBN-10/13 or `<isbn10> (ISBN13: <isbn13>)`. Anything else
/// yields `None`.
pub fn parse_isbn(text: &str) -> Option<String> {
    if let Some(caps) = ISBN13_IN_PARENS.captures(text) {
        return Some(caps[1].to_string());
    }

    let text = text.trim();
    BARE_ISBN.is_match(text).then(|| text.to_string())
}

/// Extract the publisher from a publication string such as
/// `Published August 30th 2006 by Gallimard (first published August 2006)`.
pub fn parse_publisher(text: &str) -> Option<String> {
    let (_, after_by) = text.split_once(" by ")?;
    let publisher = after_by.split("(first").next().unwrap_or_default().trim();
    (!publisher.is_empty()).then(|| trim_spaces(publisher))
}

/// Extract the earliest publication date from a publication string.
///
/// Accepted forms:
/// - `Published <DATE>[ by <PUBLISHER>][ (first published <DATE>)]`
/// - `First published <DATE>`
///
/// When both dates are present and their years agree, the "published" date is
/// kept since it is usually more precise; otherwise the "first published" date
/// wins. Returns `Ok(None)` when no date is given at all, and an error when a
/// date is given but cannot be read.
pub fn parse_publication_date(text: &str) -> Result<Option<NaiveDate>, CatalogError> {
    let text = trim_spaces(text);

    if let Some(caps) = FIRST_PUBLISHED_LINE.captures(&text) {
        return parse_date(&caps[1]).map(Some);
    }

    let published = PUBLISHED
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(parse_date)
        .transpose()?;

    let first_published = FIRST_PUBLISHED
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(parse_date)
        .transpose()?;

    Ok(match (published, first_published) {
        (Some(published), Some(first)) if published.year() == first.year() => Some(published),
        (_, Some(first)) => Some(first),
        (published, None) => published,
    })
}

/// Parse `YYYY`, `MonthName YYYY` or `MonthName Day[suffix][,] YYYY`.
///
/// Missing month and day default to January 1st.
pub fn parse_date(text: &str) -> Result<NaiveDate, CatalogError> {
    let cleaned = ORDINAL_SUFFIX.replace_all(text, "$1").replace(',', " ");
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    let invalid = || CatalogError::Parse(format!("Could not parse date: {}", text));

    let (year, month, day) = match tokens.as_slice() {
        [year] => (*year, None, None),
        [month, year] => (*year, Some(*month), None),
        [month, day, year] => (*year, Some(*month), Some(*day)),
        _ => return Err(invalid()),
    };

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month = match month {
        Some(name) => name.parse::<Month>().map_err(|_| invalid())?.number_from_month(),
        None => 1,
    };
    let day: u32 = match day {
        Some(day) => day.parse().map_err(|_| invalid())?,
        None => 1,
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Extract a page count from text such as `350 pages, Paperback`.
pub fn parse_pages(text: &str) -> Option<u32> {
    PAGE_COUNT.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Extract the total number of results from a search summary such as
/// `Page 1 of about 1,234 results (0.31 seconds)`.
pub fn parse_total_results(text: &str) -> Option<u32> {
    let caps = RESULT_COUNT.captures(text)?;
    caps[1].replace(',', "").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_parse_authors() {
        let cases: Vec<(&str, Vec<&str>)> = vec![
            (
                "by José Carlos Somoza, Marianne Millon (Translator)",
                vec!["José Carlos Somoza"],
            ),
            ("by Audrey Niffenegger (Goodreads Author)", vec!["Audrey Niffenegger"]),
            (
                "by Sylvain Neuvel, Georges Orwell, Max Pix",
                vec!["Sylvain Neuvel", "Georges Orwell", "Max Pix"],
            ),
            (
                "by Sylvain Neuvel (Goodreads Author), Georges Orwell, Max Pix (Illustrator)",
                vec!["Sylvain Neuvel", "Georges Orwell"],
            ),
            ("Hervé Girardô", vec!["Hervé Girardô"]),
            (
                "Harlan Coben (Goodreads Author) (Goodreads Author)",
                vec!["Harlan Coben"],
            ),
            ("Abby Smith", vec!["Abby Smith"]),
            ("", vec![]),
        ];

        for (input, expected) in cases {
            assert_eq!(parse_authors(input), expected, "input: {:?}", input);
        }
    }

    #[test]
    fn test_parse_authors_role_filtering() {
        assert_eq!(
            parse_authors("by A (Illustrator), B (Goodreads Author), C"),
            vec!["B", "C"]
        );
        assert_eq!(parse_authors("by A (Editor), B (Narrator)"), Vec::<String>::new());
    }

    #[test]
    fn test_parse_isbn() {
        let cases = [
            ("229014875X", Some("229014875X")),
            ("1250145449", Some("1250145449")),
            ("9782290148754", Some("9782290148754")),
            ("229014875X (ISBN13: 9782290148754)", Some("9782290148754")),
            ("229014875X (ISBN112341234: 978229014875431290458125908)", None),
            ("", None),
            ("XX", None),
        ];

        for (input, expected) in cases {
            assert_eq!(parse_isbn(input).as_deref(), expected, "input: {:?}", input);
        }
    }

    #[test]
    fn test_parse_publication_date() {
        let cases = [
            ("Published October 2nd 2020 (first published 1902)", date(1902, 1, 1)),
            ("Published October 2nd 2003 (first published 2003)", date(2003, 10, 2)),
            (
                "Published October 2nd 2003 by Derlin (first published 2003)",
                date(2003, 10, 2),
            ),
            (
                "Published August 30th 2006 by Gallimard (first published August 2006)",
                date(2006, 8, 30),
            ),
            ("Published 2005", date(2005, 1, 1)),
            ("Published January 1997", date(1997, 1, 1)),
            ("Published November 24th 1988 by Books On Tape", date(1988, 11, 24)),
            (
                "Published June 2003 by XX <nobr class=\"greyText\">(first published 2003)</nobr>",
                date(2003, 6, 1),
            ),
            ("Published by X Y Z (first published 1493)", date(1493, 1, 1)),
            ("First published July 15, 2014", date(2014, 7, 15)),
            ("Published", None),
            ("", None),
        ];

        for (input, expected) in cases {
            assert_eq!(
                parse_publication_date(input).unwrap(),
                expected,
                "input: {:?}",
                input
            );
        }
    }

    #[test]
    fn test_parse_publication_date_rejects_garbage() {
        assert!(matches!(
            parse_publication_date("Published Smarch 33rd 2003"),
            Err(CatalogError::Parse(_))
        ));
        assert!(parse_publication_date("First published sometime").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2005").ok(), date(2005, 1, 1));
        assert_eq!(parse_date("August 2006").ok(), date(2006, 8, 1));
        assert_eq!(parse_date("October 2nd 2003").ok(), date(2003, 10, 2));
        assert_eq!(parse_date("March 1st, 2001").ok(), date(2001, 3, 1));
        assert_eq!(parse_date("May 23rd 1999").ok(), date(1999, 5, 23));
        assert!(parse_date("February 30th 2001").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_publisher() {
        let cases = [
            ("Published October 2nd 2020 (first published 1902)", None),
            (
                "Published August 30th 2006 by Gallimard (first published August 2006)",
                Some("Gallimard"),
            ),
            (
                "Published 2005 by A Very Long Publisher 01",
                Some("A Very Long Publisher 01"),
            ),
            ("Published by X Y Z (first published 1493)", Some("X Y Z")),
            ("Published", None),
            ("", None),
        ];

        for (input, expected) in cases {
            assert_eq!(parse_publisher(input).as_deref(), expected, "input: {:?}", input);
        }
    }

    #[test]
    fn test_parse_pages() {
        assert_eq!(parse_pages("350 pages, Paperback"), Some(350));
        assert_eq!(parse_pages("1 page"), Some(1));
        assert_eq!(parse_pages("Kindle Edition"), None);
    }

    #[test]
    fn test_parse_total_results() {
        assert_eq!(
            parse_total_results("Page 1 of about 1,234 results (0.31 seconds)"),
            Some(1234)
        );
        assert_eq!(parse_total_results("45 results"), Some(45));
        assert_eq!(parse_total_results("No results."), None);
    }
}
