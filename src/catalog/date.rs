//! Lenient air date parsing
//!
//! Air dates are free text written by hand on each episode page, so a
//! handful of day-first and month-first layouts are accepted.

use chrono::{Datelike, NaiveDate};

/// Layouts tried in order after normalization (commas and ordinals removed)
const FORMATS: &[&str] = &[
    "%d %B %Y",
    "%B %d %Y",
    "%A %d %B %Y",
    "%A %B %d %Y",
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
];

/// Two-digit year layouts, tried only after every four-digit layout failed.
/// chrono maps `00`-`69` to 2000-2069 and `70`-`99` to 1970-1999.
const SHORT_YEAR_FORMATS: &[&str] = &[
    "%d %B %y",
    "%B %d %y",
    "%A %d %B %y",
    "%d/%m/%y",
    "%d-%m-%y",
    "%d.%m.%y",
];

/// `%Y` also accepts one or two digits; such years are rejected so the
/// two-digit layouts get a chance
const MIN_YEAR: i32 = 1000;

/// Parses an air date such as `- 3 June 2020 -`.
///
/// Leading and trailing dashes (`-`, `–`, `—`) and whitespace are stripped
/// first. Returns `None` if no known layout matches.
pub(crate) fn parse_air_date(raw: &str) -> Option<NaiveDate> {
    let normalized = normalize(raw);
    if normalized.is_empty() {
        return None;
    }

    FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(&normalized, format).ok())
        .find(|date| date.year() >= MIN_YEAR)
        .or_else(|| {
            SHORT_YEAR_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(&normalized, format).ok())
        })
}

fn normalize(raw: &str) -> String {
    raw.trim_matches(|c: char| matches!(c, '-' | '–' | '—') || c.is_whitespace())
        .replace(',', " ")
        .split_whitespace()
        .map(normalize_token)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rewrites tokens chrono does not understand: ordinals and `Sept`
fn normalize_token(token: &str) -> &str {
    if matches!(token.to_ascii_lowercase().as_str(), "sept" | "sept.") {
        return "Sep";
    }
    strip_ordinal(token)
}

/// `3rd` -> `3`; anything else is returned unchanged
fn strip_ordinal(token: &str) -> &str {
    let lower = token.to_ascii_lowercase();
    for suffix in ["st", "nd", "rd", "th"] {
        if lower.ends_with(suffix) {
            let digits = &token[..token.len() - suffix.len()];
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return digits;
            }
        }
    }
    token
}
