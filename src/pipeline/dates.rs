//! Date and decade detection over extracted document text.
//!
//! Three patterns are tried in order: explicit day-month-year dates,
//! decade forms like `1930s`, and bare years between 1800 and 1999.
//! Matches that fail to parse are kept as candidates with no parsed value
//! so callers can still show the raw text.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(
            r"\d{1,2}(?:st|nd|rd|th)?\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{4}",
        )
        .unwrap(),
        Regex::new(r"\d{4}s").unwrap(),
        Regex::new(r"\b1[89]\d{2}\b").unwrap(),
    ]
});

static ORDINAL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})(?:st|nd|rd|th)").unwrap());

/// One date-like match found in the text.
#[derive(Debug, Clone, PartialEq)]
pub struct DateCandidate {
    /// The matched text, verbatim.
    pub raw: String,
    /// Midnight of the resolved date. `None` when the match could not be
    /// parsed, e.g. a misspelled month name.
    pub parsed: Option<NaiveDateTime>,
}

/// Collects every date-like match in the text, pattern by pattern.
pub fn extract_dates(text: &str) -> Vec<DateCandidate> {
    let mut candidates = Vec::new();
    for (index, pattern) in DATE_PATTERNS.iter().enumerate() {
        for found in pattern.find_iter(text) {
            let raw = found.as_str().to_string();
            let parsed = parse_match(&raw, index);
            candidates.push(DateCandidate { raw, parsed });
        }
    }
    candidates
}

fn parse_match(raw: &str, pattern_index: usize) -> Option<NaiveDateTime> {
    let date = match pattern_index {
        0 => {
            let cleaned = ORDINAL_SUFFIX.replace(raw, "$1");
            NaiveDate::parse_from_str(&cleaned, "%d %B %Y")
                .or_else(|_| NaiveDate::parse_from_str(&cleaned, "%d %b %Y"))
                .ok()?
        }
        1 => {
            let year: i32 = raw.trim_end_matches('s').parse().ok()?;
            NaiveDate::from_ymd_opt(year, 1, 1)?
        }
        _ => {
            let year: i32 = raw.parse().ok()?;
            NaiveDate::from_ymd_opt(year, 1, 1)?
        }
    };
    date.and_hms_opt(0, 0, 0)
}

/// The decade a year falls in, e.g. 1937 -> 1930.
pub fn decade_of_year(year: i32) -> i32 {
    (year / 10) * 10
}

/// Picks the decade mentioned most often in the text. Ties keep the decade
/// seen first. Returns `None` only when no candidate parsed at all.
pub fn detect_decade(text: &str) -> Option<i32> {
    let mut counts: Vec<(i32, usize)> = Vec::new();
    for candidate in extract_dates(text) {
        let Some(parsed) = candidate.parsed else {
            continue;
        };
        let decade = decade_of_year(parsed.year());
        match counts.iter_mut().find(|(seen, _)| *seen == decade) {
            Some((_, count)) => *count += 1,
            None => counts.push((decade, 1)),
        }
    }

    let mut best: Option<(i32, usize)> = None;
    for (decade, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((decade, count)),
        }
    }
    best.map(|(decade, _)| decade)
}
