//! Statement date tokens (`05/ENE`, `17/JUN`).
//!
//! Rows only print day and month, so typed dates need the statement year.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static DATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d{2}\s*/\s*[A-Z]{3}$").expect("valid date token regex"));
static DATE_INLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d{2}/[A-Z]{3}").expect("valid inline date regex"));

/// True when the whole token is a `DD/MMM` date.
pub fn is_date_token(text: &str) -> bool {
    DATE_TOKEN.is_match(text.trim())
}

/// First `DD/MMM` inside `text`, or an empty string.
pub fn first_inline_date(text: &str) -> String {
    DATE_INLINE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn month_number(abbr: &str) -> Option<u32> {
    let month = match abbr.to_uppercase().as_str() {
        "ENE" | "JAN" => 1,
        "FEB" => 2,
        "MAR" => 3,
        "ABR" | "APR" => 4,
        "MAY" => 5,
        "JUN" => 6,
        "JUL" => 7,
        "AGO" | "AUG" => 8,
        "SEP" | "SET" => 9,
        "OCT" => 10,
        "NOV" => 11,
        "DIC" | "DEC" => 12,
        _ => return None,
    };
    Some(month)
}

/// Resolve a `DD/MMM` token against `year`.
pub fn parse_statement_date(s: &str, year: i32) -> Option<NaiveDate> {
    let (day, month) = s.trim().split_once('/')?;
    let day: u32 = day.trim().parse().ok()?;
    let month = month_number(month.trim())?;
    NaiveDate::from_ymd_opt(year, month, day)
}
