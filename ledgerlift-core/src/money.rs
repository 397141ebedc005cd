//! Money tokens to fixed-point decimals.
//!
//! Two layouts are understood: `1,234.56` and `1.234,56`. Parsing never
//! fails; anything unreadable degrades to `0.00`.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

static CURRENCY_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d{1,3}(,\d{3})*\.\d{2}$").expect("valid currency regex"));

/// Parse the first digit-bearing token of `text` as an amount rounded to cents.
pub fn parse_money(text: &str) -> Decimal {
    let Some(token) = text
        .split_whitespace()
        .find(|t| t.chars().any(|c| c.is_ascii_digit()))
    else {
        return Decimal::ZERO;
    };

    let negative = token.starts_with('-')
        || token.ends_with('-')
        || (token.starts_with('(') && token.ends_with(')'));

    let digits: String = token
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let Some(normalized) = normalize_separators(&digits) else {
        return Decimal::ZERO;
    };

    match Decimal::from_str(&normalized) {
        Ok(v) => {
            let v = v.round_dp(2);
            if negative { -v } else { v }
        }
        Err(_) => Decimal::ZERO,
    }
}

/// Rewrite a digits-and-separators string into `1234.56` form.
fn normalize_separators(s: &str) -> Option<String> {
    if !s.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let out = match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) => {
            if dot > comma {
                s.replace(',', "")
            } else {
                s.replace('.', "").replace(',', ".")
            }
        }
        (Some(comma), None) => {
            let decimals = s.len() - comma - 1;
            if s.matches(',').count() == 1 && (1..=2).contains(&decimals) {
                s.replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        (None, Some(_)) => {
            if s.matches('.').count() > 1 {
                s.replace('.', "")
            } else {
                s.to_string()
            }
        }
        (None, None) => s.to_string(),
    };

    let out = out.trim_matches('.').to_string();
    if out.is_empty() { None } else { Some(out) }
}

/// Render an amount as `1,234.56`.
pub fn format_money(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// True for tokens shaped like a printed amount, e.g. `12,383.20`.
pub fn is_currency_shaped(text: &str) -> bool {
    CURRENCY_SHAPE.is_match(text.trim().trim_start_matches('$'))
}

/// Strict numeric reading of a single token (leading `$` or `€` ignored).
///
/// Unlike [`parse_money`] this returns `None` for anything that is not a
/// plain number, so reference codes like `RFC:` are never read as values.
/// Both separator layouts are normalised the same way as [`parse_money`].
pub fn numeric_value(text: &str) -> Option<Decimal> {
    let cleaned = text.trim().trim_start_matches(['$', '€']).trim_start();
    let (negative, body) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned),
    };
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.') {
        return None;
    }
    let value = Decimal::from_str(&normalize_separators(body)?).ok()?;
    Some(if negative { -value } else { value })
}
