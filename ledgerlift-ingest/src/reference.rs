//! Reference recovery for layout B.
//!
//! The reference text floats right of the description and often drifts into
//! the amount columns. It is rebuilt from the unfiltered page words: start at
//! the `Referencia` label, stop at the balance column, and subtract any word
//! whose value equals one of the row's amounts.

use ledgerlift_core::{is_currency_shaped, numeric_value, Word};
use rust_decimal::Decimal;

use crate::grid::MasterGrid;
use crate::vocabulary::is_reference_anchor;

/// Reference text never starts left of this x.
const ZONE_LEFT: f64 = 280.0;
/// Words may start slightly above the row top.
const CEILING_SLACK: f64 = 5.0;
/// Slack applied to every column start.
const COLUMN_SLACK: f64 = 5.0;
const MIN_DIGIT_RUN: usize = 5;

/// Amounts already read for the row, keyed by column.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KnownValues {
    pub charges: Decimal,
    pub credits: Decimal,
    pub op_balance: Decimal,
    pub liq_balance: Decimal,
}

impl KnownValues {
    /// Pairs of (value, column start) in divider order.
    fn columns(&self, grid: &MasterGrid) -> [(Decimal, f64); 4] {
        [
            (self.charges, grid.lines[2]),
            (self.credits, grid.lines[3]),
            (self.op_balance, grid.lines[4]),
            (self.liq_balance, grid.lines[5]),
        ]
    }
}

fn looks_like_reference(text: &str) -> bool {
    let t = text.trim();
    t.starts_with('*') || (t.len() > MIN_DIGIT_RUN && t.chars().all(|c| c.is_ascii_digit()))
}

/// True when `w` duplicates an amount that was already read for the row.
fn is_known_amount(w: &Word, known: &KnownValues, grid: &MasterGrid) -> bool {
    let text = w.text.trim();
    let Some(value) = numeric_value(text) else {
        return false;
    };
    let cx = w.bbox.center_x();
    if cx > grid.charges_left() - COLUMN_SLACK && is_currency_shaped(text) {
        return true;
    }
    known.columns(grid).into_iter().any(|(known_value, col_start)| {
        let zero_guard = known_value.is_zero() && !text.contains(['.', ',']);
        (value - known_value).abs() < Decimal::new(1, 2) && !zero_guard && cx > col_start - COLUMN_SLACK
    })
}

/// Rebuild the reference for the row spanning `[row_top, row_bottom]`.
///
/// Returns an empty string when no `Referencia` label sits on the row,
/// unless `fallback` allows starting at a reference-shaped token.
pub fn backfill_reference(
    words: &[Word],
    grid: &MasterGrid,
    row_top: f64,
    row_bottom: f64,
    footer_y: f64,
    known: &KnownValues,
    fallback: bool,
) -> String {
    let mut zone: Vec<&Word> = words
        .iter()
        .filter(|w| w.y1() >= row_top && w.y0() <= row_bottom)
        .filter(|w| w.y0() >= row_top - CEILING_SLACK)
        .filter(|w| w.x0() >= ZONE_LEFT && w.y0() < footer_y)
        .collect();
    zone.sort_by(|a, b| a.x0().total_cmp(&b.x0()));

    let anchor = zone
        .iter()
        .position(|w| is_reference_anchor(&w.text))
        .or_else(|| {
            if fallback {
                zone.iter().position(|w| looks_like_reference(&w.text))
            } else {
                None
            }
        });
    let Some(anchor) = anchor else {
        return String::new();
    };

    let curtain = grid.op_balance_left() - COLUMN_SLACK;
    zone[anchor..]
        .iter()
        .take_while(|w| w.x0() <= curtain)
        .filter(|w| !is_known_amount(w, known, grid))
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
