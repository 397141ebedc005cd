//! Row segmentation from date beacons.
//!
//! Every transaction starts with an operation date in the left-most column.
//! A row spans from its beacon down to just above the next beacon, or to the
//! page limit for the last row.

use std::sync::LazyLock;

use ledgerlift_core::{is_date_token, Word};
use regex::Regex;

/// Date beacons never start right of this x.
pub const DATE_MAX_X: f64 = 200.0;
/// Beacons this close in y are the same row (duplicate date columns).
const BEACON_DEDUPE: f64 = 5.0;
/// Beacons may sit slightly above the scan start.
const HEADER_SLACK: f64 = 10.0;

static MASKED_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*{5,}\d").expect("valid masked reference regex"));

/// One row's vertical extent.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSlice {
    pub index: usize,
    pub y_top: f64,
    pub y_bottom: f64,
    /// The beacon text (operation date)
    pub date_text: String,
    /// Bottom edge of the beacon word
    pub date_y1: f64,
}

impl RowSlice {
    /// Vertical center of the beacon line.
    pub fn center_y(&self) -> f64 {
        (self.y_top + self.date_y1) / 2.0
    }
}

/// Date tokens in the beacon column, sorted top-down and de-duplicated.
pub fn date_beacons<'a>(words: &[&'a Word], header_top: f64, limit_y: f64, drop_masked: bool) -> Vec<&'a Word> {
    let masked_ys: Vec<f64> = if drop_masked {
        words
            .iter()
            .filter(|w| MASKED_REFERENCE.is_match(&w.text))
            .map(|w| w.y0())
            .collect()
    } else {
        Vec::new()
    };

    let mut dates: Vec<&Word> = words
        .iter()
        .copied()
        .filter(|w| w.x0() <= DATE_MAX_X)
        .filter(|w| w.y0() >= header_top - HEADER_SLACK && w.y0() < limit_y)
        .filter(|w| !masked_ys.iter().any(|y| (w.y0() - y).abs() < 3.0))
        .filter(|w| is_date_token(&w.text))
        .collect();
    dates.sort_by(|a, b| a.y0().total_cmp(&b.y0()));

    let mut unique: Vec<&Word> = Vec::with_capacity(dates.len());
    for d in dates {
        match unique.last() {
            Some(prev) if d.y0() - prev.y0() <= BEACON_DEDUPE => {}
            _ => unique.push(d),
        }
    }
    unique
}

/// y0 of the first beacon between `header_top` and `limit_y`.
pub fn first_beacon_y(words: &[&Word], header_top: f64, limit_y: f64) -> Option<f64> {
    date_beacons(words, header_top, limit_y, false)
        .first()
        .map(|w| w.y0())
}

/// Slice the page into rows. Output is sorted and non-overlapping.
pub fn segment_rows(words: &[&Word], header_top: f64, limit_y: f64, drop_masked: bool) -> Vec<RowSlice> {
    let beacons = date_beacons(words, header_top, limit_y, drop_masked);
    beacons
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let y_bottom = match beacons.get(i + 1) {
                Some(next) => (next.y0() - 1.0).min(limit_y),
                None => limit_y,
            };
            RowSlice {
                index: i,
                y_top: d.y0(),
                y_bottom,
                date_text: d.text.trim().to_string(),
                date_y1: d.y1(),
            }
        })
        .collect()
}
