//! Vertical page bounds: footers, stop phrases, repeated headers and data extent.

use ledgerlift_core::{is_currency_shaped, is_date_token, PageWords};

use crate::rows::DATE_MAX_X;
use crate::vocabulary::Vocabulary;

/// Phrases above this fraction of the page height are never footers or stops.
const UPPER_BAND: f64 = 0.30;
/// Rows never extend below this fraction of the page height.
const MAX_LIMIT: f64 = 0.95;
/// Clearance kept above a footer or stop phrase.
const LIMIT_MARGIN: f64 = 5.0;
/// Amount columns start right of this x on layout A pages.
const NUMERIC_MIN_X: f64 = 310.0;

/// Outcome of looking for the end of the table on one page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StopSignal {
    pub confirmed: bool,
    /// Where the stop phrase sits, when it could be located.
    pub y: Option<f64>,
}

impl StopSignal {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn at(y: f64) -> Self {
        Self {
            confirmed: true,
            y: Some(y),
        }
    }
}

/// Top of the first footer phrase in the lower part of the page, or the page height.
pub fn footer_y(page: &PageWords, vocab: &Vocabulary) -> f64 {
    let band = page.height * UPPER_BAND;
    vocab
        .footers
        .iter()
        .flat_map(|re| page.find_phrase(re))
        .map(|b| b.y0)
        .filter(|y| *y > band)
        .fold(page.height, f64::min)
}

/// Topmost stop phrase at or below `floor`.
pub fn stop_phrase_below(page: &PageWords, vocab: &Vocabulary, floor: f64) -> Option<f64> {
    vocab
        .stop_triggers
        .iter()
        .flat_map(|re| page.find_phrase(re))
        .map(|b| b.y0)
        .filter(|y| *y >= floor)
        .reduce(f64::min)
}

/// Stop phrase anywhere below the upper band of the page.
pub fn stop_trigger_y(page: &PageWords, vocab: &Vocabulary) -> Option<f64> {
    let band = page.height * UPPER_BAND;
    stop_phrase_below(page, vocab, band).filter(|y| *y > band)
}

/// Lowest y a row may reach on this page.
pub fn effective_limit(page_height: f64, footer_y: f64, stop_y: Option<f64>) -> f64 {
    let mut limit = page_height * MAX_LIMIT;
    if footer_y < page_height {
        limit = limit.min(footer_y - LIMIT_MARGIN);
    }
    if let Some(stop) = stop_y {
        limit = limit.min(stop - LIMIT_MARGIN);
    }
    limit
}

/// Bottom of the column-label band repeated at the top of a page.
pub fn repeated_header_bottom(page: &PageWords, vocab: &Vocabulary) -> Option<f64> {
    let band = page.height * UPPER_BAND;
    page.words
        .iter()
        .filter(|w| w.y0() < band && vocab.is_header_noise(&w.text))
        .map(|w| w.y1())
        .reduce(f64::max)
}

/// At least two wake-up labels in the upper band of the page.
pub fn has_wake_up_headers(page: &PageWords, vocab: &Vocabulary) -> bool {
    let band = page.height * UPPER_BAND;
    page.words
        .iter()
        .filter(|w| w.y0() <= band && vocab.is_wake_up_header(&w.text))
        .count()
        >= 2
}

/// Vertical extent `(first y0, last y1)` of dated rows that carry an amount.
///
/// Falls back to every date token when no row has an amount beside it.
pub fn data_extent(page: &PageWords) -> Option<(f64, f64)> {
    let mut dates: Vec<_> = page
        .words
        .iter()
        .filter(|w| w.x0() <= DATE_MAX_X && is_date_token(&w.text))
        .collect();
    if dates.is_empty() {
        return None;
    }

    let with_amount: Vec<_> = dates
        .iter()
        .copied()
        .filter(|d| {
            let cy = d.bbox.center_y();
            page.words.iter().any(|w| {
                w.x0() >= NUMERIC_MIN_X
                    && (w.bbox.center_y() - cy).abs() < 10.0
                    && is_currency_shaped(&w.text)
            })
        })
        .collect();
    if !with_amount.is_empty() {
        dates = with_amount;
    }

    dates.sort_by(|a, b| a.y0().total_cmp(&b.y0()));
    let first = dates.first()?;
    let last = dates.last()?;
    Some((first.y0(), last.y1()))
}
