//! Cell text recovery for one row.
//!
//! Amount glyphs jitter vertically against the date beacon, so layout A uses
//! a tolerant scan window and then keeps only words whose centroid lines up
//! with the row. Layout B prints amounts on the beacon line and uses a fixed
//! window instead.

use ledgerlift_core::page::LINE_TOLERANCE;
use ledgerlift_core::{reading_order, PageWords, Word};

use crate::grid::MasterGrid;
use crate::rows::RowSlice;
use crate::vocabulary::{is_reference_label, Vocabulary};

/// Half-height of the tolerant scan window around the row center.
const CENTROID_SCAN_HALF: f64 = 12.5;
/// Max distance between a word's vertical center and the row center.
const CENTROID_TOLERANCE: f64 = 5.0;
/// Height of the fixed amount window below the row top.
const STRICT_ROW_HEIGHT: f64 = 15.0;
/// Amounts this close to a `Referencia` label belong to the reference.
const REFERENCE_ADJACENCY: f64 = 5.0;
/// Horizontal slack on text-cell bounds.
const TEXT_X_SLACK: f64 = 3.0;
/// Words may start slightly above the row top.
const ROW_TOP_SLACK: f64 = 2.0;

/// How amount columns are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStrategy {
    /// Tolerant window, then centroid alignment filter.
    Centroid,
    /// Fixed window from the row top.
    StrictGrid,
}

/// A page as seen by the cell scans: pollution-zone words removed, bounds fixed.
#[derive(Debug, Clone)]
pub struct PageView<'a> {
    pub page: &'a PageWords,
    /// Words outside the pollution zone
    pub words: Vec<&'a Word>,
    /// y0 of every `Referencia` label on the page
    pub reference_label_ys: Vec<f64>,
    pub limit_y: f64,
    pub footer_y: f64,
}

impl<'a> PageView<'a> {
    pub fn new(page: &'a PageWords, grid: &MasterGrid, limit_y: f64, footer_y: f64) -> Self {
        let words = page.words.iter().filter(|w| !grid.is_polluted(w.x0())).collect();
        let reference_label_ys = page
            .words
            .iter()
            .filter(|w| is_reference_label(&w.text))
            .map(|w| w.y0())
            .collect();
        Self {
            page,
            words,
            reference_label_ys,
            limit_y,
            footer_y,
        }
    }

    /// Right edge of the last column.
    pub fn right_edge(&self) -> f64 {
        self.page.width
    }
}

fn join_words(words: &[&Word]) -> String {
    words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Free text inside `[x0, x1] x [y0, y1]`.
///
/// With `gap_limit` set, absorption stops at the first line whose distance
/// to the previous line exceeds it (floating notices below a row).
pub fn text_cell(
    view: &PageView<'_>,
    vocab: &Vocabulary,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    gap_limit: Option<f64>,
) -> String {
    let candidates = view.words.iter().copied().filter(|w| {
        w.y0() <= view.limit_y
            && w.y0() < view.footer_y
            && w.y0() >= y0 - ROW_TOP_SLACK
            && w.y0() <= y1
            && w.x0() >= x0 - TEXT_X_SLACK
            && w.x0() <= x1 + TEXT_X_SLACK
            && !vocab.is_header_noise(&w.text)
    });
    let ordered = reading_order(candidates, LINE_TOLERANCE);

    let mut kept: Vec<&Word> = Vec::with_capacity(ordered.len());
    for w in ordered {
        if let (Some(limit), Some(prev)) = (gap_limit, kept.last()) {
            if w.y0() - prev.y0() > limit {
                break;
            }
        }
        kept.push(w);
    }
    join_words(&kept)
}

/// Amount text whose centroid sits in `[left, right)` and on the row line.
pub fn centroid_cell(view: &PageView<'_>, vocab: &Vocabulary, left: f64, right: f64, row_center: f64) -> String {
    let kept = view.words.iter().copied().filter(|w| {
        let cx = w.bbox.center_x();
        w.y0() >= row_center - CENTROID_SCAN_HALF
            && w.y0() <= row_center + CENTROID_SCAN_HALF
            && w.has_digit()
            && cx >= left
            && cx < right
            && (w.bbox.center_y() - row_center).abs() <= CENTROID_TOLERANCE
            && !vocab.is_header_noise(&w.text)
    });
    join_words(&reading_order(kept, LINE_TOLERANCE))
}

/// Amount text in a fixed window below the row top.
pub fn strict_grid_cell(view: &PageView<'_>, vocab: &Vocabulary, left: f64, right: f64, row_top: f64) -> String {
    let kept = view.words.iter().copied().filter(|w| {
        let cx = w.bbox.center_x();
        w.y0() >= row_top - ROW_TOP_SLACK
            && w.y0() <= row_top + STRICT_ROW_HEIGHT
            && w.has_digit()
            && cx >= left
            && cx < right
            && !view
                .reference_label_ys
                .iter()
                .any(|y| (w.y0() - y).abs() < REFERENCE_ADJACENCY)
            && !vocab.is_header_noise(&w.text)
    });
    join_words(&reading_order(kept, LINE_TOLERANCE))
}

/// Amount text for one column using `strategy`.
pub fn numeric_cell(
    strategy: CellStrategy,
    view: &PageView<'_>,
    vocab: &Vocabulary,
    left: f64,
    right: f64,
    slice: &RowSlice,
) -> String {
    match strategy {
        CellStrategy::Centroid => centroid_cell(view, vocab, left, right, slice.center_y()),
        CellStrategy::StrictGrid => strict_grid_cell(view, vocab, left, right, slice.y_top),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::XRange;
    use crate::vocabulary::STATEMENT_VOCABULARY;

    fn grid(pollution: Option<XRange>) -> MasterGrid {
        MasterGrid {
            lines: [48.0, 80.0, 358.0, 420.0, 471.0, 530.0],
            header_row_y: 200.0,
            header_bottom_y: 210.0,
            pollution_zone: pollution,
            start_page: 1,
            fallbacks: 0,
        }
    }

    fn page(words: Vec<Word>) -> PageWords {
        PageWords::new(1, 612.0, 792.0, words)
    }

    #[test]
    fn test_centroid_rejects_neighbouring_row() {
        let p = page(vec![
            Word::new("1,200.00", 370.0, 222.0, 410.0, 231.0),
            Word::new("99.00", 370.0, 236.0, 400.0, 245.0),
        ]);
        let g = grid(None);
        let view = PageView::new(&p, &g, 700.0, 792.0);
        assert_eq!(centroid_cell(&view, &STATEMENT_VOCABULARY, 358.0, 420.0, 225.0), "1,200.00");
    }

    #[test]
    fn test_centroid_requires_digits_and_column() {
        let p = page(vec![
            Word::new("MXN", 370.0, 220.0, 390.0, 230.0),
            Word::new("15.00", 425.0, 220.0, 455.0, 230.0),
        ]);
        let g = grid(None);
        let view = PageView::new(&p, &g, 700.0, 792.0);
        assert_eq!(centroid_cell(&view, &STATEMENT_VOCABULARY, 358.0, 420.0, 225.0), "");
        assert_eq!(centroid_cell(&view, &STATEMENT_VOCABULARY, 420.0, 471.0, 225.0), "15.00");
    }

    #[test]
    fn test_strict_grid_skips_reference_line() {
        let p = page(vec![
            Word::new("500.00", 370.0, 220.0, 400.0, 230.0),
            Word::new("Referencia", 320.0, 232.0, 350.0, 242.0),
            Word::new("77", 380.0, 233.0, 390.0, 243.0),
        ]);
        let g = grid(None);
        let view = PageView::new(&p, &g, 700.0, 792.0);
        assert_eq!(strict_grid_cell(&view, &STATEMENT_VOCABULARY, 358.0, 420.0, 220.0), "500.00");
    }

    #[test]
    fn test_column_header_is_not_a_reference_label() {
        let p = page(vec![
            Word::new("REFERENCIA", 320.0, 218.0, 358.0, 227.0),
            Word::new("500.00", 370.0, 220.0, 400.0, 230.0),
        ]);
        let g = grid(None);
        let view = PageView::new(&p, &g, 700.0, 792.0);
        assert!(view.reference_label_ys.is_empty());
        assert_eq!(strict_grid_cell(&view, &STATEMENT_VOCABULARY, 358.0, 420.0, 220.0), "500.00");
    }

    #[test]
    fn test_text_cell_gap_detection() {
        let p = page(vec![
            Word::new("PAGO", 90.0, 220.0, 120.0, 230.0),
            Word::new("TARJETA", 125.0, 220.5, 170.0, 230.0),
            Word::new("CREDITO", 90.0, 232.0, 130.0, 242.0),
            Word::new("Aviso", 90.0, 280.0, 120.0, 290.0),
        ]);
        let g = grid(None);
        let view = PageView::new(&p, &g, 700.0, 792.0);
        let v = &*STATEMENT_VOCABULARY;
        assert_eq!(text_cell(&view, v, 80.0, 220.0, 358.0, 299.0, Some(20.0)), "PAGO TARJETA CREDITO");
        assert_eq!(text_cell(&view, v, 80.0, 220.0, 358.0, 299.0, None), "PAGO TARJETA CREDITO Aviso");
    }

    #[test]
    fn test_view_purges_pollution_zone() {
        let p = page(vec![
            Word::new("Referencia", 320.0, 220.0, 350.0, 230.0),
            Word::new("SPEI", 90.0, 220.0, 120.0, 230.0),
        ]);
        let g = grid(Some(XRange { x0: 315.0, x1: 358.0 }));
        let view = PageView::new(&p, &g, 700.0, 792.0);
        assert_eq!(view.words.len(), 1);
        assert_eq!(view.reference_label_ys, vec![220.0]);
    }
}
