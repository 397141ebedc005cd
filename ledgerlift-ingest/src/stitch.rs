//! Description text that spills over a page break.
//!
//! On continuation pages, words in the description column above the first
//! date beacon belong to the last row of the previous page.

use ledgerlift_core::page::LINE_TOLERANCE;
use ledgerlift_core::reading_order;

use crate::cells::PageView;
use crate::grid::MasterGrid;
use crate::vocabulary::Vocabulary;

const BEACON_CLEARANCE: f64 = 2.0;
const COLUMN_SLACK: f64 = 3.0;

/// Orphaned description text between `zone_top` and the first beacon.
pub fn orphan_text(view: &PageView<'_>, grid: &MasterGrid, vocab: &Vocabulary, zone_top: f64, beacon_y: f64) -> String {
    let zone_bottom = beacon_y - BEACON_CLEARANCE;
    if zone_bottom <= zone_top {
        return String::new();
    }
    let left = grid.lines[1] - COLUMN_SLACK;
    let right = grid.lines[2];

    let orphans = view.words.iter().copied().filter(|w| {
        w.y0() >= zone_top
            && w.y0() < zone_bottom
            && w.x0() >= left
            && w.x0() < right
            && !vocab.is_header_noise(&w.text)
            && !vocab.is_page_header_text(&w.text)
    });
    reading_order(orphans, LINE_TOLERANCE)
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Space-join two text fragments, skipping empty ones.
pub fn join_text(head: &str, tail: &str) -> String {
    match (head.trim(), tail.trim()) {
        ("", t) => t.to_string(),
        (h, "") => h.to_string(),
        (h, t) => format!("{h} {t}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::STATEMENT_VOCABULARY;
    use ledgerlift_core::{PageWords, Word};

    fn grid() -> MasterGrid {
        MasterGrid {
            lines: [48.0, 80.0, 358.0, 420.0, 471.0, 530.0],
            header_row_y: 200.0,
            header_bottom_y: 210.0,
            pollution_zone: None,
            start_page: 1,
            fallbacks: 0,
        }
    }

    #[test]
    fn test_orphans_above_first_beacon() {
        let page = PageWords::new(
            2,
            612.0,
            792.0,
            vec![
                Word::new("BBVA", 90.0, 20.0, 120.0, 30.0),
                Word::new("CARGOS", 375.0, 40.0, 405.0, 50.0),
                Word::new("20250626400140BET", 90.0, 60.0, 180.0, 70.0),
                Word::new("1,000.00", 375.0, 60.0, 405.0, 70.0),
                Word::new("02/JUL", 20.0, 90.0, 50.0, 100.0),
                Word::new("NEXT", 90.0, 90.0, 120.0, 100.0),
            ],
        );
        let g = grid();
        let view = PageView::new(&page, &g, 700.0, 792.0);
        let text = orphan_text(&view, &g, &STATEMENT_VOCABULARY, 0.0, 90.0);
        assert_eq!(text, "20250626400140BET");
        assert_eq!(join_text("SPEI RECIBIDO SANTANDER", &text), "SPEI RECIBIDO SANTANDER 20250626400140BET");
    }

    #[test]
    fn test_empty_zone() {
        let page = PageWords::new(2, 612.0, 792.0, vec![Word::new("X", 90.0, 60.0, 100.0, 70.0)]);
        let g = grid();
        let view = PageView::new(&page, &g, 700.0, 792.0);
        assert_eq!(orphan_text(&view, &g, &STATEMENT_VOCABULARY, 100.0, 90.0), "");
        assert_eq!(join_text("", "tail"), "tail");
        assert_eq!(join_text("head", " "), "head");
    }
}
