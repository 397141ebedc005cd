//! Layout detection and the image-only pre-filter.

use ledgerlift_core::{Document, LayoutVariant, PageWords};
use tracing::debug;

/// Band where layout B prints its `Referencia` labels.
const REFERENCE_BAND: (f64, f64) = (280.0, 380.0);
const MASK_HINT: &str = "******";

/// Pick the layout from the first `max_pages` pages. Defaults to A.
pub fn classify_document(pages: &[PageWords], max_pages: usize) -> LayoutVariant {
    let mut mask_hints = 0usize;
    for page in pages.iter().take(max_pages) {
        for w in &page.words {
            if w.text.contains(MASK_HINT) {
                mask_hints += 1;
            }
            let in_band = w.x0() > REFERENCE_BAND.0 && w.x0() < REFERENCE_BAND.1;
            if in_band && w.text.trim().to_lowercase().starts_with("referencia") {
                debug!(page = page.number, x0 = w.x0(), "reference column label found");
                return LayoutVariant::B;
            }
        }
    }
    debug!(mask_hints, "no reference column; masked-card layout");
    LayoutVariant::A
}

/// True when the pages average fewer than `min_chars_per_page` visible characters.
pub fn is_unstructured(doc: &Document, min_chars_per_page: usize) -> bool {
    if doc.pages.is_empty() {
        return false;
    }
    let total: usize = doc.pages.iter().map(|p| p.non_whitespace_chars()).sum();
    total / doc.pages.len() < min_chars_per_page
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlift_core::Word;

    fn page(words: Vec<Word>) -> PageWords {
        PageWords::new(1, 612.0, 792.0, words)
    }

    #[test]
    fn test_reference_label_selects_b() {
        let p = page(vec![Word::new("Referencia", 300.0, 250.0, 340.0, 260.0)]);
        assert_eq!(classify_document(&[p], 3), LayoutVariant::B);
    }

    #[test]
    fn test_label_outside_band_is_a() {
        let p = page(vec![
            Word::new("Referencia", 100.0, 250.0, 140.0, 260.0),
            Word::new("******2410", 200.0, 250.0, 240.0, 260.0),
        ]);
        assert_eq!(classify_document(&[p], 3), LayoutVariant::A);
        assert_eq!(classify_document(&[], 3), LayoutVariant::A);
    }

    #[test]
    fn test_only_leading_pages_are_scanned() {
        let plain = page(vec![Word::new("SALDO", 300.0, 100.0, 330.0, 110.0)]);
        let late = page(vec![Word::new("REFERENCIA", 300.0, 250.0, 340.0, 260.0)]);
        let pages = vec![plain.clone(), plain, late];
        assert_eq!(classify_document(&pages, 2), LayoutVariant::A);
        assert_eq!(classify_document(&pages, 3), LayoutVariant::B);
    }

    #[test]
    fn test_unstructured_by_density() {
        let sparse = Document::new("s", vec![page(vec![Word::new("x", 0.0, 0.0, 1.0, 1.0)])]);
        assert!(is_unstructured(&sparse, 50));
        let dense = Document::new("d", vec![PageWords::new(1, 612.0, 792.0, vec![]).with_text("a".repeat(80))]);
        assert!(!is_unstructured(&dense, 50));
        assert!(!is_unstructured(&Document::new("e", vec![]), 50));
    }
}
