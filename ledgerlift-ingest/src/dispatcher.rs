//! Document entry point: pre-filter, classify once, run the matching engine.

use ledgerlift_core::{Document, ExtractionEnvelope, ExtractionStatus, ExtractorConfig, LayoutVariant};
use tracing::{info, warn};

use crate::classify::{classify_document, is_unstructured};
use crate::engine::{EngineOutput, GridEngine};
use crate::profile::{MaskedCardLayout, ReferenceColumnLayout};

#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    config: ExtractorConfig,
}

impl Dispatcher {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, doc: &Document) -> LayoutVariant {
        classify_document(&doc.pages, self.config.classifier_pages)
    }

    /// Extract a whole document. Every outcome is an envelope; nothing here fails.
    pub fn extract(&self, doc: &Document) -> ExtractionEnvelope {
        let total_pages = doc.pages.len();
        if total_pages == 0 {
            warn!(source = %doc.source_id, "document has no pages");
            return ExtractionEnvelope::empty(&doc.source_id, LayoutVariant::default(), 0, ExtractionStatus::NoPages);
        }
        if is_unstructured(doc, self.config.min_chars_per_page) {
            warn!(source = %doc.source_id, pages = total_pages, "too little text; image-only document");
            return ExtractionEnvelope::empty(
                &doc.source_id,
                LayoutVariant::default(),
                total_pages,
                ExtractionStatus::Unstructured,
            );
        }

        let variant = self.classify(doc);
        info!(source = %doc.source_id, %variant, pages = total_pages, "layout detected");
        let out = match variant {
            LayoutVariant::A => GridEngine::new(MaskedCardLayout, self.config.clone()).extract(doc),
            LayoutVariant::B => GridEngine::new(ReferenceColumnLayout, self.config.clone()).extract(doc),
        };
        envelope(&doc.source_id, variant, total_pages, out)
    }
}

fn envelope(source_id: &str, variant: LayoutVariant, total_pages: usize, out: EngineOutput) -> ExtractionEnvelope {
    let status = if out.session_count == 0 {
        ExtractionStatus::NoTableFound
    } else {
        ExtractionStatus::Ok
    };
    ExtractionEnvelope {
        source_id: source_id.to_string(),
        detected_type: variant,
        total_pages,
        total_rows: out.rows.len(),
        session_count: out.session_count,
        status,
        grid_fallbacks: out.grid_fallbacks,
        rows: out.rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlift_core::{PageWords, Word};

    #[test]
    fn test_no_pages() {
        let env = Dispatcher::default().extract(&Document::new("empty", vec![]));
        assert_eq!(env.status, ExtractionStatus::NoPages);
        assert_eq!(env.total_pages, 0);
        assert!(env.rows.is_empty());
    }

    #[test]
    fn test_sessionless_document_has_no_table() {
        let text = "Resumen de saldos y comisiones del periodo sin tabla de movimientos";
        let page = PageWords::new(1, 612.0, 792.0, vec![Word::new("Resumen", 40.0, 100.0, 90.0, 110.0)]).with_text(text);
        let env = Dispatcher::default().extract(&Document::new("summary", vec![page]));
        assert_eq!(env.status, ExtractionStatus::NoTableFound);
        assert_eq!(env.detected_type, LayoutVariant::A);
        assert_eq!(env.total_pages, 1);
    }

    #[test]
    fn test_classify_reference_label_beside_value() {
        let labelled = PageWords::new(
            1,
            612.0,
            792.0,
            vec![
                Word::new("Referencia", 310.0, 232.0, 350.0, 241.0),
                Word::new("8129595110", 355.0, 232.0, 400.0, 241.0),
            ],
        );
        let masked = PageWords::new(1, 612.0, 792.0, vec![Word::new("******2410", 200.0, 232.0, 250.0, 241.0)]);
        let dispatcher = Dispatcher::default();
        assert_eq!(dispatcher.classify(&Document::new("b", vec![labelled])), LayoutVariant::B);
        assert_eq!(dispatcher.classify(&Document::new("a", vec![masked])), LayoutVariant::A);
    }
}
