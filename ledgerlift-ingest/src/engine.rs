//! The grid engine: walks a document page by page and emits transaction rows.

use anyhow::{ensure, Result};
use ledgerlift_core::{parse_money, Document, ExtractorConfig, PageWords, TransactionRow};
use tracing::{debug, info, warn};

use crate::cells::{numeric_cell, text_cell, PageView};
use crate::grid::{build_master_grid, MasterGrid};
use crate::limits::{data_extent, effective_limit, footer_y, has_wake_up_headers, repeated_header_bottom};
use crate::profile::LayoutProfile;
use crate::rows::{first_beacon_y, segment_rows, RowSlice};
use crate::session::{PageAction, PageSignals, Session, SessionState};
use crate::stitch::{join_text, orphan_text};

/// Rows start this far below the header row on a session's first page.
const HEADER_ROW_CLEARANCE: f64 = 10.0;
/// Rows start this far above the first data row on bare continuation pages.
const DATA_START_SLACK: f64 = 5.0;

/// Everything one document run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineOutput {
    pub rows: Vec<TransactionRow>,
    pub session_count: usize,
    /// Nominal-fallback dividers summed over all session grids
    pub grid_fallbacks: usize,
}

/// Mutable state of a single `extract` call.
#[derive(Debug, Default)]
struct RunContext {
    state: SessionState,
    out: EngineOutput,
}

/// Dual-mode table extractor, specialised by a [`LayoutProfile`].
#[derive(Debug, Clone)]
pub struct GridEngine<P: LayoutProfile> {
    profile: P,
    config: ExtractorConfig,
}

impl<P: LayoutProfile> GridEngine<P> {
    pub fn new(profile: P, config: ExtractorConfig) -> Self {
        Self { profile, config }
    }

    /// Extract every row of `doc`. Never fails; unreadable rows are skipped.
    pub fn extract(&self, doc: &Document) -> EngineOutput {
        let mut ctx = RunContext::default();
        for page in &doc.pages {
            self.process_page(&mut ctx, page);
        }
        info!(
            source = %doc.source_id,
            variant = %self.profile.variant(),
            rows = ctx.out.rows.len(),
            sessions = ctx.out.session_count,
            fused = ctx.state.is_fused(),
            "document extracted"
        );
        ctx.out
    }

    fn process_page(&self, ctx: &mut RunContext, page: &PageWords) {
        let vocab = self.profile.vocabulary();
        let policy = self.profile.policy();
        let signals = PageSignals {
            start_trigger: vocab.has_start_trigger(&page.full_text()),
            wake_up: policy.header_wake_up && has_wake_up_headers(page, vocab),
        };

        match ctx.state.admit(policy, signals) {
            PageAction::Skip => {
                debug!(page = page.number, fused = ctx.state.is_fused(), "page skipped");
                return;
            }
            PageAction::StartSession => {
                let grid = build_master_grid(page, &self.profile);
                ctx.out.session_count += 1;
                ctx.out.grid_fallbacks += grid.fallbacks;
                info!(
                    page = page.number,
                    session = ctx.out.session_count,
                    wake_up = !signals.start_trigger,
                    "recording started"
                );
                ctx.state = SessionState::Recording(Session::new(grid, ctx.out.rows.len()));
            }
            PageAction::Continue => {}
        }

        let stop = self.profile.confirm_stop(page);
        let Some(session) = ctx.state.session_mut() else {
            return;
        };
        let footer = footer_y(page, vocab);
        let limit = effective_limit(page.height, footer, stop.y);
        let view = PageView::new(page, &session.grid, limit, footer);
        let scan_start = self.scan_start(page, &session.grid);

        let opening_page = page.number == session.grid.start_page || signals.start_trigger;
        if !opening_page {
            self.stitch(&view, session, &mut ctx.out.rows, scan_start);
        }

        let slices = segment_rows(&view.words, scan_start, limit, self.profile.drops_masked_dates());
        debug!(page = page.number, scan_start, limit, rows = slices.len(), "page segmented");
        for slice in &slices {
            match self.build_row(&view, &session.grid, slice) {
                Ok(mut row) => {
                    if !session.pending_text.is_empty() {
                        let pending = std::mem::take(&mut session.pending_text);
                        self.profile.prepend_orphan(&mut row, &pending);
                    }
                    ctx.out.rows.push(row);
                }
                Err(err) => warn!(page = page.number, row = slice.index, "row skipped: {err:#}"),
            }
        }

        if stop.confirmed {
            info!(page = page.number, stop_y = ?stop.y, "stop phrase confirmed");
        }
        ctx.state = std::mem::take(&mut ctx.state).close_page(stop, policy);
    }

    /// Top of the row scan on `page`.
    fn scan_start(&self, page: &PageWords, grid: &MasterGrid) -> f64 {
        if page.number == grid.start_page {
            return grid.header_row_y + HEADER_ROW_CLEARANCE;
        }
        if let Some(bottom) = repeated_header_bottom(page, self.profile.vocabulary()) {
            return bottom;
        }
        match data_extent(page) {
            Some((start, _)) => start - DATA_START_SLACK,
            None => self.profile.continuation_scan_default(),
        }
    }

    /// Carry description text above the first beacon over to the previous row.
    fn stitch(&self, view: &PageView<'_>, session: &mut Session, rows: &mut [TransactionRow], scan_start: f64) {
        let vocab = self.profile.vocabulary();
        let Some(beacon_y) = first_beacon_y(&view.words, scan_start, view.limit_y) else {
            return;
        };
        let zone_top = repeated_header_bottom(view.page, vocab)
            .unwrap_or_else(|| self.profile.headerless_orphan_top(beacon_y));
        let orphan = orphan_text(view, &session.grid, vocab, zone_top, beacon_y);
        if orphan.is_empty() {
            return;
        }

        if rows.len() > session.first_row {
            if let Some(last) = rows.last_mut() {
                debug!(page = view.page.number, orphan = %orphan, "orphan text joined to previous row");
                self.profile.append_orphan(last, &orphan);
            }
        } else {
            debug!(page = view.page.number, orphan = %orphan, "orphan text held for first row");
            session.pending_text = join_text(&session.pending_text, &orphan);
        }
    }

    fn build_row(&self, view: &PageView<'_>, grid: &MasterGrid, slice: &RowSlice) -> Result<TransactionRow> {
        let vocab = self.profile.vocabulary();
        let l = grid.lines;
        let right_edge = view.right_edge().max(l[5]);
        let strategy = self.profile.numeric_strategy();
        let amount = |left: f64, right: f64| parse_money(&numeric_cell(strategy, view, vocab, left, right, slice));

        let description = text_cell(
            view,
            vocab,
            l[1],
            slice.y_top,
            self.profile.description_right(grid),
            slice.y_bottom,
            self.profile.text_gap_limit(),
        );

        let mut row = TransactionRow {
            oper_date: slice.date_text.clone(),
            liq_date: self.profile.liq_date(view, grid, slice),
            description,
            reference: String::new(),
            charges: amount(l[2], l[3]),
            credits: amount(l[3], l[4]),
            op_balance: amount(l[4], l[5]),
            liq_balance: amount(l[5], right_edge),
            page: view.page.number,
        };
        self.profile
            .resolve_reference(view, grid, slice, &mut row, &self.config);

        // A lone date token (notice text, a wrapped date column) is not a transaction.
        ensure!(
            has_content(&row),
            "{} at y={:.1} has no text and no amounts",
            row.oper_date,
            slice.y_top
        );
        Ok(row)
    }
}

fn has_content(row: &TransactionRow) -> bool {
    !row.description.is_empty()
        || !row.reference.is_empty()
        || [row.charges, row.credits, row.op_balance, row.liq_balance]
            .iter()
            .any(|v| !v.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{MaskedCardLayout, ReferenceColumnLayout};
    use ledgerlift_core::Word;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn header(y: f64) -> Vec<Word> {
        vec![
            Word::new("Detalle", 40.0, y - 40.0, 70.0, y - 30.0),
            Word::new("de", 72.0, y - 40.0, 80.0, y - 30.0),
            Word::new("Movimientos", 82.0, y - 40.0, 130.0, y - 30.0),
            Word::new("Realizados", 132.0, y - 40.0, 175.0, y - 30.0),
            Word::new("OPER", 20.0, y, 42.0, y + 9.0),
            Word::new("LIQ", 55.0, y, 70.0, y + 9.0),
            Word::new("DESCRIPCION", 100.0, y, 160.0, y + 9.0),
            Word::new("CARGOS", 375.0, y, 405.0, y + 9.0),
            Word::new("ABONOS", 430.0, y, 460.0, y + 9.0),
            Word::new("OPERACION", 480.0, y, 520.0, y + 9.0),
            Word::new("LIQUIDACION", 540.0, y, 590.0, y + 9.0),
        ]
    }

    fn row_words(y: f64, date: &str, desc: &str, charge: &str, balance: &str) -> Vec<Word> {
        vec![
            Word::new(date, 20.0, y, 45.0, y + 9.0),
            Word::new(date, 55.0, y, 80.0, y + 9.0),
            Word::new(desc, 100.0, y, 200.0, y + 9.0),
            Word::new(charge, 370.0, y, 405.0, y + 9.0),
            Word::new(balance, 480.0, y, 520.0, y + 9.0),
            Word::new(balance, 540.0, y, 580.0, y + 9.0),
        ]
    }

    #[test]
    fn test_type_a_single_page_rows() {
        let mut words = header(200.0);
        words.extend(row_words(220.0, "01/ENE", "OXXO", "50.00", "950.00"));
        words.extend(row_words(240.0, "02/ENE", "AUTOZONE ******2410", "100.00", "850.00"));
        let doc = Document::new("a", vec![PageWords::new(1, 612.0, 792.0, words)]);

        let out = GridEngine::new(MaskedCardLayout, ExtractorConfig::default()).extract(&doc);
        assert_eq!(out.session_count, 1);
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.rows[0].liq_date, "01/ENE");
        assert_eq!(out.rows[0].charges, dec("50.00"));
        assert_eq!(out.rows[0].op_balance, dec("950.00"));
        assert_eq!(out.rows[0].liq_balance, dec("950.00"));
        assert_eq!(out.rows[1].description, "AUTOZONE");
        assert_eq!(out.rows[1].reference, "******2410");
    }

    #[test]
    fn test_pages_before_trigger_are_ignored() {
        let noise = PageWords::new(1, 612.0, 792.0, row_words(300.0, "01/ENE", "X", "1.00", "1.00"));
        let doc = Document::new("n", vec![noise]);
        let out = GridEngine::new(ReferenceColumnLayout, ExtractorConfig::default()).extract(&doc);
        assert_eq!(out, EngineOutput::default());
    }

    #[test]
    fn test_pending_orphan_prefixes_first_row() {
        // Session opens on a header-only page; the next page starts with spill-over text.
        let opener = PageWords::new(1, 612.0, 792.0, header(200.0));
        let mut words = vec![Word::new("CONTINUA", 100.0, 60.0, 150.0, 69.0)];
        words.extend(row_words(100.0, "03/ENE", "SPEI", "10.00", "90.00"));
        let next = PageWords::new(2, 612.0, 792.0, words);
        let doc = Document::new("p", vec![opener, next]);

        let out = GridEngine::new(ReferenceColumnLayout, ExtractorConfig::default()).extract(&doc);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].description, "CONTINUA SPEI");
        assert_eq!(out.rows[0].page, 2);
    }

    #[test]
    fn test_column_labels_wake_up_session_without_title() {
        let mut words: Vec<Word> = header(150.0).into_iter().skip(4).collect();
        words.extend(row_words(170.0, "01/ENE", "OXXO", "50.00", "950.00"));
        words.extend(row_words(190.0, "02/ENE", "SPEI", "10.00", "940.00"));
        let doc = Document::new("w", vec![PageWords::new(1, 612.0, 792.0, words)]);

        let out = GridEngine::new(MaskedCardLayout, ExtractorConfig::default()).extract(&doc);
        assert_eq!(out.session_count, 1);
        assert_eq!(out.grid_fallbacks, 0);
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.rows[1].charges, dec("10.00"));

        let out = GridEngine::new(ReferenceColumnLayout, ExtractorConfig::default()).extract(&doc);
        assert_eq!(out, EngineOutput::default());
    }

    #[test]
    fn test_type_b_date_inside_masked_reference_is_not_a_row() {
        let mut words = header(200.0);
        words.extend(row_words(220.0, "05/ENE", "SPEI", "10.00", "90.00"));
        words.push(Word::new("12/FEB", 100.0, 232.0, 130.0, 241.0));
        words.push(Word::new("******8812", 135.0, 232.0, 185.0, 241.0));
        let doc = Document::new("m", vec![PageWords::new(1, 612.0, 792.0, words)]);

        let out = GridEngine::new(ReferenceColumnLayout, ExtractorConfig::default()).extract(&doc);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].oper_date, "05/ENE");
        assert_eq!(out.rows[0].description, "SPEI 12/FEB ******8812");
    }

    #[test]
    fn test_lone_date_token_is_skipped() {
        let mut words = header(200.0);
        words.extend(row_words(220.0, "01/ENE", "OXXO", "50.00", "950.00"));
        words.push(Word::new("15/ENE", 20.0, 260.0, 45.0, 269.0));
        let doc = Document::new("l", vec![PageWords::new(1, 612.0, 792.0, words)]);

        let out = GridEngine::new(MaskedCardLayout, ExtractorConfig::default()).extract(&doc);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].oper_date, "01/ENE");
    }
}
