//! Layout profiles: everything that differs between statement variants A and B.
//!
//! The engine is generic over [`LayoutProfile`]; each profile owns its divider
//! formulas, cell strategy, stop rule and reference handling.

use ledgerlift_core::{first_inline_date, ExtractorConfig, LayoutVariant, PageWords, TransactionRow};

use crate::cells::{text_cell, CellStrategy, PageView};
use crate::grid::{Dividers, HeaderBoxes, HeaderLabel as H, MasterGrid, XRange};
use crate::limits::{data_extent, stop_phrase_below, stop_trigger_y, StopSignal};
use crate::migrate::{rejoin_and_split, split_masked_reference};
use crate::reference::{backfill_reference, KnownValues};
use crate::rows::RowSlice;
use crate::session::SessionPolicy;
use crate::stitch::join_text;
use crate::vocabulary::{Vocabulary, STATEMENT_VOCABULARY};

/// Height of the settlement-date cell on layout A.
const LIQ_CELL_HEIGHT: f64 = 15.0;
/// Extra depth below the beacon for the settlement date on layout B.
const LIQ_BEACON_SLACK: f64 = 3.0;
/// Stop phrases on pages without data rows only count below this fraction.
const STOP_FLOOR: f64 = 0.30;
/// Without a repeated header, orphan text is looked for this far above the first beacon.
const ORPHAN_BAND: f64 = 20.0;
/// Beacons this close to the page top scan for orphans from y = 0.
const ORPHAN_BAND_MIN_Y: f64 = 30.0;

pub trait LayoutProfile {
    fn variant(&self) -> LayoutVariant;

    fn vocabulary(&self) -> &Vocabulary {
        &STATEMENT_VOCABULARY
    }

    fn policy(&self) -> SessionPolicy;

    /// Six column dividers from the located header labels.
    fn dividers(&self, headers: &HeaderBoxes) -> Dividers;

    /// Band excluded from per-cell scans.
    fn pollution_zone(&self, _headers: &HeaderBoxes, _lines: &[f64; 6]) -> Option<XRange> {
        None
    }

    fn numeric_strategy(&self) -> CellStrategy;

    /// Whether dates sharing a line with a masked reference are dropped.
    fn drops_masked_dates(&self) -> bool;

    /// Max line gap absorbed by a description cell.
    fn text_gap_limit(&self) -> Option<f64>;

    /// Scan start on continuation pages with no header and no data.
    fn continuation_scan_default(&self) -> f64;

    /// Top of the orphan zone on a continuation page that repeats no column header.
    fn headerless_orphan_top(&self, _beacon_y: f64) -> f64 {
        0.0
    }

    /// Whether (and where) the table ends on this page.
    fn confirm_stop(&self, page: &PageWords) -> StopSignal;

    fn liq_date(&self, view: &PageView<'_>, grid: &MasterGrid, slice: &RowSlice) -> String;

    /// Right edge of the description cell.
    fn description_right(&self, grid: &MasterGrid) -> f64 {
        grid.lines[2]
    }

    /// Fill `row.reference` once the amounts are known.
    fn resolve_reference(
        &self,
        view: &PageView<'_>,
        grid: &MasterGrid,
        slice: &RowSlice,
        row: &mut TransactionRow,
        config: &ExtractorConfig,
    );

    /// Attach text found after `row` on a later page.
    fn append_orphan(&self, row: &mut TransactionRow, orphan: &str) {
        row.description = join_text(&row.description, orphan);
    }

    /// Attach text found before `row` on an earlier page.
    fn prepend_orphan(&self, row: &mut TransactionRow, orphan: &str) {
        row.description = join_text(orphan, &row.description);
    }
}

/// Layout A: masked card numbers inline with the description, jittery amounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskedCardLayout;

impl LayoutProfile for MaskedCardLayout {
    fn variant(&self) -> LayoutVariant {
        LayoutVariant::A
    }

    fn policy(&self) -> SessionPolicy {
        SessionPolicy {
            fuse: true,
            header_wake_up: true,
            restart_on_trigger: false,
        }
    }

    fn dividers(&self, h: &HeaderBoxes) -> Dividers {
        let mut d = Dividers::nominal([48.0, 80.0, 358.0, 420.0, 471.0, 530.0]);
        d.set(0, h.right(H::Oper).map(|x| x + 3.0));
        d.set(1, h.gap_midpoint(H::Liq, H::Descripcion));
        d.set(2, h.left(H::Cargos).map(|x| x - 15.0));
        d.set(3, h.left(H::Abonos).map(|x| x - 10.0));
        d.set(4, h.gap_midpoint(H::Abonos, H::Operacion));
        d.set(5, h.gap_midpoint(H::Operacion, H::Liquidacion));
        d
    }

    fn numeric_strategy(&self) -> CellStrategy {
        CellStrategy::Centroid
    }

    fn drops_masked_dates(&self) -> bool {
        false
    }

    fn text_gap_limit(&self) -> Option<f64> {
        Some(20.0)
    }

    fn continuation_scan_default(&self) -> f64 {
        150.0
    }

    /// Only the band just above the first beacon; running page headers sit higher.
    fn headerless_orphan_top(&self, beacon_y: f64) -> f64 {
        if beacon_y > ORPHAN_BAND_MIN_Y {
            beacon_y - ORPHAN_BAND
        } else {
            0.0
        }
    }

    /// Only a stop phrase below the last row with an amount ends the table.
    fn confirm_stop(&self, page: &PageWords) -> StopSignal {
        let floor = match data_extent(page) {
            Some((_, data_end)) => data_end,
            None => page.height * STOP_FLOOR,
        };
        match stop_phrase_below(page, self.vocabulary(), floor) {
            Some(y) => StopSignal::at(y),
            None => StopSignal::none(),
        }
    }

    fn liq_date(&self, view: &PageView<'_>, grid: &MasterGrid, slice: &RowSlice) -> String {
        let raw = text_cell(
            view,
            self.vocabulary(),
            grid.lines[0],
            slice.y_top,
            grid.lines[1],
            slice.y_top + LIQ_CELL_HEIGHT,
            None,
        );
        first_inline_date(&raw)
    }

    fn resolve_reference(
        &self,
        _view: &PageView<'_>,
        _grid: &MasterGrid,
        _slice: &RowSlice,
        row: &mut TransactionRow,
        _config: &ExtractorConfig,
    ) {
        let (description, reference) = split_masked_reference(&row.description);
        row.description = description;
        row.reference = reference;
    }

    fn append_orphan(&self, row: &mut TransactionRow, orphan: &str) {
        let (description, reference) = rejoin_and_split(&row.description, &row.reference, orphan);
        row.description = description;
        row.reference = reference;
    }

    fn prepend_orphan(&self, row: &mut TransactionRow, orphan: &str) {
        let (description, reference) = rejoin_and_split(orphan, &row.description, &row.reference);
        row.description = description;
        row.reference = reference;
    }
}

/// Layout B: a free-floating `Referencia` column, amounts on the beacon line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceColumnLayout;

impl LayoutProfile for ReferenceColumnLayout {
    fn variant(&self) -> LayoutVariant {
        LayoutVariant::B
    }

    fn policy(&self) -> SessionPolicy {
        SessionPolicy {
            fuse: false,
            header_wake_up: false,
            restart_on_trigger: true,
        }
    }

    fn dividers(&self, h: &HeaderBoxes) -> Dividers {
        let mut d = Dividers::nominal([57.0, 94.0, 366.0, 418.0, 462.0, 525.0]);
        d.set(0, h.gap_midpoint(H::Oper, H::Liq));
        d.set(1, h.gap_midpoint(H::Liq, H::Descripcion));
        d.set(2, h.left(H::Cargos).map(|x| x - 15.0));
        d.set(3, h.left(H::Abonos).map(|x| x - 5.0));
        d.set(4, h.gap_midpoint(H::Abonos, H::Operacion));
        d.set(5, h.gap_midpoint(H::Operacion, H::Liquidacion));
        d
    }

    fn pollution_zone(&self, h: &HeaderBoxes, lines: &[f64; 6]) -> Option<XRange> {
        let x0 = h.left(H::Referencia).map_or(315.0, |x| x - 5.0);
        Some(XRange { x0, x1: lines[2] })
    }

    fn numeric_strategy(&self) -> CellStrategy {
        CellStrategy::StrictGrid
    }

    fn drops_masked_dates(&self) -> bool {
        true
    }

    fn text_gap_limit(&self) -> Option<f64> {
        None
    }

    fn continuation_scan_default(&self) -> f64 {
        130.0
    }

    /// Any stop phrase in the page text ends the session; its y bounds the rows when found.
    fn confirm_stop(&self, page: &PageWords) -> StopSignal {
        let vocab = self.vocabulary();
        if !vocab.has_stop_trigger(&page.full_text()) {
            return StopSignal::none();
        }
        StopSignal {
            confirmed: true,
            y: stop_trigger_y(page, vocab),
        }
    }

    fn liq_date(&self, view: &PageView<'_>, grid: &MasterGrid, slice: &RowSlice) -> String {
        text_cell(
            view,
            self.vocabulary(),
            grid.lines[0],
            slice.y_top,
            grid.lines[1],
            slice.date_y1 + LIQ_BEACON_SLACK,
            None,
        )
    }

    fn description_right(&self, grid: &MasterGrid) -> f64 {
        grid.pollution_zone.map_or(grid.lines[2], |z| z.x0 - 5.0)
    }

    fn resolve_reference(
        &self,
        view: &PageView<'_>,
        grid: &MasterGrid,
        slice: &RowSlice,
        row: &mut TransactionRow,
        config: &ExtractorConfig,
    ) {
        let known = KnownValues {
            charges: row.charges,
            credits: row.credits,
            op_balance: row.op_balance,
            liq_balance: row.liq_balance,
        };
        row.reference = backfill_reference(
            &view.page.words,
            grid,
            slice.y_top,
            slice.y_bottom,
            view.footer_y,
            &known,
            config.reference_fallback,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlift_core::Word;
    use rust_decimal::Decimal;

    fn row(description: &str, reference: &str) -> TransactionRow {
        TransactionRow {
            oper_date: "01/ENE".to_string(),
            liq_date: String::new(),
            description: description.to_string(),
            reference: reference.to_string(),
            charges: Decimal::ZERO,
            credits: Decimal::ZERO,
            op_balance: Decimal::ZERO,
            liq_balance: Decimal::ZERO,
            page: 1,
        }
    }

    #[test]
    fn test_smart_stop_requires_phrase_below_data() {
        let above = PageWords::new(
            1,
            612.0,
            792.0,
            vec![
                Word::new("TOTAL", 40.0, 300.0, 70.0, 310.0),
                Word::new("IMPORTE", 72.0, 300.0, 110.0, 310.0),
                Word::new("10/ENE", 20.0, 400.0, 50.0, 410.0),
                Word::new("100.00", 380.0, 400.0, 410.0, 410.0),
            ],
        );
        assert!(!MaskedCardLayout.confirm_stop(&above).confirmed);

        let below = PageWords::new(
            1,
            612.0,
            792.0,
            vec![
                Word::new("10/ENE", 20.0, 400.0, 50.0, 410.0),
                Word::new("100.00", 380.0, 400.0, 410.0, 410.0),
                Word::new("TOTAL", 40.0, 450.0, 70.0, 460.0),
                Word::new("IMPORTE", 72.0, 450.0, 110.0, 460.0),
            ],
        );
        assert_eq!(MaskedCardLayout.confirm_stop(&below), StopSignal::at(450.0));
    }

    #[test]
    fn test_type_b_stop_from_page_text() {
        let page = PageWords::new(1, 612.0, 792.0, vec![]).with_text("Total de Movimientos");
        let signal = ReferenceColumnLayout.confirm_stop(&page);
        assert!(signal.confirmed);
        assert_eq!(signal.y, None);
    }

    #[test]
    fn test_type_a_orphans_resplit() {
        let mut r = row("OXXO", "");
        MaskedCardLayout.append_orphan(&mut r, "GAS ******5678");
        assert_eq!(r.description, "OXXO GAS");
        assert_eq!(r.reference, "******5678");

        let mut r = row("TIENDA ******1111", "");
        MaskedCardLayout.resolve_reference(
            &PageView::new(&PageWords::new(1, 612.0, 792.0, vec![]), &grid(), 700.0, 792.0),
            &grid(),
            &slice(),
            &mut r,
            &ExtractorConfig::default(),
        );
        MaskedCardLayout.prepend_orphan(&mut r, "PAGO");
        assert_eq!(r.description, "PAGO TIENDA");
        assert_eq!(r.reference, "******1111");
    }

    #[test]
    fn test_type_b_orphans_join_description() {
        let mut r = row("SPEI RECIBIDO SANTANDER", "Referencia 1");
        ReferenceColumnLayout.append_orphan(&mut r, "20250626400140BET");
        assert_eq!(r.description, "SPEI RECIBIDO SANTANDER 20250626400140BET");
        assert_eq!(r.reference, "Referencia 1");
    }

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

    fn slice() -> RowSlice {
        RowSlice {
            index: 0,
            y_top: 220.0,
            y_bottom: 259.0,
            date_text: "01/ENE".to_string(),
            date_y1: 230.0,
        }
    }
}
