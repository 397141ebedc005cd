//! Master grid: column dividers inferred from header label positions.
//!
//! The table has no ruling lines, so the six vertical dividers are derived
//! from where the column labels sit on the session's first page. When a label
//! is missing the divider falls back to a nominal coordinate; building a grid
//! never fails.

use ledgerlift_core::{BBox, PageWords};
use tracing::{debug, warn};

use crate::profile::LayoutProfile;
use crate::vocabulary::Vocabulary;

/// Labels farther than this from the header row are ignored.
pub const HEADER_Y_TOLERANCE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderLabel {
    Oper,
    Liq,
    Descripcion,
    Referencia,
    Cargos,
    Abonos,
    Operacion,
    Liquidacion,
}

impl HeaderLabel {
    pub const ALL: [HeaderLabel; 8] = [
        HeaderLabel::Oper,
        HeaderLabel::Liq,
        HeaderLabel::Descripcion,
        HeaderLabel::Referencia,
        HeaderLabel::Cargos,
        HeaderLabel::Abonos,
        HeaderLabel::Operacion,
        HeaderLabel::Liquidacion,
    ];

    fn terms(&self) -> &'static [&'static str] {
        match self {
            HeaderLabel::Oper => &["OPER"],
            HeaderLabel::Liq => &["LIQ"],
            HeaderLabel::Descripcion => &["DESCRIPCION", "DESCRIPCI"],
            HeaderLabel::Referencia => &["REFERENCIA"],
            HeaderLabel::Cargos => &["CARGOS"],
            HeaderLabel::Abonos => &["ABONOS"],
            HeaderLabel::Operacion => &["OPERACION", "OPERACI"],
            HeaderLabel::Liquidacion => &["LIQUIDACION", "LIQUIDACI"],
        }
    }

    /// Balance labels share prefixes with the date labels; keep them apart by x.
    fn min_x0(&self) -> f64 {
        match self {
            HeaderLabel::Operacion => 400.0,
            HeaderLabel::Liquidacion => 500.0,
            _ => f64::NEG_INFINITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderBox {
    pub label: HeaderLabel,
    pub bbox: BBox,
}

/// The header labels found on one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderBoxes {
    boxes: Vec<HeaderBox>,
}

impl HeaderBoxes {
    pub fn get(&self, label: HeaderLabel) -> Option<&HeaderBox> {
        self.boxes.iter().find(|b| b.label == label)
    }

    pub fn left(&self, label: HeaderLabel) -> Option<f64> {
        self.get(label).map(|b| b.bbox.x0)
    }

    pub fn right(&self, label: HeaderLabel) -> Option<f64> {
        self.get(label).map(|b| b.bbox.x1)
    }

    /// Midpoint between the right edge of `a` and the left edge of `b`.
    pub fn gap_midpoint(&self, a: HeaderLabel, b: HeaderLabel) -> Option<f64> {
        Some((self.right(a)? + self.left(b)?) / 2.0)
    }

    pub fn bottom(&self) -> Option<f64> {
        self.boxes.iter().map(|b| b.bbox.y1).reduce(f64::max)
    }

    pub(crate) fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn push(&mut self, label: HeaderLabel, bbox: BBox) {
        self.boxes.push(HeaderBox { label, bbox });
    }
}

/// Six divider x-coordinates plus how many came from nominal fallbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct Dividers {
    pub lines: [f64; 6],
    nominal: [f64; 6],
    pub fallbacks: usize,
}

impl Dividers {
    pub fn nominal(lines: [f64; 6]) -> Self {
        Self {
            lines,
            nominal: lines,
            fallbacks: 0,
        }
    }

    /// Use `value` for divider `idx`, or keep the nominal one and count it.
    pub fn set(&mut self, idx: usize, value: Option<f64>) {
        match value {
            Some(v) if v.is_finite() => self.lines[idx] = v,
            _ => self.fallbacks += 1,
        }
    }

    /// Force strictly increasing dividers, keeping nominal spacing where repaired.
    ///
    /// Returns true when anything had to be moved.
    pub fn enforce_increasing(&mut self) -> bool {
        let mut repaired = false;
        for i in 1..self.lines.len() {
            if self.lines[i] <= self.lines[i - 1] {
                let spacing = (self.nominal[i] - self.nominal[i - 1]).max(1.0);
                self.lines[i] = self.lines[i - 1] + spacing;
                repaired = true;
            }
        }
        repaired
    }
}

/// Half-open horizontal band `[x0, x1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XRange {
    pub x0: f64,
    pub x1: f64,
}

impl XRange {
    pub fn contains(&self, x: f64) -> bool {
        x >= self.x0 && x < self.x1
    }
}

/// Table geometry shared by every page of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterGrid {
    /// Strictly increasing vertical dividers L1..L6
    pub lines: [f64; 6],
    pub header_row_y: f64,
    pub header_bottom_y: f64,
    /// Band reserved for free-floating reference text (layout B only)
    pub pollution_zone: Option<XRange>,
    /// Page the grid was built from
    pub start_page: u32,
    /// Dividers that fell back to nominal coordinates
    pub fallbacks: usize,
}

impl MasterGrid {
    /// Left edge of the charges column.
    pub fn charges_left(&self) -> f64 {
        self.lines[2]
    }

    /// Left edge of the operation-balance column.
    pub fn op_balance_left(&self) -> f64 {
        self.lines[4]
    }

    pub fn is_polluted(&self, x0: f64) -> bool {
        self.pollution_zone.is_some_and(|z| z.contains(x0))
    }
}

/// Bottom edge of the table title, or 15% of the page height.
pub fn find_horizon(page: &PageWords, vocab: &Vocabulary) -> f64 {
    vocab
        .horizon_phrases
        .iter()
        .find_map(|re| page.find_phrase(re).first().map(|b| b.y1))
        .unwrap_or(page.height * 0.15)
}

/// Topmost column label below the horizon and above 80% of the page.
pub fn find_header_row_y(page: &PageWords, horizon_y: f64) -> f64 {
    ["CARGOS", "ABONOS", "OPER"]
        .iter()
        .flat_map(|term| page.find_term(term))
        .map(|w| w.y0())
        .filter(|y| *y > horizon_y && *y < page.height * 0.80)
        .reduce(f64::min)
        .unwrap_or(horizon_y + 20.0)
}

/// Locate each column label near the header row; the left-most match wins.
pub fn locate_headers(page: &PageWords, horizon_y: f64, header_row_y: f64) -> HeaderBoxes {
    let mut found = HeaderBoxes::default();
    for label in HeaderLabel::ALL {
        let hit = label.terms().iter().find_map(|term| {
            page.find_term(term)
                .into_iter()
                .filter(|w| w.y0() >= horizon_y)
                .filter(|w| (w.y0() - header_row_y).abs() <= HEADER_Y_TOLERANCE)
                .filter(|w| w.x0() >= label.min_x0())
                .min_by(|a, b| a.x0().total_cmp(&b.x0()))
        });
        if let Some(w) = hit {
            found.push(label, w.bbox);
        }
    }
    found
}

/// Build the session grid from the page that opened the session.
pub fn build_master_grid<P: LayoutProfile + ?Sized>(page: &PageWords, profile: &P) -> MasterGrid {
    let vocab = profile.vocabulary();
    let horizon_y = find_horizon(page, vocab);
    let header_row_y = find_header_row_y(page, horizon_y);
    let headers = locate_headers(page, horizon_y, header_row_y);
    let header_bottom_y = headers.bottom().unwrap_or(header_row_y + 15.0);

    let mut dividers = profile.dividers(&headers);
    if dividers.enforce_increasing() {
        warn!(page = page.number, lines = ?dividers.lines, "header geometry out of order; dividers repaired");
    }
    if dividers.fallbacks > 0 {
        warn!(
            page = page.number,
            fallbacks = dividers.fallbacks,
            found = headers.len(),
            "missing column labels; using nominal dividers"
        );
    }

    let pollution_zone = profile.pollution_zone(&headers, &dividers.lines);
    debug!(page = page.number, lines = ?dividers.lines, header_row_y, header_bottom_y, "grid locked");

    MasterGrid {
        lines: dividers.lines,
        header_row_y,
        header_bottom_y,
        pollution_zone,
        start_page: page.number,
        fallbacks: dividers.fallbacks,
    }
}
