//! Extracted transaction rows and the per-document result envelope.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The two statement layouts the engine knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LayoutVariant {
    /// Masked card numbers (`******2410`) share the description column.
    #[default]
    A,
    /// A separate, unruled `Referencia ...` column.
    B,
}

impl fmt::Display for LayoutVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutVariant::A => f.write_str("A"),
            LayoutVariant::B => f.write_str("B"),
        }
    }
}

/// One extracted transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    /// Operation date as printed (`05/ENE`)
    pub oper_date: String,
    /// Settlement date as printed; may be empty
    pub liq_date: String,
    pub description: String,
    pub reference: String,
    pub charges: Decimal,
    pub credits: Decimal,
    /// Running balance after the operation
    pub op_balance: Decimal,
    /// Running settled balance
    pub liq_balance: Decimal,
    /// 1-based source page
    pub page: u32,
}

impl TransactionRow {
    /// Signed movement: credits minus charges.
    pub fn net_amount(&self) -> Decimal {
        self.credits - self.charges
    }
}

/// Outcome of a document run. Only `Ok` carries rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    Ok,
    /// The document has no pages.
    NoPages,
    /// Too little text per page; an image-only scan.
    Unstructured,
    /// No start trigger or header wake-up was ever seen.
    NoTableFound,
}

/// Persistence/interop wrapper around a document's rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionEnvelope {
    pub source_id: String,
    pub detected_type: LayoutVariant,
    pub total_pages: usize,
    pub total_rows: usize,
    pub session_count: usize,
    pub status: ExtractionStatus,
    /// Grid dividers that fell back to nominal coordinates, summed over sessions.
    #[serde(default)]
    pub grid_fallbacks: usize,
    pub rows: Vec<TransactionRow>,
}

impl ExtractionEnvelope {
    /// An envelope with no rows.
    pub fn empty(
        source_id: impl Into<String>,
        detected_type: LayoutVariant,
        total_pages: usize,
        status: ExtractionStatus,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            detected_type,
            total_pages,
            total_rows: 0,
            session_count: 0,
            status,
            grid_fallbacks: 0,
            rows: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ExtractionStatus::Ok
    }
}
