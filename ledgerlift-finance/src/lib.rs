//! ledgerlift-finance: balance reconciliation and CSV export for extracted rows

pub mod csv_export;
pub mod reconcile;

pub use csv_export::{write_rows, write_rows_to_path};
pub use reconcile::{reconcile, BalanceBreak, PageTotals, ReconciliationReport};
