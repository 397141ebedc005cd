//! Balance reconciliation over extracted rows.
//!
//! Statements print the running balance only on some rows (usually the last
//! movement of a day). Between two printed balances the movements in between
//! must add up: `previous + credits - charges == printed`.

use std::collections::BTreeMap;

use ledgerlift_core::TransactionRow;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A printed balance that does not follow from the rows before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceBreak {
    /// Index of the offending row
    pub index: usize,
    pub page: u32,
    pub oper_date: String,
    pub expected: Decimal,
    pub printed: Decimal,
}

impl BalanceBreak {
    pub fn difference(&self) -> Decimal {
        self.printed - self.expected
    }
}

/// Movement totals for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageTotals {
    pub rows: usize,
    pub charges: Decimal,
    pub credits: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub rows: usize,
    pub total_charges: Decimal,
    pub total_credits: Decimal,
    /// Balance before the first row, when a balance was printed at all
    pub opening_balance: Option<Decimal>,
    /// Last printed balance
    pub closing_balance: Option<Decimal>,
    /// Printed balances that could be checked
    pub checked: usize,
    pub breaks: Vec<BalanceBreak>,
    pub by_page: BTreeMap<u32, PageTotals>,
}

impl ReconciliationReport {
    pub fn is_balanced(&self) -> bool {
        self.breaks.is_empty()
    }

    pub fn net_movement(&self) -> Decimal {
        self.total_credits - self.total_charges
    }
}

/// Walk `rows` in order and check every printed balance against the movements.
pub fn reconcile(rows: &[TransactionRow]) -> ReconciliationReport {
    let mut report = ReconciliationReport {
        rows: rows.len(),
        ..Default::default()
    };
    let mut last_balance: Option<Decimal> = None;
    let mut pending = Decimal::ZERO;

    for (index, row) in rows.iter().enumerate() {
        report.total_charges += row.charges;
        report.total_credits += row.credits;
        let totals = report.by_page.entry(row.page).or_default();
        totals.rows += 1;
        totals.charges += row.charges;
        totals.credits += row.credits;

        pending += row.net_amount();
        if row.op_balance.is_zero() {
            continue;
        }

        match last_balance {
            Some(prev) => {
                let expected = prev + pending;
                report.checked += 1;
                if expected != row.op_balance {
                    warn!(index, page = row.page, %expected, printed = %row.op_balance, "balance break");
                    report.breaks.push(BalanceBreak {
                        index,
                        page: row.page,
                        oper_date: row.oper_date.clone(),
                        expected,
                        printed: row.op_balance,
                    });
                }
            }
            None => {
                report.opening_balance = Some(row.op_balance - pending);
            }
        }
        last_balance = Some(row.op_balance);
        pending = Decimal::ZERO;
    }

    report.closing_balance = last_balance;
    debug!(
        rows = report.rows,
        checked = report.checked,
        breaks = report.breaks.len(),
        "reconciliation finished"
    );
    report
}
