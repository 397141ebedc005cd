//! Flat CSV export of extracted rows.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ledgerlift_core::{parse_statement_date, TransactionRow};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    page: u32,
    oper_date: &'a str,
    liq_date: &'a str,
    oper_date_iso: Option<NaiveDate>,
    liq_date_iso: Option<NaiveDate>,
    description: &'a str,
    reference: &'a str,
    charges: Decimal,
    credits: Decimal,
    op_balance: Decimal,
    liq_balance: Decimal,
}

impl<'a> CsvRow<'a> {
    fn new(row: &'a TransactionRow, year: Option<i32>) -> Self {
        let typed = |s: &str| year.and_then(|y| parse_statement_date(s, y));
        Self {
            page: row.page,
            oper_date: &row.oper_date,
            liq_date: &row.liq_date,
            oper_date_iso: typed(&row.oper_date),
            liq_date_iso: typed(&row.liq_date),
            description: &row.description,
            reference: &row.reference,
            charges: row.charges,
            credits: row.credits,
            op_balance: row.op_balance,
            liq_balance: row.liq_balance,
        }
    }
}

/// Write `rows` with a header line. With `year`, ISO dates are filled in.
pub fn write_rows<W: Write>(writer: W, rows: &[TransactionRow], year: Option<i32>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(CsvRow::new(row, year))
            .with_context(|| format!("writing row {} {}", row.page, row.oper_date))?;
    }
    wtr.flush().context("flushing csv output")?;
    Ok(())
}

pub fn write_rows_to_path(path: impl AsRef<Path>, rows: &[TransactionRow], year: Option<i32>) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    write_rows(file, rows, year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample() -> TransactionRow {
        TransactionRow {
            oper_date: "05/ENE".to_string(),
            liq_date: "06/ENE".to_string(),
            description: "SPEI RECIBIDO, SANTANDER".to_string(),
            reference: "Referencia 8129595110".to_string(),
            charges: Decimal::ZERO,
            credits: Decimal::from_str("1500.00").unwrap(),
            op_balance: Decimal::from_str("12383.20").unwrap(),
            liq_balance: Decimal::from_str("12383.20").unwrap(),
            page: 1,
        }
    }

    #[test]
    fn test_csv_with_typed_dates() {
        let mut buf = Vec::new();
        write_rows(&mut buf, &[sample()], Some(2025)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "page,oper_date,liq_date,oper_date_iso,liq_date_iso,description,reference,charges,credits,op_balance,liq_balance"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,05/ENE,06/ENE,2025-01-05,2025-01-06,\"SPEI RECIBIDO, SANTANDER\",Referencia 8129595110,0,1500.00,12383.20,12383.20"
        );
    }

    #[test]
    fn test_csv_without_year_leaves_iso_empty() {
        let mut buf = Vec::new();
        write_rows(&mut buf, &[sample()], None).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.lines().nth(1).unwrap().starts_with("1,05/ENE,06/ENE,,,"));
    }
}
