//! Header resolution and typed record extraction.
//!
//! Column presence is decided once per sheet, up front, instead of being
//! probed at each use site. Missing optional columns degrade to defaults;
//! a sheet is never rejected for its shape.

use chrono::NaiveDateTime;

use crate::dates::normalize_series;
use crate::models::{Cell, ShipmentRecord};

/// A sheet after loading: header row plus data rows of equal width.
#[derive(Debug, Clone)]
pub struct SheetTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Resolved column positions for the fields the pipeline consumes.
/// Everything is optional; absent columns default downstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnMap {
    pub account: Option<usize>,
    pub pieces: Option<usize>,
    pub charges: Option<usize>,
    pub departure: Option<usize>,
    pub arrival: Option<usize>,
    pub pod: Option<usize>,
    pub updated_delivery: Option<usize>,
    pub quoted_delivery: Option<usize>,
    pub qc: Option<usize>,
}

impl ColumnMap {
    /// Case-insensitive header match with the fallback names some exports
    /// use for the office columns and the QC annotation.
    pub fn resolve(headers: &[String]) -> Self {
        let find = |names: &[&str]| -> Option<usize> {
            for name in names {
                if let Some(idx) = headers
                    .iter()
                    .position(|h| h.trim().eq_ignore_ascii_case(name))
                {
                    return Some(idx);
                }
            }
            None
        };
        Self {
            account: find(&["ACCT NM"]),
            pieces: find(&["PIECES"]),
            charges: find(&["TOTAL CHARGES"]),
            departure: find(&["DEP", "DEP STN"]),
            arrival: find(&["ARR", "ARR STN"]),
            pod: find(&["POD DATE/TIME"]),
            updated_delivery: find(&["UPD DEL"]),
            quoted_delivery: find(&["QDT"]),
            qc: find(&["QC", "QC NAME"]),
        }
    }
}

fn column(rows: &[Vec<Cell>], idx: Option<usize>) -> Vec<Cell> {
    match idx {
        Some(i) => rows
            .iter()
            .map(|r| r.get(i).cloned().unwrap_or(Cell::Empty))
            .collect(),
        None => vec![Cell::Empty; rows.len()],
    }
}

fn text_at(row: &[Cell], idx: Option<usize>) -> String {
    idx.and_then(|i| row.get(i))
        .and_then(|c| c.as_text())
        .unwrap_or_default()
        .to_string()
}

fn number_at(row: &[Cell], idx: Option<usize>) -> f64 {
    idx.and_then(|i| row.get(i)).and_then(|c| c.as_number()).unwrap_or(0.0)
}

/// Build shipment records from a loaded sheet.
///
/// Date columns are normalized whole, so the serial-number fallback sees
/// the full column when deciding whether to engage. The target timestamp
/// prefers the updated delivery per row and falls back to the quoted one.
pub fn extract_records(table: &SheetTable) -> Vec<ShipmentRecord> {
    let cols = ColumnMap::resolve(&table.headers);

    let pod = normalize_series(&column(&table.rows, cols.pod));
    let upd = normalize_series(&column(&table.rows, cols.updated_delivery));
    let qdt = normalize_series(&column(&table.rows, cols.quoted_delivery));

    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let target: Option<NaiveDateTime> = upd[i].or(qdt[i]);
            let qc = text_at(row, cols.qc);
            ShipmentRecord {
                account: text_at(row, cols.account),
                pieces: number_at(row, cols.pieces),
                charges: number_at(row, cols.charges),
                departure: text_at(row, cols.departure),
                arrival: text_at(row, cols.arrival),
                pod: pod[i],
                target,
                qc: if qc.is_empty() { None } else { Some(qc) },
                sheet: table.name.clone(),
            }
        })
        .collect()
}
