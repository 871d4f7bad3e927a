//! Workbook loading.
//!
//! Two sources produce the same `SheetTable` shape: a binary `.xlsx`
//! workbook (the production path) and a directory of per-sheet CSV files
//! (synthetic data and integration tests). Parsed sheets are memoized per
//! reader, so the three segment passes share one parse of the `AMS` sheet.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use tracing::{debug, warn};

use crate::dates;
use crate::models::{Cell, ShipmentRecord};
use crate::schema::{extract_records, SheetTable};

/// Sheet names the pipeline looks for. Sheets not present in the workbook
/// are treated as empty, not as an error.
pub const SHEET_AMS: &str = "AMS";
pub const SHEET_AMERICAS: &str = "Americas International Desk";
pub const SHEET_AVIATION: &str = "Aviation SVC";

enum Source {
    Xlsx(Box<Xlsx<BufReader<File>>>),
    SheetDir(PathBuf),
}

/// Opens a workbook once and hands out typed records per sheet.
pub struct WorkbookReader {
    source: Source,
    cache: HashMap<String, Vec<ShipmentRecord>>,
}

impl WorkbookReader {
    /// Open an `.xlsx` file, or a directory holding `<sheet>.csv` files.
    /// An unreadable workbook is the one hard error in the pipeline.
    pub fn open(path: &Path) -> Result<Self> {
        let source = if path.is_dir() {
            Source::SheetDir(path.to_path_buf())
        } else {
            let wb: Xlsx<_> = open_workbook(path)
                .with_context(|| format!("cannot read workbook {}", path.display()))?;
            Source::Xlsx(Box::new(wb))
        };
        Ok(Self { source, cache: HashMap::new() })
    }

    /// Records for one sheet, memoized. A missing sheet yields an empty set.
    pub fn records(&mut self, sheet: &str) -> Result<Vec<ShipmentRecord>> {
        if let Some(cached) = self.cache.get(sheet) {
            debug!(sheet, "sheet cache hit");
            return Ok(cached.clone());
        }
        let records = match self.load_table(sheet)? {
            Some(table) => extract_records(&table),
            None => {
                warn!(sheet, "sheet not present, treating as empty");
                Vec::new()
            }
        };
        debug!(sheet, rows = records.len(), "sheet parsed");
        self.cache.insert(sheet.to_string(), records.clone());
        Ok(records)
    }

    fn load_table(&mut self, sheet: &str) -> Result<Option<SheetTable>> {
        match &mut self.source {
            Source::Xlsx(wb) => load_xlsx_sheet(wb, sheet),
            Source::SheetDir(dir) => load_csv_sheet(dir, sheet),
        }
    }
}

fn cell_from_xlsx(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        // Native date cells carry an Excel day-serial.
        Data::DateTime(dt) => match dates::from_serial(dt.as_f64()) {
            Some(ndt) => Cell::DateTime(ndt),
            None => Cell::Empty,
        },
        Data::DateTimeIso(s) => match dates::parse_date_text(s) {
            Some(ndt) => Cell::DateTime(ndt),
            None => Cell::Text(s.clone()),
        },
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Empty,
    }
}

fn load_xlsx_sheet(
    wb: &mut Xlsx<BufReader<File>>,
    sheet: &str,
) -> Result<Option<SheetTable>> {
    if !wb.sheet_names().iter().any(|s| s == sheet) {
        return Ok(None);
    }
    let range = wb
        .worksheet_range(sheet)
        .with_context(|| format!("cannot read sheet {sheet}"))?;
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(|c| c.to_string()).collect(),
        None => return Ok(Some(SheetTable {
            name: sheet.to_string(),
            headers: Vec::new(),
            rows: Vec::new(),
        })),
    };
    let rows = rows
        .map(|row| row.iter().map(cell_from_xlsx).collect())
        .collect();
    Ok(Some(SheetTable { name: sheet.to_string(), headers, rows }))
}

fn load_csv_sheet(dir: &Path, sheet: &str) -> Result<Option<SheetTable>> {
    let path = dir.join(format!("{sheet}.csv"));
    if !path.exists() {
        return Ok(None);
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(&path)
        .with_context(|| format!("cannot read sheet file {}", path.display()))?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(Some(SheetTable { name: sheet.to_string(), headers, rows }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sheet_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ams_otp_wb_{name}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_csv_sheet_roundtrip_and_missing_sheet() {
        let dir = sheet_dir("roundtrip");
        let mut f = File::create(dir.join("AMS.csv")).unwrap();
        writeln!(f, "ACCT NM,PIECES,TOTAL CHARGES,DEP,ARR,POD DATE/TIME,QDT,QC").unwrap();
        writeln!(f, "Marken Ltd,2,150.0,AMS,JFK,2024-09-05 10:00:00,2024-09-05 09:00:00,").unwrap();
        writeln!(f, "Lufthansa Cargo,1,80,JFK,AMS,2024-09-06 08:00:00,2024-09-06 09:00:00,Customs Hold").unwrap();

        let mut reader = WorkbookReader::open(&dir).unwrap();
        let recs = reader.records(SHEET_AMS).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].account, "Marken Ltd");
        assert_eq!(recs[0].pieces, 2.0);
        assert!(recs[0].pod.is_some() && recs[0].target.is_some());
        assert_eq!(recs[1].qc.as_deref(), Some("Customs Hold"));
        assert_eq!(recs[1].sheet, SHEET_AMS);

        // Absent sheet is empty, not an error.
        assert!(reader.records(SHEET_AVIATION).unwrap().is_empty());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_repeated_reads_hit_the_cache() {
        let dir = sheet_dir("cache");
        let mut f = File::create(dir.join("AMS.csv")).unwrap();
        writeln!(f, "ACCT NM,PIECES").unwrap();
        writeln!(f, "Acme,1").unwrap();

        let mut reader = WorkbookReader::open(&dir).unwrap();
        let first = reader.records(SHEET_AMS).unwrap();
        // Remove the backing file; the cached parse must still answer.
        std::fs::remove_file(dir.join("AMS.csv")).unwrap();
        let second = reader.records(SHEET_AMS).unwrap();
        assert_eq!(first.len(), second.len());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
