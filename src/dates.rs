//! Date normalization for spreadsheet cells.
//!
//! Exported workbooks store dates inconsistently: formatted text, native
//! date cells, or raw Excel day-serials. Calendar-text parsing runs first;
//! when the majority of a column fails, the original values are
//! reinterpreted as serials anchored at 1899-12-30.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::models::Cell;

/// Excel day-serial epoch: serial 0 is 1899-12-30.
pub const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serial bounds accepted by the fallback, roughly 1900..=9999.
const SERIAL_MIN: f64 = 1.0;
const SERIAL_MAX: f64 = 2_958_465.0;

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d-%b-%Y %H:%M",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%b-%Y", "%Y/%m/%d"];

fn epoch() -> NaiveDateTime {
    // The tuple is a valid calendar date.
    NaiveDate::from_ymd_opt(EXCEL_EPOCH.0, EXCEL_EPOCH.1, EXCEL_EPOCH.2)
        .unwrap_or_default()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
}

/// Convert an Excel day-serial (fractional part = time of day) to a
/// timestamp. Out-of-range or non-finite serials produce None.
pub fn from_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(SERIAL_MIN..=SERIAL_MAX).contains(&serial) {
        return None;
    }
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch().checked_add_signed(Duration::milliseconds(millis))
}

/// Parse calendar text in any of the common export formats.
pub fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    let t = text.trim();
    if t.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Calendar-text interpretation of a single cell. Native date cells pass
/// through; bare numbers do not resolve in this pass.
fn calendar_pass(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Text(s) => parse_date_text(s),
        _ => None,
    }
}

/// Serial-number interpretation of a single cell.
fn serial_pass(cell: &Cell) -> Option<NaiveDateTime> {
    cell.as_number().and_then(from_serial)
}

/// Normalize a whole column, preserving length and order.
///
/// When more than half the calendar-text results are null, the original
/// cells are retried as day-serials and fill the nulls positionally. A
/// value failing both interpretations stays None and downstream treats
/// the delivery as not confirmed.
pub fn normalize_series(cells: &[Cell]) -> Vec<Option<NaiveDateTime>> {
    let mut out: Vec<Option<NaiveDateTime>> = cells.iter().map(calendar_pass).collect();
    if out.is_empty() {
        return out;
    }
    let nulls = out.iter().filter(|v| v.is_none()).count();
    if (nulls as f64) / (out.len() as f64) > 0.5 {
        for (slot, cell) in out.iter_mut().zip(cells) {
            if slot.is_none() {
                *slot = serial_pass(cell);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, 0).unwrap()
    }

    #[test]
    fn test_parse_common_formats() {
        assert_eq!(parse_date_text("2024-09-05 10:00:00"), Some(dt(2024, 9, 5, 10, 0)));
        assert_eq!(parse_date_text("09/05/2024 10:00"), Some(dt(2024, 9, 5, 10, 0)));
        assert_eq!(parse_date_text("2024-09-05"), Some(dt(2024, 9, 5, 0, 0)));
        assert_eq!(parse_date_text("not a date"), None);
        assert_eq!(parse_date_text(""), None);
    }

    #[test]
    fn test_serial_45200_is_october_2023() {
        // 1899-12-30 + 45200 days
        assert_eq!(from_serial(45200.0), Some(dt(2023, 10, 1, 0, 0)));
        assert_eq!(from_serial(45200.5), Some(dt(2023, 10, 1, 12, 0)));
    }

    #[test]
    fn test_serial_rejects_out_of_range() {
        assert_eq!(from_serial(f64::NAN), None);
        assert_eq!(from_serial(-3.0), None);
        assert_eq!(from_serial(4_000_000.0), None);
    }

    #[test]
    fn test_serial_fallback_engages_over_half_nulls() {
        let cells = vec![
            Cell::Number(45200.0),
            Cell::Number(45200.25),
            Cell::Text("2024-09-05 10:00:00".into()),
        ];
        let out = normalize_series(&cells);
        assert_eq!(out[0], Some(dt(2023, 10, 1, 0, 0)));
        assert_eq!(out[1], Some(dt(2023, 10, 1, 6, 0)));
        assert_eq!(out[2], Some(dt(2024, 9, 5, 10, 0)));
    }

    #[test]
    fn test_no_fallback_when_mostly_parseable() {
        // Only a third fail the calendar pass, so the bare number stays
        // null instead of being reinterpreted as a serial.
        let cells = vec![
            Cell::Text("2024-09-05 10:00:00".into()),
            Cell::Text("2024-09-06".into()),
            Cell::Number(45200.0),
        ];
        let out = normalize_series(&cells);
        assert!(out[0].is_some() && out[1].is_some());
        assert_eq!(out[2], None);
    }

    #[test]
    fn test_unparseable_stays_none() {
        let cells = vec![Cell::Text("pending".into()), Cell::Empty];
        let out = normalize_series(&cells);
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn test_native_datetime_cells_pass_through() {
        let cells = vec![Cell::DateTime(dt(2024, 9, 5, 9, 0))];
        assert_eq!(normalize_series(&cells), vec![Some(dt(2024, 9, 5, 9, 0))]);
    }
}
