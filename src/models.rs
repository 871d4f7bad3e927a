use chrono::NaiveDateTime;
use serde::Serialize;

/// One cell value as read from a worksheet.
///
/// Both the xlsx and the CSV loaders normalize into this before any
/// business logic runs; the core never sees a loader-specific type.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
    Bool(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text content, trimmed. Numbers are not stringified here.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t)
                }
            }
            _ => None,
        }
    }

    /// Numeric coercion: unparseable or missing values become None,
    /// never an error. Callers default to 0.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().replace(',', "").parse::<f64>().ok(),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

/// Business segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Segment {
    RadioPharma,
    LifeSciences,
    Aviation,
}

impl Segment {
    pub fn label(&self) -> &'static str {
        match self {
            Segment::RadioPharma => "RP",
            Segment::LifeSciences => "LFS",
            Segment::Aviation => "AVS",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Segment::RadioPharma => "Radiopharma",
            Segment::LifeSciences => "Life Sciences",
            Segment::Aviation => "Aviation Services",
        }
    }
}

/// One shipment row after schema resolution and date normalization.
/// Immutable once built; discarded at the end of a report run.
#[derive(Debug, Clone, Serialize)]
pub struct ShipmentRecord {
    pub account: String,
    pub pieces: f64,
    pub charges: f64,
    pub departure: String,
    pub arrival: String,
    /// Proof-of-delivery timestamp; None means delivery not confirmed.
    pub pod: Option<NaiveDateTime>,
    /// Target delivery: updated delivery when present, else quoted time.
    pub target: Option<NaiveDateTime>,
    pub qc: Option<String>,
    /// Source sheet the row was read from.
    pub sheet: String,
}

/// Counts behind an OTP figure, surfaced for the diagnostics panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OtpBreakdown {
    pub total: usize,
    pub valid: usize,
    pub on_time: usize,
    pub controllable: usize,
    pub controllable_on_time: usize,
}

/// Gross/Net OTP percentages. None means no valid records, which the
/// reporting surface renders as a gauge at rest rather than 0%.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtpSummary {
    pub gross_pct: Option<f64>,
    pub net_pct: Option<f64>,
    pub breakdown: OtpBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountVolume {
    pub name: String,
    pub shipments: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountRevenue {
    pub name: String,
    pub revenue: f64,
}

/// Aggregated output for one segment, fully recomputed per report run.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentResult {
    pub segment: Segment,
    /// Target calendar month (1-12).
    pub month: u32,
    /// Year the metrics were scoped to; None when no POD row fell in the
    /// target month at all.
    pub year: Option<i32>,
    /// Years in which this segment has POD rows for the target month.
    pub available_years: Vec<i32>,
    pub volume: u64,
    pub pieces: f64,
    pub revenue: f64,
    pub otp: OtpSummary,
    pub top_by_volume: Vec<AccountVolume>,
    pub top_by_revenue: Vec<AccountRevenue>,
    /// Member rows (all years), kept for drill-down; not serialized.
    #[serde(skip)]
    pub records: Vec<ShipmentRecord>,
}

/// An office-eligible account that landed in no segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnclassifiedAccount {
    pub name: String,
    pub shipments: u64,
    /// True when the name matched both keyword taxonomies.
    pub ambiguous: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GrandTotals {
    pub volume: u64,
    pub pieces: f64,
    pub revenue: f64,
}

/// Everything the reporting surface needs for one uploaded workbook.
#[derive(Debug, Clone, Serialize)]
pub struct ReportBundle {
    pub month: u32,
    pub radiopharma: SegmentResult,
    pub life_sciences: SegmentResult,
    pub aviation: SegmentResult,
    pub totals: GrandTotals,
    /// Diagnostic only; unclassified rows are not an error.
    pub unclassified: Vec<UnclassifiedAccount>,
}
