//! Per-segment aggregation: sheet union, office filter, classification,
//! month scoping, KPI totals, and account rankings.

use std::collections::HashMap;

use chrono::Datelike;

use crate::classify::AccountClassifier;
use crate::models::{
    AccountRevenue, AccountVolume, Segment, SegmentResult, ShipmentRecord,
};
use crate::otp::compute_otp;
use crate::workbook::{SHEET_AMERICAS, SHEET_AMS, SHEET_AVIATION};

/// Home hub; the office filter keeps rows departing from or arriving at it.
pub const HUB_CODE: &str = "AMS";

/// Sheet selection and filtering rules for one segment.
#[derive(Debug, Clone, Copy)]
pub struct SegmentSpec {
    pub segment: Segment,
    pub sheets: &'static [&'static str],
    /// Radiopharma is scoped by its allow-list alone and skips the filter.
    pub office_filtered: bool,
}

pub const SEGMENT_SPECS: [SegmentSpec; 3] = [
    SegmentSpec {
        segment: Segment::RadioPharma,
        sheets: &[SHEET_AMS],
        office_filtered: false,
    },
    SegmentSpec {
        segment: Segment::LifeSciences,
        sheets: &[SHEET_AMS, SHEET_AMERICAS],
        office_filtered: true,
    },
    SegmentSpec {
        segment: Segment::Aviation,
        sheets: &[SHEET_AMS, SHEET_AMERICAS, SHEET_AVIATION],
        office_filtered: true,
    },
];

/// Report parameters; year None means "most recent year present".
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub month: u32,
    pub year: Option<i32>,
    pub top_n: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        // The report was built for the September review cycle.
        Self { month: 9, year: None, top_n: 10 }
    }
}

/// DEP or ARR equals the hub code after trimming, case-insensitively.
/// Exact equality, so "AMSTERDAM" style codes do not slip through.
pub fn office_eligible(rec: &ShipmentRecord) -> bool {
    let matches_hub = |code: &str| code.trim().eq_ignore_ascii_case(HUB_CODE);
    matches_hub(&rec.departure) || matches_hub(&rec.arrival)
}

fn in_scope(rec: &ShipmentRecord, month: u32, year: i32) -> bool {
    rec.pod
        .map(|pod| pod.date().month() == month && pod.date().year() == year)
        .unwrap_or(false)
}

/// Years in which the member set has POD rows for the target month,
/// ascending.
fn available_years(records: &[ShipmentRecord], month: u32) -> Vec<i32> {
    let mut years: Vec<i32> = records
        .iter()
        .filter_map(|r| r.pod)
        .filter(|pod| pod.date().month() == month)
        .map(|pod| pod.date().year())
        .collect();
    years.sort_unstable();
    years.dedup();
    years
}

/// Top accounts by row count, descending; ties keep first-encounter order.
pub fn top_by_volume(records: &[ShipmentRecord], n: usize) -> Vec<AccountVolume> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for rec in records {
        if !counts.contains_key(rec.account.as_str()) {
            order.push(rec.account.clone());
        }
        *counts.entry(rec.account.as_str()).or_insert(0) += 1;
    }
    let mut ranked: Vec<AccountVolume> = order
        .into_iter()
        .map(|name| {
            let shipments = counts[name.as_str()];
            AccountVolume { name, shipments }
        })
        .collect();
    // Stable sort preserves encounter order among equal counts.
    ranked.sort_by(|a, b| b.shipments.cmp(&a.shipments));
    ranked.truncate(n);
    ranked
}

/// Top accounts by summed charges, descending; same tie rule.
pub fn top_by_revenue(records: &[ShipmentRecord], n: usize) -> Vec<AccountRevenue> {
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for rec in records {
        if !sums.contains_key(rec.account.as_str()) {
            order.push(rec.account.clone());
        }
        *sums.entry(rec.account.as_str()).or_insert(0.0) += rec.charges;
    }
    let mut ranked: Vec<AccountRevenue> = order
        .into_iter()
        .map(|name| {
            let revenue = sums[name.as_str()];
            AccountRevenue { name, revenue }
        })
        .collect();
    ranked.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    ranked.truncate(n);
    ranked
}

/// Build one segment's result from the union of its source sheets.
///
/// `rows` is the concatenation of the spec's sheets in order, each record
/// tagged with its source sheet. All four KPI outputs are scoped to the
/// target month of the selected year; rows in scope without a target
/// timestamp still count toward volume, pieces and revenue.
pub fn build_segment(
    spec: &SegmentSpec,
    rows: Vec<ShipmentRecord>,
    classifier: &AccountClassifier,
    opts: &ReportOptions,
) -> SegmentResult {
    let members: Vec<ShipmentRecord> = rows
        .into_iter()
        .filter(|r| !spec.office_filtered || office_eligible(r))
        .filter(|r| classifier.classify(&r.account, Some(&r.sheet)) == Some(spec.segment))
        .collect();

    let years = available_years(&members, opts.month);
    // An explicitly requested year is honored even when it has no data;
    // only the default picks the most recent year present.
    let year = opts.year.or_else(|| years.last().copied());

    let scoped: Vec<ShipmentRecord> = match year {
        Some(y) => members
            .iter()
            .filter(|r| in_scope(r, opts.month, y))
            .cloned()
            .collect(),
        None => Vec::new(),
    };

    SegmentResult {
        segment: spec.segment,
        month: opts.month,
        year,
        available_years: years,
        volume: scoped.len() as u64,
        pieces: scoped.iter().map(|r| r.pieces).sum(),
        revenue: scoped.iter().map(|r| r.charges).sum(),
        otp: compute_otp(&scoped),
        top_by_volume: top_by_volume(&scoped, opts.top_n),
        top_by_revenue: top_by_revenue(&scoped, opts.top_n),
        records: members,
    }
}
