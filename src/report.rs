//! Assembles the full report bundle from a workbook: three disjoint
//! segment results, grand totals, and the unclassified-accounts audit.

use std::collections::HashMap;

use anyhow::Result;
use tracing::info;

use crate::aggregate::{build_segment, office_eligible, ReportOptions, SEGMENT_SPECS};
use crate::classify::AccountClassifier;
use crate::models::{
    GrandTotals, ReportBundle, Segment, SegmentResult, ShipmentRecord, UnclassifiedAccount,
};
use crate::workbook::{WorkbookReader, SHEET_AMERICAS, SHEET_AMS, SHEET_AVIATION};

const ALL_SHEETS: [&str; 3] = [SHEET_AMS, SHEET_AMERICAS, SHEET_AVIATION];

/// One synchronous pass over the workbook. Recomputed fully per upload;
/// the only state reused within a session is the reader's sheet cache.
pub fn build_report(
    reader: &mut WorkbookReader,
    classifier: &AccountClassifier,
    opts: &ReportOptions,
) -> Result<ReportBundle> {
    let mut results: Vec<SegmentResult> = Vec::with_capacity(SEGMENT_SPECS.len());
    for spec in &SEGMENT_SPECS {
        let mut rows: Vec<ShipmentRecord> = Vec::new();
        for sheet in spec.sheets {
            rows.extend(reader.records(sheet)?);
        }
        let result = build_segment(spec, rows, classifier, opts);
        info!(
            segment = result.segment.label(),
            volume = result.volume,
            year = ?result.year,
            "segment aggregated"
        );
        results.push(result);
    }

    let unclassified = audit_unclassified(reader, classifier)?;
    info!(accounts = unclassified.len(), "unclassified audit built");

    // SEGMENT_SPECS order is RP, LFS, AVS.
    let mut iter = results.into_iter();
    let (radiopharma, life_sciences, aviation) = match (iter.next(), iter.next(), iter.next()) {
        (Some(rp), Some(lfs), Some(avs)) => (rp, lfs, avs),
        _ => unreachable!("three segment specs"),
    };
    debug_assert_eq!(radiopharma.segment, Segment::RadioPharma);

    let totals = GrandTotals {
        volume: radiopharma.volume + life_sciences.volume + aviation.volume,
        pieces: radiopharma.pieces + life_sciences.pieces + aviation.pieces,
        revenue: radiopharma.revenue + life_sciences.revenue + aviation.revenue,
    };

    Ok(ReportBundle {
        month: opts.month,
        radiopharma,
        life_sciences,
        aviation,
        totals,
        unclassified,
    })
}

/// Office-eligible accounts across all source sheets that land in no
/// segment, with row counts, most frequent first. Ambiguous marks names
/// matching both keyword taxonomies. Rows the office filter would drop
/// from every segment stay out of the audit too.
fn audit_unclassified(
    reader: &mut WorkbookReader,
    classifier: &AccountClassifier,
) -> Result<Vec<UnclassifiedAccount>> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, (u64, bool)> = HashMap::new();
    for sheet in ALL_SHEETS {
        for rec in reader.records(sheet)? {
            let name = rec.account.trim().to_string();
            if name.is_empty() || !office_eligible(&rec) {
                continue;
            }
            let outcome = classifier.classify_detailed(&name, Some(&rec.sheet));
            if outcome.segment.is_some() {
                continue;
            }
            let entry = counts.entry(name.clone()).or_insert_with(|| {
                order.push(name);
                (0, false)
            });
            entry.0 += 1;
            entry.1 |= outcome.ambiguous;
        }
    }
    let mut audit: Vec<UnclassifiedAccount> = order
        .into_iter()
        .map(|name| {
            let (shipments, ambiguous) = counts[&name];
            UnclassifiedAccount { name, shipments, ambiguous }
        })
        .collect();
    audit.sort_by(|a, b| b.shipments.cmp(&a.shipments));
    Ok(audit)
}
