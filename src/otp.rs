//! On-time-performance calculation.
//!
//! Gross OTP counts every shipment with both a proof-of-delivery and a
//! target timestamp. Net OTP restricts the same ratio to controllable
//! shipments, i.e. rows whose QC annotation does not name an external
//! delay cause.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{OtpBreakdown, OtpSummary, ShipmentRecord};

/// External-delay causes that make a shipment non-controllable. Matched
/// case-insensitively on word boundaries so "WH" hits but "WHITE" does not.
static NON_CONTROLLABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(agent|del\s*agt|delivery\s*agent|customs|warehouse|w/house|wh|clearance|regulatory|government|weather|force\s*majeure)\b",
    )
    .expect("non-controllable pattern is valid")
});

/// A shipment with no QC annotation is controllable by default.
pub fn is_controllable(qc: Option<&str>) -> bool {
    match qc {
        Some(text) if !text.trim().is_empty() => !NON_CONTROLLABLE.is_match(text),
        _ => true,
    }
}

/// Both timestamps present.
pub fn is_valid(rec: &ShipmentRecord) -> bool {
    rec.pod.is_some() && rec.target.is_some()
}

/// Delivered on or before target; ties count as on-time. None when the
/// record is not valid for OTP.
pub fn is_on_time(rec: &ShipmentRecord) -> Option<bool> {
    match (rec.pod, rec.target) {
        (Some(pod), Some(target)) => Some(pod <= target),
        _ => None,
    }
}

fn pct(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / denominator as f64 * 100.0
}

/// Compute Gross and Net OTP over a record set. Pure: identical input
/// yields identical output.
///
/// Zero valid records -> both percentages are None. Zero controllable
/// valid records -> Net falls back to Gross. The net ratio itself is
/// reported raw, without clamping to Gross.
pub fn compute_otp(records: &[ShipmentRecord]) -> OtpSummary {
    let mut b = OtpBreakdown { total: records.len(), ..Default::default() };

    for rec in records {
        let Some(on_time) = is_on_time(rec) else { continue };
        b.valid += 1;
        if on_time {
            b.on_time += 1;
        }
        if is_controllable(rec.qc.as_deref()) {
            b.controllable += 1;
            if on_time {
                b.controllable_on_time += 1;
            }
        }
    }

    let gross_pct = (b.valid > 0).then(|| pct(b.on_time, b.valid));
    let net_pct = if b.controllable > 0 {
        Some(pct(b.controllable_on_time, b.controllable))
    } else {
        gross_pct
    };

    OtpSummary { gross_pct, net_pct, breakdown: b }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn dt(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn rec(pod: Option<NaiveDateTime>, target: Option<NaiveDateTime>, qc: &str) -> ShipmentRecord {
        ShipmentRecord {
            account: "Acme".into(),
            pieces: 1.0,
            charges: 100.0,
            departure: "AMS".into(),
            arrival: "JFK".into(),
            pod,
            target,
            qc: if qc.is_empty() { None } else { Some(qc.into()) },
            sheet: "AMS".into(),
        }
    }

    #[test]
    fn test_controllability_patterns() {
        assert!(!is_controllable(Some("Customs Hold")));
        assert!(!is_controllable(Some("del agt delayed pickup")));
        assert!(!is_controllable(Some("w/house congestion")));
        assert!(!is_controllable(Some("WH backlog")));
        assert!(!is_controllable(Some("force majeure - strike")));
        assert!(!is_controllable(Some("severe weather at hub")));
        // Word boundaries: "wh" must stand alone.
        assert!(is_controllable(Some("wheel replacement")));
        assert!(is_controllable(Some("late linehaul")));
        assert!(is_controllable(Some("")));
        assert!(is_controllable(None));
    }

    #[test]
    fn test_all_on_time_is_100() {
        let recs = vec![
            rec(Some(dt(5, 9)), Some(dt(5, 10)), ""),
            rec(Some(dt(6, 10)), Some(dt(6, 10)), ""), // tie counts as on-time
        ];
        let otp = compute_otp(&recs);
        assert_eq!(otp.gross_pct, Some(100.0));
        assert_eq!(otp.net_pct, Some(100.0));
    }

    #[test]
    fn test_all_late_is_0() {
        let recs = vec![
            rec(Some(dt(5, 11)), Some(dt(5, 10)), ""),
            rec(Some(dt(6, 12)), Some(dt(6, 10)), ""),
        ];
        let otp = compute_otp(&recs);
        assert_eq!(otp.gross_pct, Some(0.0));
        assert_eq!(otp.net_pct, Some(0.0));
    }

    #[test]
    fn test_net_equals_gross_without_qc_annotations() {
        let recs = vec![
            rec(Some(dt(5, 9)), Some(dt(5, 10)), ""),
            rec(Some(dt(6, 12)), Some(dt(6, 10)), ""),
        ];
        let otp = compute_otp(&recs);
        assert_eq!(otp.gross_pct, otp.net_pct);
        assert_eq!(otp.gross_pct, Some(50.0));
    }

    #[test]
    fn test_non_controllable_excluded_from_net_denominator() {
        let recs = vec![
            // On-time but customs-held: still in Gross, out of Net.
            rec(Some(dt(5, 9)), Some(dt(5, 10)), "Customs Hold"),
            rec(Some(dt(6, 12)), Some(dt(6, 10)), ""),
            rec(Some(dt(7, 9)), Some(dt(7, 10)), ""),
        ];
        let otp = compute_otp(&recs);
        assert_eq!(otp.breakdown.valid, 3);
        assert_eq!(otp.breakdown.controllable, 2);
        assert_eq!(otp.gross_pct, Some(2.0 / 3.0 * 100.0));
        assert_eq!(otp.net_pct, Some(50.0));
        // Raw ratio: net below gross is reported as-is.
        assert!(otp.net_pct < otp.gross_pct);
    }

    #[test]
    fn test_zero_controllable_falls_back_to_gross() {
        let recs = vec![rec(Some(dt(5, 9)), Some(dt(5, 10)), "Customs Hold")];
        let otp = compute_otp(&recs);
        assert_eq!(otp.gross_pct, Some(100.0));
        assert_eq!(otp.net_pct, Some(100.0));
    }

    #[test]
    fn test_zero_valid_records_is_none() {
        let recs = vec![rec(None, Some(dt(5, 10)), ""), rec(Some(dt(5, 9)), None, "")];
        let otp = compute_otp(&recs);
        assert_eq!(otp.gross_pct, None);
        assert_eq!(otp.net_pct, None);
        assert_eq!(otp.breakdown.total, 2);
        assert_eq!(otp.breakdown.valid, 0);
    }

    #[test]
    fn test_marken_scenario() {
        // POD 10:00 against a 09:00 target: valid, late, controllable.
        let r = rec(Some(dt(5, 10)), Some(dt(5, 9)), "");
        assert!(is_valid(&r));
        assert_eq!(is_on_time(&r), Some(false));
        assert!(is_controllable(r.qc.as_deref()));
        let otp = compute_otp(&[r]);
        assert_eq!(otp.breakdown.valid, 1);
        assert_eq!(otp.breakdown.controllable, 1);
        assert_eq!(otp.breakdown.on_time, 0);
        assert_eq!(otp.breakdown.controllable_on_time, 0);
    }

    #[test]
    fn test_compute_otp_is_idempotent() {
        let recs = vec![
            rec(Some(dt(5, 9)), Some(dt(5, 10)), "Customs Hold"),
            rec(Some(dt(6, 12)), Some(dt(6, 10)), ""),
        ];
        assert_eq!(compute_otp(&recs), compute_otp(&recs));
    }
}
