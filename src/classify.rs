//! Account classifier: assigns each shipment to exactly one segment.

use crate::models::Segment;
use crate::taxonomy::AccountTaxonomy;
use crate::workbook::SHEET_AVIATION;

/// Full classification outcome, including the ambiguity flag the
/// unclassified-accounts audit reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    /// None means the row belongs to no segment.
    pub segment: Option<Segment>,
    /// True when the name matched both keyword taxonomies. Such rows land
    /// in no segment; the unclassified audit surfaces them for a human look.
    pub ambiguous: bool,
}

/// Pure, deterministic classifier over an injected taxonomy.
#[derive(Debug, Clone)]
pub struct AccountClassifier {
    taxonomy: AccountTaxonomy,
}

impl AccountClassifier {
    pub fn new(taxonomy: AccountTaxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &AccountTaxonomy {
        &self.taxonomy
    }

    /// Resolution order:
    /// 1. allow-list match -> RadioPharma, unconditionally
    /// 2. rows read from the aviation service sheet -> Aviation
    /// 3. aviation keyword and no healthcare keyword -> Aviation
    /// 4. healthcare keyword and no aviation keyword -> LifeSciences
    /// 5. otherwise unclassified; the exclusion in 3 and 4 is symmetric,
    ///    so a name hitting both taxonomies classifies as neither
    pub fn classify(&self, account: &str, sheet: Option<&str>) -> Option<Segment> {
        self.classify_detailed(account, sheet).segment
    }

    pub fn classify_detailed(&self, account: &str, sheet: Option<&str>) -> Classified {
        let trimmed = account.trim();
        if trimmed.is_empty() {
            return Classified { segment: None, ambiguous: false };
        }
        if self.taxonomy.is_allow_listed(trimmed) {
            return Classified { segment: Some(Segment::RadioPharma), ambiguous: false };
        }
        if sheet == Some(SHEET_AVIATION) {
            return Classified { segment: Some(Segment::Aviation), ambiguous: false };
        }
        let lower = trimmed.to_lowercase();
        let aviation = self.taxonomy.matches_aviation(&lower);
        let healthcare = self.taxonomy.matches_healthcare(&lower);
        let segment = match (aviation, healthcare) {
            (true, false) => Some(Segment::Aviation),
            (false, true) => Some(Segment::LifeSciences),
            // A name matching both taxonomies classifies as neither.
            (true, true) | (false, false) => None,
        };
        Classified { segment, ambiguous: aviation && healthcare }
    }
}

impl Default for AccountClassifier {
    fn default() -> Self {
        Self::new(AccountTaxonomy::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> AccountClassifier {
        AccountClassifier::default()
    }

    #[test]
    fn test_allow_list_beats_keywords() {
        let c = classifier();
        // Contains the aviation fragments "universal" and "pictures" but is
        // an allow-listed legal entity.
        assert_eq!(
            c.classify("UNIVERSAL PICTURES INTERNATIONAL NETHERLANDS", None),
            Some(Segment::RadioPharma)
        );
        // Contains the healthcare fragment "marken".
        assert_eq!(c.classify("Marken Ltd", Some("AMS")), Some(Segment::RadioPharma));
    }

    #[test]
    fn test_keyword_classification() {
        let c = classifier();
        assert_eq!(c.classify("Lufthansa Cargo", None), Some(Segment::Aviation));
        assert_eq!(c.classify("Acme Diagnostics BV", None), Some(Segment::LifeSciences));
        assert_eq!(c.classify("Van Dam Furniture", None), None);
    }

    #[test]
    fn test_both_taxonomy_match_classifies_as_neither() {
        let c = classifier();
        // "express" is an aviation fragment, "pharma" a healthcare one; the
        // symmetric exclusion drops the name from both segments.
        let out = c.classify_detailed("Express Pharma Logistics", None);
        assert_eq!(out.segment, None);
        assert!(out.ambiguous);
        // Single-taxonomy matches are unaffected by the exclusion.
        assert!(!c.classify_detailed("Lufthansa Cargo", None).ambiguous);
        // The allow-list and sheet provenance still outrank the keyword scan.
        assert_eq!(
            c.classify("Express Pharma Logistics", Some(SHEET_AVIATION)),
            Some(Segment::Aviation)
        );
    }

    #[test]
    fn test_aviation_sheet_provenance() {
        let c = classifier();
        // No keyword hit, but the row came from the aviation service sheet.
        assert_eq!(
            c.classify("Windmill Maintenance BV", Some(SHEET_AVIATION)),
            Some(Segment::Aviation)
        );
        assert_eq!(c.classify("Windmill Maintenance BV", Some("AMS")), None);
    }

    #[test]
    fn test_empty_name_is_unclassified() {
        let c = classifier();
        assert_eq!(c.classify("", None), None);
        assert_eq!(c.classify("   ", Some(SHEET_AVIATION)), None);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let c = classifier();
        for _ in 0..3 {
            assert_eq!(c.classify("Lufthansa Cargo", Some("AMS")), Some(Segment::Aviation));
        }
    }

    #[test]
    fn test_injected_taxonomy() {
        let c = AccountClassifier::new(AccountTaxonomy::new(&["Acme"], &["lab"], &["air"]));
        assert_eq!(c.classify("Acme", None), Some(Segment::RadioPharma));
        assert_eq!(c.classify("Central Labs", None), Some(Segment::LifeSciences));
        assert_eq!(c.classify("Lufthansa Cargo", None), None);
    }
}
