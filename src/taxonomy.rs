//! Account classification taxonomy.
//!
//! The allow-list and keyword fragments are fixed business policy for the
//! AMS report, not a configurable rules engine. They live in one value so
//! tests can substitute a smaller taxonomy without touching global state.

use std::collections::HashSet;

/// Accounts that always belong to Radiopharma, matched exactly after
/// trimming. Keyword inference never overrides these.
const RP_ACCOUNTS: [&str; 15] = [
    "Marken Ltd",
    "QIAGEN GmbH Weekly",
    "Fisher Clinical Services",
    "Agilent Technologies Deutschland GmbH",
    "Patheon Biologics BV",
    "Delpharm Development Leiden BV",
    "Abbott Biologicals BV",
    "Fisher BioServices Netherlands BV",
    "Abbott Healthcare Products BV",
    "UNIVERSAL PICTURES INTERNATIONAL NETHERLANDS",
    "Patheon UK",
    "VERACYTE INC",
    "Tosoh Europe",
    "Exnet Services",
    "Nobel Biocare Distribution Center BV",
];

/// Lowercase fragments that mark an account as healthcare / life sciences.
const HEALTHCARE_KEYWORDS: [&str; 93] = [
    "pharma", "medical", "health", "bio", "clinical", "hospital", "diagnostic",
    "therapeut", "laborator", "patholog", "imaging", "surgical", "oncolog",
    "cardio", "neuro", "radiol", "genetic", "genomic", "molecular", "cell",
    "tissue", "organ", "transplant", "vaccine", "antibod", "protein", "peptide",
    "life science", "lifescience", "medic", "therap", "diagnost", "clinic",
    "patient", "treatment", "disease", "drug", "dose", "isotope", "radio",
    "nuclear", "pet", "spect", "immuno", "assay", "reagent", "specimen",
    "sample", "blood", "plasma", "serum", "biobank", "cryo", "stem",
    "marken", "fisher", "cardinal", "patheon", "organox", "qiagen", "abbott",
    "tosoh", "leica", "sophia", "cerus", "sirtex", "lantheus", "avid",
    "petnet", "innervate", "ndri", "university", "institut", "pentec",
    "sexton", "atomics", "curium", "medtronic", "catalent", "delpharm",
    "veracyte", "eckert", "ziegler", "shine", "altasciences",
    "onkos", "biolabs", "biosystem", "life molecular", "cerveau", "meilleur",
    "samsung bio", "agilent",
];

/// Lowercase fragments that mark an account as aviation services.
const AVIATION_KEYWORDS: [&str; 45] = [
    "airline", "airport", "cargo", "freight", "logistic", "transport",
    "express", "disney", "pictures", "aviation", "aircraft", "aerospace",
    "volaris", "easyjet", "lufthansa", "delta", "american airlines",
    "british airways", "nippon", "aeromexico", "spairliners", "universal",
    "paramount", "productions", "courier", "forwarding", "tmr global",
    "aeroplex", "nova traffic", "ups", "endeavor air",
    "storm aviation", "adventures", "hartford", "tokyo electron", "slipstick",
    "sealion production", "heathrow courier", "macaronesia", "exnet service",
    "mnx global logistics", "logical freight", "concesionaria", "vuela compania",
    "panasonic avionics",
];

/// Immutable classification policy, fixed at process start.
#[derive(Debug, Clone)]
pub struct AccountTaxonomy {
    allow_list: HashSet<String>,
    healthcare: Vec<String>,
    aviation: Vec<String>,
}

impl AccountTaxonomy {
    /// The production taxonomy for the AMS report.
    pub fn standard() -> Self {
        Self::new(&RP_ACCOUNTS, &HEALTHCARE_KEYWORDS, &AVIATION_KEYWORDS)
    }

    /// Build from explicit lists; keyword fragments are lowercased here so
    /// callers can pass them in any case.
    pub fn new(allow_list: &[&str], healthcare: &[&str], aviation: &[&str]) -> Self {
        Self {
            allow_list: allow_list.iter().map(|s| s.trim().to_string()).collect(),
            healthcare: healthcare.iter().map(|s| s.to_lowercase()).collect(),
            aviation: aviation.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// Exact allow-list membership after trimming.
    pub fn is_allow_listed(&self, account: &str) -> bool {
        self.allow_list.contains(account.trim())
    }

    /// Any healthcare fragment is a substring of the lowercased name.
    pub fn matches_healthcare(&self, lowercase_name: &str) -> bool {
        self.healthcare.iter().any(|k| lowercase_name.contains(k.as_str()))
    }

    /// Any aviation fragment is a substring of the lowercased name.
    pub fn matches_aviation(&self, lowercase_name: &str) -> bool {
        self.aviation.iter().any(|k| lowercase_name.contains(k.as_str()))
    }

    pub fn allow_list_len(&self) -> usize {
        self.allow_list.len()
    }
}

impl Default for AccountTaxonomy {
    fn default() -> Self {
        Self::standard()
    }
}
