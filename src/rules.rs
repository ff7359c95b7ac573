// 🏷️ Classification Rules - Rules as Data
// Keyword tables that map a record to zero or more target industries

use crate::error::{Result, TrackerError};
use crate::table::InvestmentRecord;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Label used when neither a target industry nor the source sector applies
pub const OTHER_LABEL: &str = "Other";

// ============================================================================
// BUILT-IN TAXONOMY
// ============================================================================

// Matching is plain substring containment, so a trailing space ("ev ")
// guards one word boundary and the exclusion lists patch known false positives.
const BUILTIN_RULES: &[(&str, &[&str], &[&str])] = &[
    (
        "Integrated Circuits",
        &["semiconductor", "chip", "wafer", "foundry", "chipmaker", "integrated circuit"],
        &[],
    ),
    (
        "Biopharmaceuticals",
        &[
            "pharma", "biotech", "drug", "medicine", "healthcare", "medical", "clinic", "vaccine",
            "therapeutic",
        ],
        &["hospitality"],
    ),
    (
        "New Energy Vehicles",
        &["electric vehicle", "ev ", "battery", "auto", "automotive", "vehicle"],
        &["carlson", "carmike", "carrefour"],
    ),
    (
        "Mineral Resources",
        &[
            "mining", "mineral", "copper", "lithium", "iron ore", "cobalt", "nickel", "zinc",
            "rare earth", "metal",
        ],
        // coal is energy; goldman is a bank
        &["goldman", "coal"],
    ),
];

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryRule {
    /// Target industry label
    pub industry: String,

    /// Any of these as a substring of the search text selects the industry
    pub keywords: Vec<String>,

    /// Any of these as a substring vetoes the industry outright
    #[serde(default)]
    pub exclusions: Vec<String>,
}

impl IndustryRule {
    pub fn new(industry: &str, keywords: &[&str], exclusions: &[&str]) -> Self {
        IndustryRule {
            industry: industry.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            exclusions: exclusions.iter().map(|x| x.to_string()).collect(),
        }
    }

    /// First exclusion found in `text`, if any
    pub fn excluded_by(&self, text: &str) -> Option<&str> {
        self.exclusions
            .iter()
            .find(|x| text.contains(x.as_str()))
            .map(|x| x.as_str())
    }

    /// First keyword (in table order) found in `text`
    pub fn first_keyword(&self, text: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|k| text.contains(k.as_str()))
            .map(|k| k.as_str())
    }

    /// Keyword that selects this industry, or None when excluded or unmatched
    pub fn evaluate(&self, text: &str) -> Option<&str> {
        if self.excluded_by(text).is_some() {
            return None;
        }
        self.first_keyword(text)
    }

    fn normalized(self) -> Result<Self> {
        let industry = self.industry.trim().to_string();
        if industry.is_empty() {
            return Err(TrackerError::InvalidRule(
                "industry label is blank".to_string(),
            ));
        }
        if self.keywords.is_empty() {
            return Err(TrackerError::InvalidRule(format!(
                "{} has no keywords",
                industry
            )));
        }

        // Case-fold, but keep whitespace: trailing spaces are significant
        let fold = |terms: Vec<String>, kind: &str| -> Result<Vec<String>> {
            terms
                .into_iter()
                .map(|term| {
                    if term.trim().is_empty() {
                        Err(TrackerError::InvalidRule(format!(
                            "{} has a blank {}",
                            industry, kind
                        )))
                    } else {
                        Ok(term.to_lowercase())
                    }
                })
                .collect()
        };

        Ok(IndustryRule {
            keywords: fold(self.keywords, "keyword")?,
            exclusions: fold(self.exclusions, "exclusion")?,
            industry,
        })
    }
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

/// A target industry selected by keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMatch {
    pub industry: String,
    pub keyword: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LabelKind {
    /// One of the fixed target industries
    Target,
    /// The record's own sector (or "Other") used as fallback
    Sector,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndustryLabel {
    pub name: String,
    pub kind: LabelKind,
    /// Keyword that selected a target industry; None for fallback labels
    pub matched_keyword: Option<String>,
}

impl IndustryLabel {
    pub fn target(industry: &str, keyword: &str) -> Self {
        IndustryLabel {
            name: industry.to_string(),
            kind: LabelKind::Target,
            matched_keyword: Some(keyword.to_string()),
        }
    }

    pub fn sector(name: &str) -> Self {
        IndustryLabel {
            name: name.to_string(),
            kind: LabelKind::Sector,
            matched_keyword: None,
        }
    }

    pub fn is_target(&self) -> bool {
        self.kind == LabelKind::Target
    }
}

/// Case-folded "sector subsector target investor", single-space separated
pub fn search_text(record: &InvestmentRecord) -> String {
    format!(
        "{} {} {} {}",
        record.sector, record.subsector, record.target, record.investor
    )
    .to_lowercase()
}

/// Fallback label for a record with no target match
pub fn fallback_label(sector: &str) -> String {
    let sector = sector.trim();
    if sector.is_empty() || sector.eq_ignore_ascii_case("nan") {
        OTHER_LABEL.to_string()
    } else {
        sector.to_string()
    }
}

/// Turn target matches into labels, falling back to the source sector when empty.
/// The result is never empty.
pub fn apply_fallback(matches: Vec<TargetMatch>, sector: &str) -> Vec<IndustryLabel> {
    if matches.is_empty() {
        return vec![IndustryLabel::sector(&fallback_label(sector))];
    }
    matches
        .into_iter()
        .map(|m| IndustryLabel {
            name: m.industry,
            kind: LabelKind::Target,
            matched_keyword: Some(m.keyword),
        })
        .collect()
}

// ============================================================================
// CLASSIFIER
// ============================================================================

#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<IndustryRule>,
    fingerprint: String,
}

impl Classifier {
    /// Production keyword tables
    pub fn builtin() -> Self {
        let rules = BUILTIN_RULES
            .iter()
            .map(|(industry, keywords, exclusions)| IndustryRule::new(industry, keywords, exclusions))
            .collect::<Vec<_>>();
        let fingerprint = Self::compute_fingerprint(&rules);
        Classifier { rules, fingerprint }
    }

    /// Validate and case-fold a rule set. Rule order is evaluation and output order.
    pub fn from_rules(rules: Vec<IndustryRule>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(rules.len());

        for rule in rules {
            let rule = rule.normalized()?;
            if !seen.insert(rule.industry.clone()) {
                return Err(TrackerError::InvalidRule(format!(
                    "duplicate industry {}",
                    rule.industry
                )));
            }
            normalized.push(rule);
        }

        let fingerprint = Self::compute_fingerprint(&normalized);
        Ok(Classifier {
            rules: normalized,
            fingerprint,
        })
    }

    /// Load rules from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let rules: Vec<IndustryRule> = serde_json::from_str(content)?;
        Self::from_rules(rules)
    }

    fn compute_fingerprint(rules: &[IndustryRule]) -> String {
        let mut hasher = Sha256::new();
        for rule in rules {
            if let Ok(bytes) = serde_json::to_vec(rule) {
                hasher.update(&bytes);
            }
        }
        format!("{:x}", hasher.finalize())
    }

    pub fn rules(&self) -> &[IndustryRule] {
        &self.rules
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Target industry labels in table order
    pub fn target_industries(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.industry.as_str()).collect()
    }

    pub fn is_target(&self, label: &str) -> bool {
        self.rules.iter().any(|r| r.industry == label)
    }

    /// Evaluate every target industry independently against the record
    pub fn classify_target(&self, record: &InvestmentRecord) -> Vec<TargetMatch> {
        let text = search_text(record);
        self.rules
            .iter()
            .filter_map(|rule| {
                rule.evaluate(&text).map(|keyword| TargetMatch {
                    industry: rule.industry.clone(),
                    keyword: keyword.to_string(),
                })
            })
            .collect()
    }

    /// Full classification: target matches, or the sector fallback. Never empty.
    pub fn classify(&self, record: &InvestmentRecord) -> Vec<IndustryLabel> {
        apply_fallback(self.classify_target(record), &record.sector)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// TESTS
// ============================================================================
