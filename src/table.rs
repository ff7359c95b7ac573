use crate::parser::normalize_amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

/// Program-membership column used when none is configured
pub const DEFAULT_PROGRAM_COLUMN: &str = "BRI";

/// One investment event as read from the input table.
/// Normalized once at load, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentRecord {
    /// Stable identity derived from (table fingerprint, line number)
    pub id: Uuid,

    /// 1-based line in the source file (header is line 1)
    pub line_number: usize,

    /// None when the Year cell was blank or not a number
    pub year: Option<i32>,
    pub month: String,
    pub investor: String,

    /// Amount text exactly as it appeared in the source ("$1,234")
    pub amount_original: String,

    /// Normalized amount in millions; None when the text did not parse
    pub amount: Option<f64>,

    /// Partner/Target entity
    pub target: String,
    pub country: String,
    pub region: String,
    pub sector: String,
    pub subsector: String,

    /// Raw program-membership flag (BRI column)
    pub program_flag: String,
}

pub fn record_id(fingerprint: &str, line_number: usize) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_OID,
        format!("{}:{}", fingerprint, line_number).as_bytes(),
    )
}

impl InvestmentRecord {
    /// Create a record with blank text fields and a missing amount
    pub fn new(line_number: usize, year: i32) -> Self {
        InvestmentRecord {
            id: record_id("", line_number),
            line_number,
            year: Some(year),
            month: String::new(),
            investor: String::new(),
            amount_original: String::new(),
            amount: None,
            target: String::new(),
            country: String::new(),
            region: String::new(),
            sector: String::new(),
            subsector: String::new(),
            program_flag: String::new(),
        }
    }

    /// Clears the year, as for a blank Year cell
    pub fn without_year(mut self) -> Self {
        self.year = None;
        self
    }

    pub fn with_month(mut self, month: &str) -> Self {
        self.month = month.to_string();
        self
    }

    pub fn with_investor(mut self, investor: &str) -> Self {
        self.investor = investor.to_string();
        self
    }

    /// Sets the raw amount text and its normalized value
    pub fn with_amount(mut self, raw: &str) -> Self {
        self.amount_original = raw.to_string();
        self.amount = normalize_amount(raw);
        self
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.target = target.to_string();
        self
    }

    pub fn with_country(mut self, country: &str) -> Self {
        self.country = country.to_string();
        self
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.region = region.to_string();
        self
    }

    pub fn with_sector(mut self, sector: &str) -> Self {
        self.sector = sector.to_string();
        self
    }

    pub fn with_subsector(mut self, subsector: &str) -> Self {
        self.subsector = subsector.to_string();
        self
    }

    pub fn with_program_flag(mut self, flag: &str) -> Self {
        self.program_flag = flag.to_string();
        self
    }

    pub fn has_year(&self) -> bool {
        self.year.is_some()
    }

    pub fn has_amount(&self) -> bool {
        self.amount.is_some()
    }

    /// Country with surrounding whitespace removed; None when blank
    pub fn country_key(&self) -> Option<&str> {
        let country = self.country.trim();
        if country.is_empty() {
            None
        } else {
            Some(country)
        }
    }

    /// Program flag is set when non-blank and not an explicit negative
    pub fn is_program_member(&self) -> bool {
        let flag = self.program_flag.trim().to_lowercase();
        !matches!(flag.as_str(), "" | "0" | "no" | "n" | "false" | "nan")
    }
}

// ============================================================================
// TABLE SNAPSHOT
// ============================================================================

/// The full input table, loaded once and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct InvestmentTable {
    records: Vec<Arc<InvestmentRecord>>,
    fingerprint: String,
    source: String,
    program_column: String,
    loaded_at: DateTime<Utc>,
}

impl InvestmentTable {
    /// Assemble a table whose fingerprint was computed over the raw source bytes
    pub fn from_parts(records: Vec<InvestmentRecord>, fingerprint: String, source: &str) -> Self {
        InvestmentTable {
            records: records.into_iter().map(Arc::new).collect(),
            fingerprint,
            source: source.to_string(),
            program_column: DEFAULT_PROGRAM_COLUMN.to_string(),
            loaded_at: Utc::now(),
        }
    }

    /// Build a table from in-memory records.
    /// Fingerprint is the SHA-256 of the records' JSON; ids are re-derived from it.
    pub fn from_records(mut records: Vec<InvestmentRecord>, source: &str) -> Self {
        let mut hasher = Sha256::new();
        for record in &records {
            // Serialization of a plain struct of strings and numbers cannot fail
            if let Ok(bytes) = serde_json::to_vec(record) {
                hasher.update(&bytes);
            }
        }
        let fingerprint = format!("{:x}", hasher.finalize());

        for record in &mut records {
            record.id = record_id(&fingerprint, record.line_number);
        }

        Self::from_parts(records, fingerprint, source)
    }

    /// Builder pattern: name of the column the program flags were read from
    pub fn with_program_column(mut self, column: &str) -> Self {
        self.program_column = column.to_string();
        self
    }

    pub fn records(&self) -> &[Arc<InvestmentRecord>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Hex SHA-256 identifying the table contents
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn program_column(&self) -> &str {
        &self.program_column
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// (min, max) year over records that have one
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let min = self.records.iter().filter_map(|r| r.year).min()?;
        let max = self.records.iter().filter_map(|r| r.year).max()?;
        Some((min, max))
    }

    /// Distinct non-blank countries, sorted
    pub fn countries(&self) -> BTreeSet<String> {
        self.records
            .iter()
            .filter_map(|r| r.country_key())
            .map(|c| c.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder_normalizes_amount() {
        let record = InvestmentRecord::new(2, 2015)
            .with_sector("Energy")
            .with_amount("$1,200");
        assert_eq!(record.amount, Some(1200.0));
        assert_eq!(record.amount_original, "$1,200");
        assert!(record.has_amount());

        let missing = InvestmentRecord::new(3, 2015).with_amount("N/A");
        assert_eq!(missing.amount, None);
        assert!(!missing.has_amount());
    }

    #[test]
    fn test_country_key_blank() {
        let record = InvestmentRecord::new(2, 2015).with_country("   ");
        assert_eq!(record.country_key(), None);

        let record = InvestmentRecord::new(2, 2015).with_country(" Chile ");
        assert_eq!(record.country_key(), Some("Chile"));
    }

    #[test]
    fn test_program_flag() {
        assert!(InvestmentRecord::new(2, 2015).with_program_flag("BRI").is_program_member());
        assert!(InvestmentRecord::new(2, 2015).with_program_flag("1").is_program_member());
        assert!(!InvestmentRecord::new(2, 2015).with_program_flag("").is_program_member());
        assert!(!InvestmentRecord::new(2, 2015).with_program_flag("0").is_program_member());
    }

    #[test]
    fn test_from_records_is_deterministic() {
        let records = vec![
            InvestmentRecord::new(2, 2014).with_country("Peru"),
            InvestmentRecord::new(3, 2018).with_country("Chile"),
        ];
        let a = InvestmentTable::from_records(records.clone(), "memory");
        let b = InvestmentTable::from_records(records, "memory");

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.records()[0].id, b.records()[0].id);
        assert_ne!(a.records()[0].id, a.records()[1].id);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_year_span_and_countries() {
        let table = InvestmentTable::from_records(
            vec![
                InvestmentRecord::new(2, 2014).with_country("Peru"),
                InvestmentRecord::new(3, 2018).with_country("Chile"),
                InvestmentRecord::new(4, 2016).with_country(""),
            ],
            "memory",
        );
        assert_eq!(table.year_span(), Some((2014, 2018)));
        let countries: Vec<_> = table.countries().into_iter().collect();
        assert_eq!(countries, vec!["Chile".to_string(), "Peru".to_string()]);
    }

    #[test]
    fn test_year_span_skips_missing_years() {
        let table = InvestmentTable::from_records(
            vec![
                InvestmentRecord::new(2, 2016),
                InvestmentRecord::new(3, 1990).without_year(),
                InvestmentRecord::new(4, 2019),
            ],
            "memory",
        );
        assert_eq!(table.year_span(), Some((2016, 2019)));
        assert!(!table.records()[1].has_year());

        let undated = InvestmentTable::from_records(
            vec![InvestmentRecord::new(2, 2016).without_year()],
            "memory",
        );
        assert_eq!(undated.year_span(), None);
    }

    #[test]
    fn test_table_metadata() {
        let before = Utc::now();
        let table = InvestmentTable::from_records(Vec::new(), "memory");
        assert_eq!(table.source(), "memory");
        assert_eq!(table.program_column(), DEFAULT_PROGRAM_COLUMN);
        assert!(table.loaded_at() >= before);

        let table = table.with_program_column("Flag");
        assert_eq!(table.program_column(), "Flag");
    }

    #[test]
    fn test_empty_table() {
        let table = InvestmentTable::from_records(Vec::new(), "memory");
        assert!(table.is_empty());
        assert_eq!(table.year_span(), None);
    }
}
