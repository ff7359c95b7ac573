// ✅ Data Quality Engine - load-time checks over the input table
// Recovered anomalies (unparsable amounts, blank fields) are reported, never fatal

use crate::rules::search_text;
use crate::table::InvestmentTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning, // Affects sums or classification
    Info,    // Worth knowing, no effect on results
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIssue {
    pub severity: Severity,
    pub field: String,
    pub issue: String,
    pub recommendation: String,
}

// ============================================================================
// QUALITY REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub source: String,
    pub loaded_at: DateTime<Utc>,
    pub total_rows: usize,
    /// Source lines whose amount did not parse
    pub missing_amount_lines: Vec<usize>,
    /// Source lines whose year did not parse
    pub missing_year_lines: Vec<usize>,
    /// Rows with sector, subsector, target and investor all blank
    pub blank_text_rows: usize,
    pub blank_country_rows: usize,
    pub program_member_rows: usize,
    pub issues: Vec<QualityIssue>,
}

impl QualityReport {
    pub fn missing_amount_rows(&self) -> usize {
        self.missing_amount_lines.len()
    }

    /// Share of rows with a usable amount, 0.0 - 1.0
    pub fn amount_coverage(&self) -> f64 {
        if self.total_rows == 0 {
            return 1.0;
        }
        (self.total_rows - self.missing_amount_rows()) as f64 / self.total_rows as f64
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} (loaded {}): {} rows, {:.1}% with amount, {} without year, {} blank text, {} blank country, {} issues",
            self.source,
            self.loaded_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.total_rows,
            self.amount_coverage() * 100.0,
            self.missing_year_lines.len(),
            self.blank_text_rows,
            self.blank_country_rows,
            self.issues.len()
        )
    }
}

// ============================================================================
// DATA QUALITY ENGINE
// ============================================================================

pub struct DataQualityEngine {
    /// Line numbers listed in an issue before truncating
    max_listed_lines: usize,
}

impl DataQualityEngine {
    pub fn new() -> Self {
        DataQualityEngine {
            max_listed_lines: 10,
        }
    }

    pub fn assess(&self, table: &InvestmentTable) -> QualityReport {
        let mut missing_amount_lines = Vec::new();
        let mut missing_year_lines = Vec::new();
        let mut blank_text_rows = 0;
        let mut blank_country_rows = 0;
        let mut program_member_rows = 0;

        for record in table.records() {
            if record.amount.is_none() {
                missing_amount_lines.push(record.line_number);
            }
            if record.year.is_none() {
                missing_year_lines.push(record.line_number);
            }
            if search_text(record).trim().is_empty() {
                blank_text_rows += 1;
            }
            if record.country_key().is_none() {
                blank_country_rows += 1;
            }
            if record.is_program_member() {
                program_member_rows += 1;
            }
        }

        let mut issues = Vec::new();

        if !missing_amount_lines.is_empty() {
            issues.push(QualityIssue {
                severity: Severity::Warning,
                field: "amount".to_string(),
                issue: format!(
                    "{} rows have no numeric amount (lines {})",
                    missing_amount_lines.len(),
                    self.list_lines(&missing_amount_lines)
                ),
                recommendation: "Excluded from totals and means; fix the source values".to_string(),
            });
        }

        if !missing_year_lines.is_empty() {
            issues.push(QualityIssue {
                severity: Severity::Warning,
                field: "year".to_string(),
                issue: format!(
                    "{} rows have no numeric year (lines {})",
                    missing_year_lines.len(),
                    self.list_lines(&missing_year_lines)
                ),
                recommendation: "Left out of trends and of any year-range filter".to_string(),
            });
        }

        if blank_text_rows > 0 {
            issues.push(QualityIssue {
                severity: Severity::Warning,
                field: "sector".to_string(),
                issue: format!("{} rows have no sector, subsector, target or investor", blank_text_rows),
                recommendation: "These rows classify as Other".to_string(),
            });
        }

        if blank_country_rows > 0 {
            issues.push(QualityIssue {
                severity: Severity::Info,
                field: "country".to_string(),
                issue: format!("{} rows have no destination country", blank_country_rows),
                recommendation: "Left out of country rollups and concentration".to_string(),
            });
        }

        QualityReport {
            source: table.source().to_string(),
            loaded_at: table.loaded_at(),
            total_rows: table.len(),
            missing_amount_lines,
            missing_year_lines,
            blank_text_rows,
            blank_country_rows,
            program_member_rows,
            issues,
        }
    }

    fn list_lines(&self, lines: &[usize]) -> String {
        let shown: Vec<String> = lines
            .iter()
            .take(self.max_listed_lines)
            .map(|l| l.to_string())
            .collect();
        if lines.len() > self.max_listed_lines {
            format!("{}, ...", shown.join(", "))
        } else {
            shown.join(", ")
        }
    }
}

impl Default for DataQualityEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
