// 🏗️ Table Parser - amount normalization + CSV loading
// Reads the investment tracker export into immutable records

use crate::error::{Result, TrackerError};
use crate::table::{record_id, InvestmentRecord, InvestmentTable, DEFAULT_PROGRAM_COLUMN};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

// ============================================================================
// AMOUNT NORMALIZATION
// ============================================================================

/// Currency symbols accepted in front of an amount
pub const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

/// Parse a currency-formatted amount ("$1,234.50") into a number.
///
/// Strips surrounding whitespace, a single leading currency symbol and every
/// thousands separator, then parses what is left. Returns `None` for blank,
/// non-numeric, non-finite or negative input; a parse failure is never zero.
pub fn normalize_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let unsigned = trimmed
        .strip_prefix(&CURRENCY_SYMBOLS[..])
        .unwrap_or(trimmed);
    let digits = unsigned.replace(',', "");
    let digits = digits.trim();

    if digits.is_empty() {
        return None;
    }

    digits
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

/// Accepts "2015" and the float-formatted "2015.0" some exports produce
fn parse_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

// ============================================================================
// COLUMNS
// ============================================================================

pub const COL_YEAR: &str = "Year";
pub const COL_MONTH: &str = "Month";
pub const COL_INVESTOR: &str = "Investor";
pub const COL_AMOUNT: &str = "Millions";
pub const COL_TARGET: &str = "Partner/Target";
pub const COL_COUNTRY: &str = "Country";
pub const COL_REGION: &str = "Region";
pub const COL_SECTOR: &str = "Sector";
pub const COL_SUBSECTOR: &str = "Subsector";

/// Columns whose absence aborts the load
pub const REQUIRED_COLUMNS: [&str; 9] = [
    COL_YEAR,
    COL_MONTH,
    COL_INVESTOR,
    COL_AMOUNT,
    COL_TARGET,
    COL_COUNTRY,
    COL_REGION,
    COL_SECTOR,
    COL_SUBSECTOR,
];

struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim_start_matches('\u{feff}').trim().to_string(), i))
            .collect();
        ColumnIndex { positions }
    }

    fn require(&self, column: &str) -> Result<usize> {
        self.positions
            .get(column)
            .copied()
            .ok_or_else(|| TrackerError::MissingColumn {
                column: column.to_string(),
            })
    }

    fn optional(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }
}

fn field(record: &StringRecord, index: Option<usize>) -> &str {
    index.and_then(|i| record.get(i)).unwrap_or("")
}

// ============================================================================
// TABLE LOADER
// ============================================================================

pub struct TableLoader {
    program_column: String,
}

impl TableLoader {
    pub fn new() -> Self {
        TableLoader {
            program_column: DEFAULT_PROGRAM_COLUMN.to_string(),
        }
    }

    /// Builder pattern: name of the program-membership flag column
    pub fn with_program_column(mut self, column: &str) -> Self {
        self.program_column = column.to_string();
        self
    }

    /// Load a CSV file into an immutable table snapshot
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<InvestmentTable> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let source = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("input.csv");
        self.parse(&bytes, source)
    }

    /// Parse CSV bytes. The fingerprint is the SHA-256 of `bytes`.
    pub fn parse(&self, bytes: &[u8], source: &str) -> Result<InvestmentTable> {
        let fingerprint = format!("{:x}", Sha256::digest(bytes));

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let columns = ColumnIndex::from_headers(reader.headers()?);

        let year_col = columns.require(COL_YEAR)?;
        let month_col = columns.require(COL_MONTH)?;
        let investor_col = columns.require(COL_INVESTOR)?;
        let amount_col = columns.require(COL_AMOUNT)?;
        let target_col = columns.require(COL_TARGET)?;
        let country_col = columns.require(COL_COUNTRY)?;
        let region_col = columns.require(COL_REGION)?;
        let sector_col = columns.require(COL_SECTOR)?;
        let subsector_col = columns.require(COL_SUBSECTOR)?;
        let program_col = columns.optional(&self.program_column);

        if program_col.is_none() {
            warn!(
                "{}: no '{}' column, program flags will be blank",
                source, self.program_column
            );
        }

        let mut records = Vec::new();
        let mut missing_amounts = 0usize;
        let mut missing_years = 0usize;

        for (index, result) in reader.records().enumerate() {
            let row = result?;
            // 1-indexed + header row
            let line_number = row
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(index + 2);

            let raw_year = field(&row, Some(year_col));
            let year = parse_year(raw_year);
            if year.is_none() {
                missing_years += 1;
                warn!(
                    "{}:{}: year {:?} is not a number, row kept without a year",
                    source, line_number, raw_year
                );
            }

            let amount_original = field(&row, Some(amount_col)).to_string();
            let amount = normalize_amount(&amount_original);
            if amount.is_none() {
                missing_amounts += 1;
                debug!(
                    "{}:{}: amount {:?} is not a number, treated as missing",
                    source, line_number, amount_original
                );
            }

            records.push(InvestmentRecord {
                id: record_id(&fingerprint, line_number),
                line_number,
                year,
                month: field(&row, Some(month_col)).trim().to_string(),
                investor: field(&row, Some(investor_col)).to_string(),
                amount_original,
                amount,
                target: field(&row, Some(target_col)).to_string(),
                country: field(&row, Some(country_col)).to_string(),
                region: field(&row, Some(region_col)).to_string(),
                sector: field(&row, Some(sector_col)).to_string(),
                subsector: field(&row, Some(subsector_col)).to_string(),
                program_flag: field(&row, program_col).to_string(),
            });
        }

        if missing_amounts > 0 {
            warn!(
                "{}: {} of {} rows have no usable amount",
                source,
                missing_amounts,
                records.len()
            );
        }
        if missing_years > 0 {
            warn!(
                "{}: {} of {} rows have no usable year and drop out of year filters",
                source,
                missing_years,
                records.len()
            );
        }

        let table = InvestmentTable::from_parts(records, fingerprint, source)
            .with_program_column(&self.program_column);
        info!(
            "Loaded {} records from {} at {}",
            table.len(),
            source,
            table.loaded_at().format("%Y-%m-%d %H:%M:%S UTC")
        );
        Ok(table)
    }
}

impl Default for TableLoader {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
