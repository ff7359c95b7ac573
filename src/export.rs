// 📤 Export - flat CSV of classified rows

use crate::error::Result;
use crate::expansion::ClassifiedRecord;
use crate::views::FilteredView;
use csv::WriterBuilder;
use log::info;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Export header; the program column takes the name it was loaded from
pub fn export_header(program_column: &str) -> [&str; 12] {
    [
        "Year",
        "Month",
        "Industry",
        "Investor",
        "Amount",
        "Partner/Target",
        "Country",
        "Region",
        "Sector",
        "Subsector",
        program_column,
        "Matched_Keyword",
    ]
}

/// One export line, fields in `export_header` order
#[derive(Debug, Serialize)]
pub struct ExportRow<'a> {
    pub year: Option<i32>,
    pub month: &'a str,
    pub industry: &'a str,
    pub investor: &'a str,
    pub amount: Option<f64>,
    pub target: &'a str,
    pub country: &'a str,
    pub region: &'a str,
    pub sector: &'a str,
    pub subsector: &'a str,
    pub program_flag: &'a str,
    pub matched_keyword: &'a str,
}

impl<'a> From<&'a ClassifiedRecord> for ExportRow<'a> {
    fn from(row: &'a ClassifiedRecord) -> Self {
        let record = &row.record;
        ExportRow {
            year: record.year,
            month: &record.month,
            industry: &row.industry,
            investor: &record.investor,
            amount: record.amount,
            target: &record.target,
            country: &record.country,
            region: &record.region,
            sector: &record.sector,
            subsector: &record.subsector,
            program_flag: &record.program_flag,
            matched_keyword: row.matched_keyword.as_deref().unwrap_or(""),
        }
    }
}

pub fn write_rows<W: Write>(
    rows: &[&ClassifiedRecord],
    program_column: &str,
    writer: W,
) -> Result<usize> {
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(export_header(program_column))?;
    for row in rows {
        csv_writer.serialize(ExportRow::from(*row))?;
    }
    csv_writer.flush()?;
    Ok(rows.len())
}

pub fn export_view<P: AsRef<Path>>(view: &FilteredView<'_>, path: P) -> Result<usize> {
    let file = File::create(path.as_ref())?;
    let written = write_rows(&view.rows_by_amount(), view.program_column(), file)?;
    info!("Exported {} rows to {}", written, path.as_ref().display());
    Ok(written)
}

/// File name for an industry list: path-unsafe characters become '_'
pub fn industry_file_name(industry: &str) -> String {
    let stem: String = industry
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "unnamed".to_string() } else { stem };
    format!("{}.csv", stem)
}

/// One CSV per selected industry with at least one row, largest amounts first
pub fn export_by_industry<P: AsRef<Path>>(view: &FilteredView<'_>, dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let ordered = view.rows_by_amount();
    let mut written = Vec::new();

    for industry in view.industries() {
        let rows: Vec<&ClassifiedRecord> = ordered
            .iter()
            .copied()
            .filter(|r| &r.industry == industry)
            .collect();
        if rows.is_empty() {
            continue;
        }

        let path = dir.join(industry_file_name(industry));
        let count = write_rows(&rows, view.program_column(), File::create(&path)?)?;
        info!("{}: {} rows -> {}", industry, count, path.display());
        written.push(path);
    }

    Ok(written)
}
