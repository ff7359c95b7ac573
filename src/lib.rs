// Outbound Investment Tracker - Core Library
// Keyword classification and aggregation over cross-border investment records

pub mod error;
pub mod config;
pub mod table;
pub mod parser;
pub mod rules;          // Keyword classifier + taxonomy
pub mod expansion;      // One row per matched industry, memoized
pub mod aggregate;
pub mod concentration;  // HHI / top-N share
pub mod filter;
pub mod views;
pub mod export;
pub mod data_quality;

// Re-export commonly used types
pub use error::{Result, TrackerError};
pub use config::Config;
pub use table::{InvestmentRecord, InvestmentTable};
pub use parser::{normalize_amount, TableLoader, REQUIRED_COLUMNS};
pub use rules::{
    apply_fallback, fallback_label, search_text,
    Classifier, IndustryLabel, IndustryRule, LabelKind, TargetMatch, OTHER_LABEL,
};
pub use expansion::{expand, ClassifiedRecord, Dataset, ProcessCache};
pub use aggregate::{aggregate, sort_summaries, CountryAmounts, GroupSummary, SortOrder};
pub use concentration::{hhi, top_n_share, ConcentrationLevel};
pub use filter::{FilterSelection, IndustrySelection};
pub use views::{
    ConcentrationRow, DestinationShare, FilteredView, IndustryInsight, IndustryTrend,
    OverviewSummary,
};
pub use data_quality::{DataQualityEngine, QualityIssue, QualityReport, Severity};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
