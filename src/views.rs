// 📈 Views - what the presentation layer consumes for one filter selection
// Pure reads of the shared dataset; nothing here mutates it

use crate::aggregate::{
    by_country, by_year, country_amounts, ranked_countries, sort_summaries, GroupSummary, SortOrder,
};
use crate::concentration::{hhi, share_of, top_n_share, ConcentrationLevel};
use crate::expansion::{ClassifiedRecord, Dataset};
use crate::filter::{FilterSelection, IndustrySelection};
use serde::Serialize;
use std::collections::BTreeSet;

// ============================================================================
// VIEW TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewSummary {
    /// Every filtered row, with or without an amount
    pub project_count: usize,
    pub total_amount: f64,
    /// Mean over rows with a defined amount; None when there are none
    pub mean_amount: Option<f64>,
    pub country_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryTrend {
    pub industry: String,
    /// (year, total, count), year ascending
    pub points: Vec<GroupSummary<i32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcentrationRow {
    pub industry: String,
    pub hhi: f64,
    /// Combined share of the top-N countries, percent
    pub top_share: f64,
    pub country_count: usize,
    pub top_destination: String,
    pub level: ConcentrationLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DestinationShare {
    pub country: String,
    pub amount: f64,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryInsight {
    pub industry: String,
    pub total_amount: f64,
    pub project_count: usize,
    pub mean_amount: Option<f64>,
    pub hhi: f64,
    pub level: ConcentrationLevel,
    /// Largest destinations first
    pub destinations: Vec<DestinationShare>,
}

impl IndustryInsight {
    pub fn top_destination(&self) -> Option<&DestinationShare> {
        self.destinations.first()
    }
}

// ============================================================================
// FILTERED VIEW
// ============================================================================

/// The dataset restricted to one filter selection
pub struct FilteredView<'a> {
    rows: Vec<&'a ClassifiedRecord>,
    industries: Vec<String>,
    program_column: &'a str,
}

impl<'a> FilteredView<'a> {
    pub fn new(dataset: &'a Dataset, filter: &FilterSelection) -> Self {
        FilteredView {
            rows: filter.apply(dataset),
            industries: industry_order(dataset, filter),
            program_column: dataset.table().program_column(),
        }
    }

    pub fn rows(&self) -> &[&'a ClassifiedRecord] {
        &self.rows
    }

    /// Selected industries: targets in taxonomy order, then other sectors by frequency
    pub fn industries(&self) -> &[String] {
        &self.industries
    }

    /// Name of the column the program flags came from
    pub fn program_column(&self) -> &'a str {
        self.program_column
    }

    fn rows_for(&self, industry: &str) -> Vec<&'a ClassifiedRecord> {
        self.rows
            .iter()
            .copied()
            .filter(|r| r.industry == industry)
            .collect()
    }

    pub fn overview(&self) -> OverviewSummary {
        overview(&self.rows)
    }

    /// Yearly series for every selected industry with at least one amount
    pub fn trends(&self) -> Vec<IndustryTrend> {
        self.industries
            .iter()
            .filter_map(|industry| {
                let points = by_year(self.rows_for(industry));
                if points.is_empty() {
                    None
                } else {
                    Some(IndustryTrend {
                        industry: industry.clone(),
                        points,
                    })
                }
            })
            .collect()
    }

    /// Countries for one industry by total amount descending, at most `size`
    pub fn leaderboard(&self, industry: &str, size: usize) -> Vec<GroupSummary<String>> {
        let mut countries = by_country(self.rows_for(industry));
        sort_summaries(&mut countries, SortOrder::AmountDescending);
        countries.truncate(size);
        countries
    }

    /// One row per selected industry with a positive total
    pub fn concentration(&self, top_n: usize) -> Vec<ConcentrationRow> {
        self.industries
            .iter()
            .filter_map(|industry| {
                let amounts = country_amounts(self.rows_for(industry));
                let total: f64 = amounts.values().sum();
                if total <= 0.0 {
                    return None;
                }
                let index = hhi(&amounts);
                let top_destination = ranked_countries(&amounts)
                    .first()
                    .map(|(country, _)| country.to_string())?;

                Some(ConcentrationRow {
                    industry: industry.clone(),
                    hhi: index,
                    top_share: top_n_share(&amounts, top_n),
                    country_count: amounts.len(),
                    top_destination,
                    level: ConcentrationLevel::from_hhi(index),
                })
            })
            .collect()
    }

    /// Narrative summary per selected industry with at least one row
    pub fn insights(&self, destinations: usize) -> Vec<IndustryInsight> {
        self.industries
            .iter()
            .filter_map(|industry| {
                let rows = self.rows_for(industry);
                if rows.is_empty() {
                    return None;
                }
                let summary = overview(&rows);
                let amounts = country_amounts(rows.iter().copied());
                let index = hhi(&amounts);

                let destinations = ranked_countries(&amounts)
                    .into_iter()
                    .take(destinations)
                    .map(|(country, amount)| DestinationShare {
                        country: country.to_string(),
                        amount,
                        share: share_of(amount, summary.total_amount),
                    })
                    .collect();

                Some(IndustryInsight {
                    industry: industry.clone(),
                    total_amount: summary.total_amount,
                    project_count: summary.project_count,
                    mean_amount: summary.mean_amount,
                    hhi: index,
                    level: ConcentrationLevel::from_hhi(index),
                    destinations,
                })
            })
            .collect()
    }

    /// Filtered rows ordered by amount descending; missing amounts last, then source order
    pub fn rows_by_amount(&self) -> Vec<&'a ClassifiedRecord> {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| match (a.amount(), b.amount()) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        rows
    }
}

// ============================================================================
// HELPERS
// ============================================================================

pub fn overview(rows: &[&ClassifiedRecord]) -> OverviewSummary {
    let amounts: Vec<f64> = rows.iter().filter_map(|r| r.amount()).collect();
    let total_amount: f64 = amounts.iter().sum();
    let mean_amount = if amounts.is_empty() {
        None
    } else {
        Some(total_amount / amounts.len() as f64)
    };
    let country_count = rows
        .iter()
        .filter_map(|r| r.country())
        .collect::<BTreeSet<_>>()
        .len();

    OverviewSummary {
        project_count: rows.len(),
        total_amount,
        mean_amount,
        country_count,
    }
}

/// Order industries the way the dashboard lists them: target industries in
/// taxonomy order, then other sectors by frequency, restricted to the selection.
pub fn industry_order(dataset: &Dataset, filter: &FilterSelection) -> Vec<String> {
    let mut ordered: Vec<String> = dataset.target_industries();
    ordered.extend(
        dataset
            .other_sectors_by_frequency()
            .into_iter()
            .map(|(label, _)| label),
    );

    let mut result: Vec<String> = ordered
        .into_iter()
        .filter(|label| filter.admits_industry(label))
        .collect();

    // Selected labels absent from the data keep a place at the end
    if let IndustrySelection::Only(selected) = &filter.industries {
        for label in selected {
            if !result.contains(label) {
                result.push(label.clone());
            }
        }
    }
    result
}

// ============================================================================
// TESTS
// ============================================================================
