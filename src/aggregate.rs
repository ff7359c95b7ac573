// 📊 Aggregation - grouped sums and counts over classified rows
// Only rows with a defined amount contribute; empty groups are never emitted

use crate::expansion::ClassifiedRecord;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Total invested amount per country
pub type CountryAmounts = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary<K> {
    pub key: K,
    /// Sum of defined amounts
    pub total_amount: f64,
    /// Number of rows with a defined amount
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Time series order
    KeyAscending,
    /// Leaderboard order; ties broken by key ascending
    AmountDescending,
}

/// Group rows by `key`, summing and counting defined amounts.
/// Rows whose key is None or whose amount is missing are skipped.
/// Output is sorted by key ascending.
pub fn aggregate<'a, K, I, F>(rows: I, key: F) -> Vec<GroupSummary<K>>
where
    K: Ord,
    I: IntoIterator<Item = &'a ClassifiedRecord>,
    F: Fn(&ClassifiedRecord) -> Option<K>,
{
    let mut groups: BTreeMap<K, (f64, usize)> = BTreeMap::new();

    for row in rows {
        let amount = match row.amount() {
            Some(amount) => amount,
            None => continue,
        };
        if let Some(k) = key(row) {
            let entry = groups.entry(k).or_insert((0.0, 0));
            entry.0 += amount;
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(key, (total_amount, count))| GroupSummary {
            key,
            total_amount,
            count,
        })
        .collect()
}

pub fn sort_summaries<K: Ord>(summaries: &mut [GroupSummary<K>], order: SortOrder) {
    match order {
        SortOrder::KeyAscending => summaries.sort_by(|a, b| a.key.cmp(&b.key)),
        SortOrder::AmountDescending => summaries.sort_by(|a, b| {
            b.total_amount
                .total_cmp(&a.total_amount)
                .then_with(|| a.key.cmp(&b.key))
        }),
    }
}

pub fn by_year<'a, I>(rows: I) -> Vec<GroupSummary<i32>>
where
    I: IntoIterator<Item = &'a ClassifiedRecord>,
{
    aggregate(rows, |r| r.year())
}

pub fn by_country<'a, I>(rows: I) -> Vec<GroupSummary<String>>
where
    I: IntoIterator<Item = &'a ClassifiedRecord>,
{
    aggregate(rows, |r| r.country().map(|c| c.to_string()))
}

pub fn by_industry<'a, I>(rows: I) -> Vec<GroupSummary<String>>
where
    I: IntoIterator<Item = &'a ClassifiedRecord>,
{
    aggregate(rows, |r| Some(r.industry.clone()))
}

/// Per-country totals, the input of the concentration calculator
pub fn country_amounts<'a, I>(rows: I) -> CountryAmounts
where
    I: IntoIterator<Item = &'a ClassifiedRecord>,
{
    by_country(rows)
        .into_iter()
        .map(|g| (g.key, g.total_amount))
        .collect()
}

/// Descending by amount, ties by country name
pub fn ranked_countries(amounts: &CountryAmounts) -> Vec<(&str, f64)> {
    let mut ranked: Vec<(&str, f64)> = amounts.iter().map(|(c, a)| (c.as_str(), *a)).collect();
    ranked.sort_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => a.0.cmp(b.0),
        other => other,
    });
    ranked
}

// ============================================================================
// TESTS
// ============================================================================
