// 🔀 Expansion - one row per (transaction, industry) pair
// The processed dataset is computed once per (table, taxonomy) and shared read-only

use crate::rules::{Classifier, LabelKind};
use crate::table::{InvestmentRecord, InvestmentTable};
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

// ============================================================================
// CLASSIFIED RECORD
// ============================================================================

/// A transaction paired with exactly one matched industry label
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    /// Source transaction, shared with every other row expanded from it
    pub record: Arc<InvestmentRecord>,
    pub industry: String,
    pub kind: LabelKind,
    pub matched_keyword: Option<String>,
}

impl ClassifiedRecord {
    pub fn amount(&self) -> Option<f64> {
        self.record.amount
    }

    pub fn year(&self) -> Option<i32> {
        self.record.year
    }

    pub fn country(&self) -> Option<&str> {
        self.record.country_key()
    }
}

/// Expand every record into one row per label, preserving record order.
/// A record with N labels yields N rows; a record with no target match yields one.
pub fn expand(classifier: &Classifier, records: &[Arc<InvestmentRecord>]) -> Vec<ClassifiedRecord> {
    records
        .iter()
        .flat_map(|record| {
            classifier
                .classify(record)
                .into_iter()
                .map(move |label| ClassifiedRecord {
                    record: Arc::clone(record),
                    industry: label.name,
                    kind: label.kind,
                    matched_keyword: label.matched_keyword,
                })
        })
        .collect()
}

// ============================================================================
// DATASET
// ============================================================================

/// Classified snapshot of one table under one taxonomy
#[derive(Debug)]
pub struct Dataset {
    table: Arc<InvestmentTable>,
    classifier: Arc<Classifier>,
    rows: Vec<ClassifiedRecord>,
}

impl Dataset {
    pub fn process(table: Arc<InvestmentTable>, classifier: Arc<Classifier>) -> Self {
        let rows = expand(&classifier, table.records());
        info!(
            "Classified {} records into {} rows",
            table.len(),
            rows.len()
        );
        Dataset {
            table,
            classifier,
            rows,
        }
    }

    pub fn rows(&self) -> &[ClassifiedRecord] {
        &self.rows
    }

    pub fn table(&self) -> &InvestmentTable {
        &self.table
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Every label present in the dataset, sorted
    pub fn industries(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.industry.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Target industries in taxonomy order, whether or not any row matched them
    pub fn target_industries(&self) -> Vec<String> {
        self.classifier
            .target_industries()
            .into_iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Non-target labels with their row counts, most frequent first (ties by label)
    pub fn other_sectors_by_frequency(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for row in &self.rows {
            if !self.classifier.is_target(&row.industry) {
                *counts.entry(row.industry.as_str()).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(label, count)| (label.to_string(), count))
            .collect();
        // BTreeMap order is the label tiebreak; the sort is stable
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    pub fn rows_for<'a>(&'a self, industry: &'a str) -> impl Iterator<Item = &'a ClassifiedRecord> + 'a {
        self.rows.iter().filter(move |r| r.industry == industry)
    }
}

// ============================================================================
// MEMOIZATION
// ============================================================================

/// Memoizes processed datasets by (table fingerprint, taxonomy fingerprint)
#[derive(Debug, Default)]
pub struct ProcessCache {
    entries: HashMap<(String, String), Arc<Dataset>>,
}

impl ProcessCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for these inputs, processing on first use
    pub fn get_or_process(
        &mut self,
        table: &Arc<InvestmentTable>,
        classifier: &Arc<Classifier>,
    ) -> Arc<Dataset> {
        let key = (
            table.fingerprint().to_string(),
            classifier.fingerprint().to_string(),
        );
        if let Some(dataset) = self.entries.get(&key) {
            debug!("Dataset cache hit for table {}", &key.0);
            return Arc::clone(dataset);
        }

        let dataset = Arc::new(Dataset::process(Arc::clone(table), Arc::clone(classifier)));
        self.entries.insert(key, Arc::clone(&dataset));
        dataset
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::IndustryRule;

    fn sample_table() -> Arc<InvestmentTable> {
        Arc::new(InvestmentTable::from_records(
            vec![
                InvestmentRecord::new(2, 2015)
                    .with_sector("Transport")
                    .with_target("Lithium Battery Mining")
                    .with_country("Chile")
                    .with_amount("$500"),
                InvestmentRecord::new(3, 2016)
                    .with_sector("Energy")
                    .with_target("Hydro Dam")
                    .with_country("Laos")
                    .with_amount("$900"),
                InvestmentRecord::new(4, 2016)
                    .with_sector("Energy")
                    .with_target("Wind Farm")
                    .with_country("Peru"),
                InvestmentRecord::new(5, 2017)
                    .with_sector("Tourism")
                    .with_target("Resort")
                    .with_country("Peru")
                    .with_amount("$100"),
                InvestmentRecord::new(6, 2017),
            ],
            "memory",
        ))
    }

    #[test]
    fn test_expand_counts_match_classification() {
        let classifier = Classifier::builtin();
        let table = sample_table();
        let rows = expand(&classifier, table.records());

        let expected: usize = table
            .records()
            .iter()
            .map(|r| classifier.classify(r).len())
            .sum();
        assert_eq!(rows.len(), expected);
        assert_eq!(rows.len(), 6);
    }

    #[test]
    fn test_expanded_rows_share_record() {
        let classifier = Classifier::builtin();
        let table = sample_table();
        let rows = expand(&classifier, table.records());

        assert_eq!(rows[0].industry, "New Energy Vehicles");
        assert_eq!(rows[1].industry, "Mineral Resources");
        assert!(Arc::ptr_eq(&rows[0].record, &rows[1].record));
        assert_eq!(rows[0].record.id, rows[1].record.id);

        // Grouping rows by record id recovers every source record once
        let ids: BTreeSet<_> = rows.iter().map(|r| r.record.id).collect();
        assert_eq!(ids.len(), table.len());
    }

    #[test]
    fn test_fallback_rows() {
        let dataset = Dataset::process(sample_table(), Arc::new(Classifier::builtin()));
        let last = dataset.rows().last().unwrap();
        assert_eq!(last.industry, "Other");
        assert_eq!(last.kind, LabelKind::Sector);
        assert_eq!(last.matched_keyword, None);
    }

    #[test]
    fn test_other_sectors_by_frequency() {
        let dataset = Dataset::process(sample_table(), Arc::new(Classifier::builtin()));
        assert_eq!(
            dataset.other_sectors_by_frequency(),
            vec![
                ("Energy".to_string(), 2),
                ("Other".to_string(), 1),
                ("Tourism".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_industries_and_targets() {
        let dataset = Dataset::process(sample_table(), Arc::new(Classifier::builtin()));
        assert_eq!(
            dataset.industries(),
            vec![
                "Energy",
                "Mineral Resources",
                "New Energy Vehicles",
                "Other",
                "Tourism"
            ]
        );
        assert_eq!(dataset.target_industries().len(), 4);
        assert_eq!(dataset.rows_for("Energy").count(), 2);
    }

    #[test]
    fn test_cache_reuses_dataset() {
        let mut cache = ProcessCache::new();
        let table = sample_table();
        let classifier = Arc::new(Classifier::builtin());

        let a = cache.get_or_process(&table, &classifier);
        let b = cache.get_or_process(&table, &classifier);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let other = Arc::new(
            Classifier::from_rules(vec![IndustryRule::new("Hydro", &["hydro"], &[])]).unwrap(),
        );
        let c = cache.get_or_process(&table, &other);
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
