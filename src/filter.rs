use crate::expansion::{ClassifiedRecord, Dataset};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Which industries the selection admits
#[derive(Debug, Clone, PartialEq)]
pub enum IndustrySelection {
    All,
    Only(BTreeSet<String>),
}

/// Current filter selection over the classified dataset.
/// Applying it never mutates the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelection {
    pub industries: IndustrySelection,
    pub years: Option<RangeInclusive<i32>>,
    /// Empty means every country
    pub countries: BTreeSet<String>,
    /// Inclusive amount bounds; rows with a missing amount never satisfy them
    pub amount_range: Option<(f64, f64)>,
}

impl FilterSelection {
    /// Admit every row
    pub fn all() -> Self {
        FilterSelection {
            industries: IndustrySelection::All,
            years: None,
            countries: BTreeSet::new(),
            amount_range: None,
        }
    }

    /// All target industries plus the `other_sectors` most frequent other sectors
    pub fn dashboard_default(dataset: &Dataset, other_sectors: usize) -> Self {
        let mut selected: BTreeSet<String> = dataset.target_industries().into_iter().collect();
        selected.extend(
            dataset
                .other_sectors_by_frequency()
                .into_iter()
                .take(other_sectors)
                .map(|(label, _)| label),
        );

        FilterSelection {
            industries: IndustrySelection::Only(selected),
            years: dataset.table().year_span().map(|(lo, hi)| lo..=hi),
            countries: BTreeSet::new(),
            amount_range: None,
        }
    }

    pub fn with_industries<I, S>(mut self, industries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.industries = IndustrySelection::Only(industries.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_years(mut self, from: i32, to: i32) -> Self {
        self.years = Some(from..=to);
        self
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = countries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_amount_range(mut self, min: f64, max: f64) -> Self {
        self.amount_range = Some((min, max));
        self
    }

    pub fn admits_industry(&self, industry: &str) -> bool {
        match &self.industries {
            IndustrySelection::All => true,
            IndustrySelection::Only(set) => set.contains(industry),
        }
    }

    pub fn matches(&self, row: &ClassifiedRecord) -> bool {
        if !self.admits_industry(&row.industry) {
            return false;
        }
        if let Some(years) = &self.years {
            match row.year() {
                Some(year) if years.contains(&year) => {}
                _ => return false,
            }
        }
        if !self.countries.is_empty() {
            match row.country() {
                Some(country) if self.countries.contains(country) => {}
                _ => return false,
            }
        }
        if let Some((min, max)) = self.amount_range {
            match row.amount() {
                Some(amount) if amount >= min && amount <= max => {}
                _ => return false,
            }
        }
        true
    }

    /// Rows of `dataset` passing the filter, in dataset order
    pub fn apply<'a>(&self, dataset: &'a Dataset) -> Vec<&'a ClassifiedRecord> {
        dataset.rows().iter().filter(|row| self.matches(row)).collect()
    }
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self::all()
    }
}
