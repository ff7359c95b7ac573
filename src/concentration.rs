// 🎯 Concentration - HHI and top-N share over per-country totals

use crate::aggregate::{ranked_countries, CountryAmounts};
use serde::Serialize;

/// HHI below this is low concentration
pub const LOW_CONCENTRATION_MAX: f64 = 1000.0;

/// HHI above this is high concentration
pub const HIGH_CONCENTRATION_MIN: f64 = 1800.0;

fn total(amounts: &CountryAmounts) -> f64 {
    amounts.values().sum()
}

/// Herfindahl-Hirschman index: sum of squared percentage shares.
/// Ranges over (0, 10000]; a zero total yields 0.
pub fn hhi(amounts: &CountryAmounts) -> f64 {
    let total = total(amounts);
    if total <= 0.0 {
        return 0.0;
    }
    amounts
        .values()
        .map(|amount| {
            let share = amount / total * 100.0;
            share * share
        })
        .sum()
}

/// Combined percentage share of the `n` largest countries (ties by name).
/// A zero total yields 0.
pub fn top_n_share(amounts: &CountryAmounts, n: usize) -> f64 {
    let total = total(amounts);
    if total <= 0.0 {
        return 0.0;
    }
    let top: f64 = ranked_countries(amounts)
        .into_iter()
        .take(n)
        .map(|(_, amount)| amount)
        .sum();
    top / total * 100.0
}

/// Percentage share of a single amount; 0 when the total is zero
pub fn share_of(amount: f64, total: f64) -> f64 {
    if total > 0.0 {
        amount / total * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConcentrationLevel {
    Low,
    Moderate,
    High,
}

impl ConcentrationLevel {
    pub fn from_hhi(hhi: f64) -> Self {
        if hhi > HIGH_CONCENTRATION_MIN {
            ConcentrationLevel::High
        } else if hhi >= LOW_CONCENTRATION_MAX {
            ConcentrationLevel::Moderate
        } else {
            ConcentrationLevel::Low
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConcentrationLevel::Low => "Low",
            ConcentrationLevel::Moderate => "Moderate",
            ConcentrationLevel::High => "High",
        }
    }

    /// Risk reading shown next to the index
    pub fn risk_note(&self) -> &'static str {
        match self {
            ConcentrationLevel::Low => "Low concentration - diversified risk",
            ConcentrationLevel::Moderate => "Moderate concentration - moderate risk level",
            ConcentrationLevel::High => "High concentration - significant geopolitical risk",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amounts(entries: &[(&str, f64)]) -> CountryAmounts {
        entries.iter().map(|(c, a)| (c.to_string(), *a)).collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_three_country_scenario() {
        let a = amounts(&[("A", 600.0), ("B", 300.0), ("C", 100.0)]);
        assert!(close(hhi(&a), 4600.0));
        assert!(close(top_n_share(&a, 2), 90.0));
        assert!(close(top_n_share(&a, 3), 100.0));
    }

    #[test]
    fn test_single_country() {
        let a = amounts(&[("Chile", 42.0)]);
        assert!(close(hhi(&a), 10000.0));
        assert!(close(top_n_share(&a, 1), 100.0));
    }

    #[test]
    fn test_zero_total() {
        assert_eq!(hhi(&CountryAmounts::new()), 0.0);
        assert_eq!(hhi(&amounts(&[("A", 0.0), ("B", 0.0)])), 0.0);
        assert_eq!(top_n_share(&CountryAmounts::new(), 3), 0.0);
        assert_eq!(share_of(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_scale_invariance() {
        let a = amounts(&[("A", 6.0), ("B", 3.0), ("C", 1.0)]);
        let b = amounts(&[("A", 6000.0), ("B", 3000.0), ("C", 1000.0)]);
        assert!(close(hhi(&a), hhi(&b)));
    }

    #[test]
    fn test_top_n_tie_break_by_name() {
        let a = amounts(&[("Peru", 50.0), ("Chile", 50.0), ("Laos", 0.0)]);
        assert!(close(top_n_share(&a, 1), 50.0));
        assert!(close(top_n_share(&a, 0), 0.0));
        assert!(close(top_n_share(&a, 10), 100.0));
    }

    #[test]
    fn test_concentration_bands() {
        assert_eq!(ConcentrationLevel::from_hhi(0.0), ConcentrationLevel::Low);
        assert_eq!(ConcentrationLevel::from_hhi(999.9), ConcentrationLevel::Low);
        assert_eq!(ConcentrationLevel::from_hhi(1000.0), ConcentrationLevel::Moderate);
        assert_eq!(ConcentrationLevel::from_hhi(1800.0), ConcentrationLevel::Moderate);
        assert_eq!(ConcentrationLevel::from_hhi(1800.1), ConcentrationLevel::High);
        assert_eq!(ConcentrationLevel::High.name(), "High");
    }
}
