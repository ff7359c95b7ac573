use outbound_tracker::{
    expand, hhi, normalize_amount, search_text, top_n_share, Classifier, CountryAmounts,
    InvestmentRecord, InvestmentTable,
};
use proptest::prelude::*;

fn text_field() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("nan".to_string()),
        Just("Coal Mining".to_string()),
        Just("Goldman Sachs".to_string()),
        Just("Lithium Battery".to_string()),
        Just("EV ".to_string()),
        "[a-zA-Z ]{0,24}",
        "\\PC{0,12}",
    ]
}

fn record_strategy() -> impl Strategy<Value = InvestmentRecord> {
    (text_field(), text_field(), text_field(), text_field(), 2000i32..2030).prop_map(
        |(sector, subsector, investor, target, year)| {
            InvestmentRecord::new(2, year)
                .with_sector(&sector)
                .with_subsector(&subsector)
                .with_investor(&investor)
                .with_target(&target)
        },
    )
}

fn amounts_strategy() -> impl Strategy<Value = CountryAmounts> {
    prop::collection::btree_map("[A-Z][a-z]{2,8}", 0.0f64..1.0e6, 1..12)
}

proptest! {
    #[test]
    fn classify_is_never_empty(record in record_strategy()) {
        let classifier = Classifier::builtin();
        prop_assert!(!classifier.classify(&record).is_empty());
    }

    #[test]
    fn exclusion_is_absolute(record in record_strategy()) {
        let classifier = Classifier::builtin();
        let text = search_text(&record);
        let labels = classifier.classify(&record);
        for rule in classifier.rules() {
            if rule.excluded_by(&text).is_some() {
                prop_assert!(labels.iter().all(|l| !(l.is_target() && l.name == rule.industry)));
            }
        }
    }

    #[test]
    fn expansion_preserves_label_count(records in prop::collection::vec(record_strategy(), 0..20)) {
        let classifier = Classifier::builtin();
        let records: Vec<InvestmentRecord> = records
            .into_iter()
            .enumerate()
            .map(|(i, mut r)| { r.line_number = i + 2; r })
            .collect();
        let table = InvestmentTable::from_records(records, "proptest");

        let expected: usize = table.records().iter().map(|r| classifier.classify(r).len()).sum();
        prop_assert_eq!(expand(&classifier, table.records()).len(), expected);
    }

    #[test]
    fn hhi_is_bounded_and_scale_invariant(amounts in amounts_strategy(), scale in 0.001f64..1000.0) {
        let index = hhi(&amounts);
        prop_assert!(index >= 0.0);
        prop_assert!(index <= 10000.0 + 1e-6);

        let scaled: CountryAmounts = amounts.iter().map(|(c, a)| (c.clone(), a * scale)).collect();
        let total: f64 = amounts.values().sum();
        if total > 0.0 {
            prop_assert!((hhi(&scaled) - index).abs() < 1e-6 * index.max(1.0));
        }
    }

    #[test]
    fn top_n_share_is_monotonic(amounts in amounts_strategy()) {
        let total: f64 = amounts.values().sum();
        let mut previous = 0.0;
        for n in 0..=amounts.len() {
            let share = top_n_share(&amounts, n);
            prop_assert!(share + 1e-9 >= previous);
            previous = share;
        }
        if total > 0.0 {
            prop_assert!((top_n_share(&amounts, amounts.len()) - 100.0).abs() < 1e-6);
            prop_assert!((top_n_share(&amounts, amounts.len() + 5) - 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn normalize_never_panics(raw in "\\PC{0,16}") {
        if let Some(value) = normalize_amount(&raw) {
            prop_assert!(value.is_finite());
            prop_assert!(value >= 0.0);
        }
    }

    #[test]
    fn normalize_reads_formatted_integers(value in 0u64..10_000_000_000) {
        let digits = value.to_string();
        let mut grouped = String::new();
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        let raw = format!("  ${}  ", grouped);
        prop_assert_eq!(normalize_amount(&raw), Some(value as f64));
    }
}
