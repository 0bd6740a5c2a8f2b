/// Property-based tests using proptest
/// Tests invariants that should hold for every pair of source reports
use chrono::{TimeZone, Utc};
use credit_score_api::identity::Pinfl;
use credit_score_api::models::{
    Assets, CivilRegistryReport, CreditHistoryReport, Employment, Rating, TaxStatus,
    EMPLOYED_STATUS, NO_TAX_ARREARS_STATUS,
};
use credit_score_api::scoring::{
    aggregate_at, final_score, rating_for_score, CONSIDER_PROPERTY, EXCELLENT_HISTORY,
    GOOD_HISTORY, MAX_SCORE, REPAY_OVERDUE_DEBT, ROOM_TO_IMPROVE,
};
use proptest::prelude::*;

fn credit_strategy() -> impl Strategy<Value = CreditHistoryReport> {
    (
        proptest::option::of(-5_000i64..5_000),
        0i64..100_000_000,
        0i64..100_000_000,
    )
        .prop_map(|(credit_score, total_debt, overdue_debt)| CreditHistoryReport {
            source: "KATM".to_string(),
            credit_rating: "B".to_string(),
            credit_history: vec![],
            total_debt,
            overdue_debt,
            credit_score,
        })
}

fn civil_strategy() -> impl Strategy<Value = CivilRegistryReport> {
    (
        prop_oneof![Just(EMPLOYED_STATUS.to_string()), "[a-zA-Z ]{0,12}"],
        prop_oneof![Just(NO_TAX_ARREARS_STATUS.to_string()), "[a-zA-Z ]{0,12}"],
        proptest::bool::ANY,
    )
        .prop_map(|(employment_status, tax_status, property)| CivilRegistryReport {
            source: "E-GOV".to_string(),
            employment: Employment {
                status: employment_status,
                company: "Acme".to_string(),
                position: "Engineer".to_string(),
                salary: 10_000_000,
            },
            assets: Assets {
                property,
                vehicles: 0,
                bank_accounts: 1,
            },
            taxes: TaxStatus {
                status: tax_status,
                last_payment: None,
            },
        })
}

fn expected_rating(score: i64) -> Rating {
    match score {
        s if s >= 800 => Rating::APlus,
        s if s >= 750 => Rating::A,
        s if s >= 700 => Rating::BPlus,
        s if s >= 650 => Rating::B,
        s if s >= 600 => Rating::CPlus,
        _ => Rating::C,
    }
}

// Property: score cap and rating table
proptest! {
    #[test]
    fn final_score_never_exceeds_cap(credit in credit_strategy(), civil in civil_strategy()) {
        prop_assert!(final_score(&credit, &civil) <= MAX_SCORE);
    }

    #[test]
    fn rating_table_is_total(score in proptest::num::i64::ANY) {
        prop_assert_eq!(rating_for_score(score), expected_rating(score));
    }

    #[test]
    fn extreme_bureau_scores_do_not_overflow(extreme in prop_oneof![Just(i64::MAX), Just(i64::MIN)], civil in civil_strategy()) {
        let credit = CreditHistoryReport {
            source: "KATM".to_string(),
            credit_rating: "A".to_string(),
            credit_history: vec![],
            total_debt: 0,
            overdue_debt: 0,
            credit_score: Some(extreme),
        };
        prop_assert!(final_score(&credit, &civil) <= MAX_SCORE);
    }
}

// Property: aggregated report contents
proptest! {
    #[test]
    fn recommendations_follow_fixed_order(credit in credit_strategy(), civil in civil_strategy()) {
        let timestamp = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let pinfl = Pinfl::parse("12345678901234").unwrap();
        let report = aggregate_at(&pinfl, &credit, &civil, timestamp);

        let band = if report.final_score >= 800 {
            EXCELLENT_HISTORY
        } else if report.final_score >= 700 {
            GOOD_HISTORY
        } else {
            ROOM_TO_IMPROVE
        };

        let mut expected = vec![band.to_string()];
        if credit.overdue_debt > 0 {
            expected.push(REPAY_OVERDUE_DEBT.to_string());
        }
        if !civil.assets.property {
            expected.push(CONSIDER_PROPERTY.to_string());
        }

        prop_assert!(!report.recommendations.is_empty());
        prop_assert_eq!(report.recommendations, expected);
        prop_assert_eq!(report.credit_rating, expected_rating(report.final_score));
    }

    #[test]
    fn aggregation_is_deterministic(credit in credit_strategy(), civil in civil_strategy()) {
        let timestamp = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let pinfl = Pinfl::parse("12345678901234").unwrap();

        let first = aggregate_at(&pinfl, &credit, &civil, timestamp);
        let second = aggregate_at(&pinfl, &credit, &civil, timestamp);
        prop_assert_eq!(first, second);
    }
}

// Property: identifier validation
proptest! {
    #[test]
    fn pinfl_parse_never_panics(raw in "\\PC*") {
        let _ = Pinfl::parse(&raw);
    }

    #[test]
    fn fourteen_digits_always_accepted(raw in "[0-9]{14}") {
        prop_assert!(Pinfl::parse(&raw).is_ok());
    }

    #[test]
    fn other_digit_counts_rejected(raw in "[0-9]{0,13}|[0-9]{15,20}") {
        prop_assert!(Pinfl::parse(&raw).is_err());
    }
}
