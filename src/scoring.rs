//! Report aggregation and credit scoring
//!
//! Combines the credit-history and civil-registry reports into one
//! aggregated report:
//! 1. Start from the bureau score (750 when the bureau sent none or 0)
//! 2. Apply employment, tax and property adjustments
//! 3. Cap at 900 (no floor)
//! 4. Pick the rating tier and recommendation lines
//!
//! Everything here is pure; the only clock read is in [`aggregate`].

use crate::identity::Pinfl;
use crate::models::{
    AggregatedReport, CivilRegistryReport, CreditHistoryReport, Rating, ReportSummary,
};
use chrono::{DateTime, Utc};

pub const DEFAULT_BASE_SCORE: i64 = 750;
pub const MAX_SCORE: i64 = 900;

pub const EMPLOYMENT_BONUS: i64 = 50;
pub const NO_TAX_ARREARS_BONUS: i64 = 25;
pub const TAX_ARREARS_PENALTY: i64 = -50;
pub const PROPERTY_BONUS: i64 = 30;

pub const EXCELLENT_HISTORY: &str =
    "Excellent credit history. The best credit products are available to you.";
pub const GOOD_HISTORY: &str =
    "Good credit history. Keep maintaining your current level.";
pub const ROOM_TO_IMPROVE: &str = "There is room to improve your credit history.";
pub const REPAY_OVERDUE_DEBT: &str = "Paying off your overdue debt is recommended.";
pub const CONSIDER_PROPERTY: &str =
    "Owning real estate can have a positive effect on your credit rating.";

/// Descending inclusive lower bounds; the first one met wins.
const RATING_THRESHOLDS: [(i64, Rating); 5] = [
    (800, Rating::APlus),
    (750, Rating::A),
    (700, Rating::BPlus),
    (650, Rating::B),
    (600, Rating::CPlus),
];

/// Aggregates both source reports, stamped with the current time.
pub fn aggregate(
    pinfl: &Pinfl,
    credit: &CreditHistoryReport,
    civil: &CivilRegistryReport,
) -> AggregatedReport {
    aggregate_at(pinfl, credit, civil, Utc::now())
}

/// Aggregates both source reports with an explicit timestamp.
///
/// Identical inputs always produce identical reports.
pub fn aggregate_at(
    pinfl: &Pinfl,
    credit: &CreditHistoryReport,
    civil: &CivilRegistryReport,
    timestamp: DateTime<Utc>,
) -> AggregatedReport {
    let final_score = final_score(credit, civil);
    let credit_rating = rating_for_score(final_score);

    tracing::debug!(
        "Aggregated report for {}: score={}, rating={}",
        pinfl,
        final_score,
        credit_rating
    );

    AggregatedReport {
        pinfl: pinfl.as_str().to_string(),
        timestamp,
        final_score,
        credit_rating,
        status: civil.employment.status.clone(),
        summary: ReportSummary {
            credit_history: credit.credit_history.clone(),
            employment: civil.employment.clone(),
            assets: civil.assets.clone(),
            taxes: civil.taxes.clone(),
            total_debt: credit.total_debt,
            overdue_debt: credit.overdue_debt,
        },
        recommendations: recommendations(final_score, credit, civil),
    }
}

/// Composite score capped at [`MAX_SCORE`]. Negative results are kept as-is.
pub fn final_score(credit: &CreditHistoryReport, civil: &CivilRegistryReport) -> i64 {
    // The bureau reports 0 for subjects it has not scored
    let base_score = credit
        .credit_score
        .filter(|score| *score != 0)
        .unwrap_or(DEFAULT_BASE_SCORE);

    let employment_bonus = if civil.employment.is_employed() {
        EMPLOYMENT_BONUS
    } else {
        0
    };
    let tax_bonus = if civil.taxes.has_no_arrears() {
        NO_TAX_ARREARS_BONUS
    } else {
        TAX_ARREARS_PENALTY
    };
    let asset_bonus = if civil.assets.property {
        PROPERTY_BONUS
    } else {
        0
    };

    base_score
        .saturating_add(employment_bonus)
        .saturating_add(tax_bonus)
        .saturating_add(asset_bonus)
        .min(MAX_SCORE)
}

pub fn rating_for_score(score: i64) -> Rating {
    RATING_THRESHOLDS
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, rating)| *rating)
        .unwrap_or(Rating::C)
}

/// Band line first, then the overdue-debt line, then the property line.
pub fn recommendations(
    score: i64,
    credit: &CreditHistoryReport,
    civil: &CivilRegistryReport,
) -> Vec<String> {
    // Coarser than the rating tiers.
    let band = if score >= 800 {
        EXCELLENT_HISTORY
    } else if score >= 700 {
        GOOD_HISTORY
    } else {
        ROOM_TO_IMPROVE
    };

    let mut lines = vec![band.to_string()];

    if credit.overdue_debt > 0 {
        lines.push(REPAY_OVERDUE_DEBT.to_string());
    }

    if !civil.assets.property {
        lines.push(CONSIDER_PROPERTY.to_string());
    }

    lines
}
