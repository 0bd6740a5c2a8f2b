use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Employment status value the civil registry reports for employed subjects.
pub const EMPLOYED_STATUS: &str = "Трудоустроен";

/// Tax status value the civil registry reports when nothing is owed.
pub const NO_TAX_ARREARS_STATUS: &str = "Без задолженности";

// ============ Report Sources ============

/// External provider a source report comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ReportSource {
    /// Credit-history bureau.
    #[serde(rename = "KATM")]
    Katm,
    /// Civil registry.
    #[serde(rename = "E-GOV")]
    Egov,
}

impl ReportSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportSource::Katm => "KATM",
            ReportSource::Egov => "E-GOV",
        }
    }
}

impl fmt::Display for ReportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One loan in the credit-history report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditHistoryEntry {
    /// Date the loan was issued.
    pub date: NaiveDate,
    /// Loan amount.
    pub amount: i64,
    /// Loan status as reported by the bureau (e.g. "Закрыт", "Активный").
    pub status: String,
}

/// Raw report from the credit-history source (KATM).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditHistoryReport {
    /// Source tag.
    pub source: String,
    /// Bureau's own rating label.
    pub credit_rating: String,
    /// Loans, in the order the bureau returned them.
    pub credit_history: Vec<CreditHistoryEntry>,
    /// Total outstanding debt.
    pub total_debt: i64,
    /// Overdue portion of the debt.
    pub overdue_debt: i64,
    /// Bureau score, nominally 300-900.
    #[serde(default)]
    pub credit_score: Option<i64>,
}

/// Employment record from the civil registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employment {
    pub status: String,
    pub company: String,
    pub position: String,
    pub salary: i64,
}

impl Employment {
    pub fn is_employed(&self) -> bool {
        self.status == EMPLOYED_STATUS
    }
}

/// Asset summary from the civil registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assets {
    /// Whether the subject owns real estate.
    pub property: bool,
    pub vehicles: u32,
    pub bank_accounts: u32,
}

/// Tax standing from the civil registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxStatus {
    pub status: String,
    #[serde(default)]
    pub last_payment: Option<NaiveDate>,
}

impl TaxStatus {
    pub fn has_no_arrears(&self) -> bool {
        self.status == NO_TAX_ARREARS_STATUS
    }
}

/// Raw report from the civil-registry source (E-GOV).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CivilRegistryReport {
    /// Source tag.
    pub source: String,
    pub employment: Employment,
    pub assets: Assets,
    pub taxes: TaxStatus,
}

// ============ Aggregated Report ============

/// Rating tier derived from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Rating {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::APlus => "A+",
            Rating::A => "A",
            Rating::BPlus => "B+",
            Rating::B => "B",
            Rating::CPlus => "C+",
            Rating::C => "C",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source fields carried into the aggregated report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub credit_history: Vec<CreditHistoryEntry>,
    pub employment: Employment,
    pub assets: Assets,
    pub taxes: TaxStatus,
    pub total_debt: i64,
    pub overdue_debt: i64,
}

/// Combined score, rating and recommendations for one subject.
///
/// Created once per successful aggregation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedReport {
    /// Subject identifier (14-digit PINFL).
    pub pinfl: String,
    /// Aggregation time.
    pub timestamp: DateTime<Utc>,
    /// Composite score, never above 900.
    pub final_score: i64,
    pub credit_rating: Rating,
    /// Employment status echoed from the civil registry.
    pub status: String,
    pub summary: ReportSummary,
    /// Narrative lines, band line first.
    pub recommendations: Vec<String>,
}

// ============ API Models ============

/// Body of `POST /api/v1/reports`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// Credential issued by the identity provider.
    pub access_token: String,
    /// 14-digit subject identifier.
    pub pinfl: String,
}
