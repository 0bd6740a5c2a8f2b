use crate::errors::AppError;
use crate::models::AggregatedReport;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const REPORT_CONTENT_TYPE: &str = "application/json";
pub const REPORT_FILE_EXTENSION: &str = "json";

/// Report as written into the downloadable document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedReport<'a> {
    #[serde(flatten)]
    report: &'a AggregatedReport,
    generated_at: String,
    report_id: String,
}

/// Downloadable rendering of an aggregated report.
#[derive(Debug, Clone)]
pub struct ReportExport {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// `credit_score_report_<pinfl>.json`
pub fn export_file_name(pinfl: &str) -> String {
    format!("credit_score_report_{}.{}", pinfl, REPORT_FILE_EXTENSION)
}

/// Renders `report` as a pretty-printed JSON document stamped with the current time.
pub fn export(report: &AggregatedReport) -> Result<ReportExport, AppError> {
    export_at(report, Utc::now())
}

/// Renders `report` with an explicit export time.
///
/// Adds `generatedAt` (export time) and `reportId` (`SCORE_<unix millis>`)
/// next to the report fields. The report itself is not modified.
pub fn export_at(report: &AggregatedReport, now: DateTime<Utc>) -> Result<ReportExport, AppError> {
    let document = ExportedReport {
        report,
        generated_at: now.to_rfc3339(),
        report_id: format!("SCORE_{}", now.timestamp_millis()),
    };

    let bytes = serde_json::to_vec_pretty(&document)?;

    tracing::debug!(
        "Exported report {} for {} ({} bytes)",
        document.report_id,
        report.pinfl,
        bytes.len()
    );

    Ok(ReportExport {
        file_name: export_file_name(&report.pinfl),
        content_type: REPORT_CONTENT_TYPE,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_convention() {
        assert_eq!(
            export_file_name("12345678901234"),
            "credit_score_report_12345678901234.json"
        );
    }
}
