use crate::handlers;
use crate::models::{
    AggregatedReport, Assets, CivilRegistryReport, CreditHistoryEntry, CreditHistoryReport,
    Employment, Rating, ReportRequest, ReportSource, ReportSummary, TaxStatus,
};
use utoipa::OpenApi;

/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Credit Score API",
        description = "Aggregates KATM and E-GOV reports into a credit score"
    ),
    paths(
        handlers::health,
        handlers::create_report,
        handlers::get_report,
        handlers::export_report
    ),
    components(schemas(
        ReportRequest,
        AggregatedReport,
        ReportSummary,
        Rating,
        ReportSource,
        CreditHistoryReport,
        CreditHistoryEntry,
        CivilRegistryReport,
        Employment,
        Assets,
        TaxStatus
    )),
    tags(
        (name = "reports", description = "Report aggregation, retrieval and export"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_report_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| p.as_str() == "/api/v1/reports"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/v1/reports/{pinfl}"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/v1/reports/{pinfl}/export"));
    }
}
