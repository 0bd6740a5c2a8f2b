use crate::errors::AppError;
use crate::export;
use crate::identity::{IdentityReference, Pinfl};
use crate::models::{AggregatedReport, ReportRequest};
use crate::report_store::ReportStore;
use crate::services::{self, ReportFetcher};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clients for both report sources.
    pub fetcher: ReportFetcher,
    /// Latest aggregated report per subject.
    pub store: ReportStore,
}

/// Report routes, without state and without rate limiting.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/reports", post(create_report))
        .route("/api/v1/reports/:pinfl", get(get_report))
        .route("/api/v1/reports/:pinfl/export", get(export_report))
}

/// Health check endpoint.
///
/// Returns the service status, version, and which report store is active.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    let store = match state.store {
        ReportStore::InMemory(_) => "memory",
        ReportStore::Postgres(_) => "postgres",
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "credit-score-api",
            "version": env!("CARGO_PKG_VERSION"),
            "store": store
        })),
    )
}

/// POST /api/v1/reports
///
/// Fetches both source reports for the verified subject, aggregates them,
/// stores the result and returns it. Nothing is stored when a source fails.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `payload` - Access token and PINFL from the identity provider.
///
/// # Returns
///
/// * `Result<Json<AggregatedReport>, AppError>` - The aggregated report or an error.
#[utoipa::path(
    post,
    path = "/api/v1/reports",
    tag = "reports",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Report aggregated and stored", body = AggregatedReport),
        (status = 400, description = "Malformed body, malformed PINFL or empty access token"),
        (status = 502, description = "A report source failed or timed out")
    )
)]
pub async fn create_report(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<AggregatedReport>, AppError> {
    let Json(payload) = payload?;
    let identity = IdentityReference::new(&payload.access_token, &payload.pinfl)?;
    tracing::info!("POST /reports - PINFL {}", identity.pinfl());

    let report = services::fetch_all_reports(&state.fetcher, &identity).await?;
    state.store.store(&report).await?;

    Ok(Json(report))
}

/// GET /api/v1/reports/:pinfl
///
/// Returns the latest stored report for a subject.
#[utoipa::path(
    get,
    path = "/api/v1/reports/{pinfl}",
    tag = "reports",
    params(("pinfl" = String, Path, description = "14-digit PINFL")),
    responses(
        (status = 200, description = "Stored report", body = AggregatedReport),
        (status = 400, description = "Malformed PINFL"),
        (status = 404, description = "No report stored for this PINFL")
    )
)]
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(pinfl): Path<String>,
) -> Result<Json<AggregatedReport>, AppError> {
    let pinfl = Pinfl::parse(&pinfl)?;
    tracing::info!("GET /reports/{}", pinfl);

    let report = state.store.retrieve(&pinfl).await?;
    Ok(Json(report))
}

/// GET /api/v1/reports/:pinfl/export
///
/// Downloads the stored report as `credit_score_report_<pinfl>.json`.
#[utoipa::path(
    get,
    path = "/api/v1/reports/{pinfl}/export",
    tag = "reports",
    params(("pinfl" = String, Path, description = "14-digit PINFL")),
    responses(
        (status = 200, description = "JSON attachment"),
        (status = 400, description = "Malformed PINFL"),
        (status = 404, description = "No report stored for this PINFL")
    )
)]
pub async fn export_report(
    State(state): State<Arc<AppState>>,
    Path(pinfl): Path<String>,
) -> Result<Response, AppError> {
    let pinfl = Pinfl::parse(&pinfl)?;
    tracing::info!("GET /reports/{}/export", pinfl);

    let report = state.store.retrieve(&pinfl).await?;
    let artifact = export::export(&report)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", artifact.file_name),
            ),
        ],
        artifact.bytes,
    )
        .into_response())
}
