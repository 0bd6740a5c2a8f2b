use crate::config::Config;
use crate::errors::AppError;
use crate::identity::IdentityReference;
use crate::models::{AggregatedReport, CivilRegistryReport, CreditHistoryReport, ReportSource};
use crate::scoring;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

/// Why a single source request failed.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub source: ReportSource,
    pub message: String,
}

/// HTTP client for one report source.
///
/// Every request carries the subject's bearer credential and is bounded by
/// the client-wide timeout.
#[derive(Clone)]
pub struct SourceClient {
    client: Client,
    base_url: String,
    path: &'static str,
    source: ReportSource,
}

impl SourceClient {
    /// Creates a client for `source` rooted at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `source` - Which provider this client talks to.
    /// * `base_url` - Provider base URL without trailing slash.
    /// * `timeout` - Upper bound for a whole request, body included.
    pub fn new(source: ReportSource, base_url: String, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AppError::InternalError(format!("Failed to create {} client: {}", source, e))
        })?;

        let path = match source {
            ReportSource::Katm => "credit-report",
            ReportSource::Egov => "citizen-data",
        };

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            path,
            source,
        })
    }

    pub fn source(&self) -> ReportSource {
        self.source
    }

    /// Requests the source report for the referenced subject.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        identity: &IdentityReference,
    ) -> Result<T, SourceFailure> {
        let url = format!("{}/{}", self.base_url, self.path);
        tracing::info!(
            "{}: Requesting report for PINFL {}",
            self.source,
            identity.pinfl()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(identity.access_token())
            .json(&json!({ "pinfl": identity.pinfl().as_str() }))
            .send()
            .await
            .map_err(|e| self.failure(describe_transport_error(&e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(self.failure(format!("returned status {}: {}", status, error_text)));
        }

        let report: T = response
            .json()
            .await
            .map_err(|e| self.failure(format!("malformed response: {}", e)))?;

        tracing::info!("{}: ✓ Report received", self.source);
        Ok(report)
    }

    fn failure(&self, message: String) -> SourceFailure {
        tracing::warn!("{}: request failed: {}", self.source, message);
        SourceFailure {
            source: self.source,
            message,
        }
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else {
        format!("request failed: {}", err)
    }
}

/// Fetches both source reports for a subject.
///
/// Holds no mutable state; every call is independent.
#[derive(Clone)]
pub struct ReportFetcher {
    katm: SourceClient,
    egov: SourceClient,
}

impl ReportFetcher {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Self::with_endpoints(
            config.katm_base_url.clone(),
            config.egov_base_url.clone(),
            config.source_timeout(),
        )
    }

    pub fn with_endpoints(
        katm_base_url: String,
        egov_base_url: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        Ok(Self {
            katm: SourceClient::new(ReportSource::Katm, katm_base_url, timeout)?,
            egov: SourceClient::new(ReportSource::Egov, egov_base_url, timeout)?,
        })
    }

    /// Requests both reports concurrently and waits for both.
    ///
    /// # Errors
    ///
    /// * `AppError::SourceUnavailable` - Listing every source that failed. A
    ///   report that did arrive is dropped.
    pub async fn fetch_all(
        &self,
        identity: &IdentityReference,
    ) -> Result<(CreditHistoryReport, CivilRegistryReport), AppError> {
        let (credit, civil) = tokio::join!(
            self.katm.fetch::<CreditHistoryReport>(identity),
            self.egov.fetch::<CivilRegistryReport>(identity)
        );

        match (credit, civil) {
            (Ok(credit), Ok(civil)) => Ok((credit, civil)),
            (credit, civil) => {
                if credit.is_ok() || civil.is_ok() {
                    tracing::warn!("Discarding the report that did arrive: other source failed");
                }
                let failures: Vec<SourceFailure> =
                    [credit.err(), civil.err()].into_iter().flatten().collect();
                Err(source_unavailable(failures))
            }
        }
    }
}

fn source_unavailable(failures: Vec<SourceFailure>) -> AppError {
    let message = failures
        .iter()
        .map(|f| format!("{} {}", f.source, f.message))
        .collect::<Vec<_>>()
        .join("; ");

    AppError::SourceUnavailable {
        sources: failures.into_iter().map(|f| f.source).collect(),
        message,
    }
}

/// Fetches both source reports and aggregates them.
///
/// The single entry point used after identity verification. Nothing is
/// stored here; persisting the result is the caller's decision.
pub async fn fetch_all_reports(
    fetcher: &ReportFetcher,
    identity: &IdentityReference,
) -> Result<AggregatedReport, AppError> {
    let span = tracing::info_span!(
        "fetch_all_reports",
        request_id = %Uuid::new_v4(),
        pinfl = %identity.pinfl()
    );

    async {
        let (credit, civil) = fetcher.fetch_all(identity).await?;
        let report = scoring::aggregate(identity.pinfl(), &credit, &civil);
        tracing::info!(
            "✓ Report aggregated: score={}, rating={}",
            report.final_score,
            report.credit_rating
        );
        Ok::<_, AppError>(report)
    }
    .instrument(span)
    .await
}
