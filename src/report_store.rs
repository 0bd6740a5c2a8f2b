use crate::cache_validator::ValidatedCacheEntry;
use crate::errors::{AppError, ResultExt};
use crate::identity::Pinfl;
use crate::models::AggregatedReport;
use moka::future::Cache;
use sqlx::types::Json;
use sqlx::PgPool;

/// Latest aggregated report per subject.
///
/// Writes are keyed by PINFL and the last write wins. Both backends apply a
/// single write atomically, so concurrent requests for different subjects
/// never interfere.
#[derive(Clone)]
pub enum ReportStore {
    InMemory(InMemoryReportStore),
    Postgres(PostgresReportStore),
}

impl ReportStore {
    pub fn in_memory() -> Self {
        ReportStore::InMemory(InMemoryReportStore::new())
    }

    pub fn postgres(pool: PgPool) -> Self {
        ReportStore::Postgres(PostgresReportStore::new(pool))
    }

    /// Stores `report`, replacing any earlier report for the same subject.
    pub async fn store(&self, report: &AggregatedReport) -> Result<(), AppError> {
        match self {
            ReportStore::InMemory(store) => store.store(report).await,
            ReportStore::Postgres(store) => store.store(report).await,
        }
    }

    /// Returns the stored report for `pinfl`.
    ///
    /// # Errors
    ///
    /// * `AppError::NotFound` - No report was stored for this subject.
    pub async fn retrieve(&self, pinfl: &Pinfl) -> Result<AggregatedReport, AppError> {
        let found = match self {
            ReportStore::InMemory(store) => store.retrieve(pinfl).await?,
            ReportStore::Postgres(store) => store.retrieve(pinfl).await?,
        };

        found.ok_or_else(|| AppError::NotFound(format!("Report for PINFL {} not found", pinfl)))
    }
}

/// In-process store backed by an unbounded moka cache.
///
/// No size cap is set, so moka never evicts or refuses an entry on its own.
/// Entries are sealed with a checksum; an entry that fails validation is
/// evicted and reads as missing.
#[derive(Clone)]
pub struct InMemoryReportStore {
    cache: Cache<String, ValidatedCacheEntry>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().build(),
        }
    }

    async fn store(&self, report: &AggregatedReport) -> Result<(), AppError> {
        let entry = ValidatedCacheEntry::seal(report)?;
        self.cache.insert(report.pinfl.clone(), entry).await;
        tracing::debug!("Stored report for {} in memory", report.pinfl);
        Ok(())
    }

    async fn retrieve(&self, pinfl: &Pinfl) -> Result<Option<AggregatedReport>, AppError> {
        let Some(entry) = self.cache.get(pinfl.as_str()).await else {
            return Ok(None);
        };

        match entry.open::<AggregatedReport>() {
            Some(report) => Ok(Some(report)),
            None => {
                tracing::warn!("Evicting corrupted report entry for {}", pinfl);
                self.cache.invalidate(pinfl.as_str()).await;
                Ok(None)
            }
        }
    }
}

impl Default for InMemoryReportStore {
    fn default() -> Self {
        Self::new()
    }
}

/// PostgreSQL store, one row per subject in `credit_reports`.
#[derive(Clone)]
pub struct PostgresReportStore {
    pool: PgPool,
}

impl PostgresReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn store(&self, report: &AggregatedReport) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO credit_reports (pinfl, report, final_score, credit_rating, generated_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (pinfl) DO UPDATE SET
                report = EXCLUDED.report,
                final_score = EXCLUDED.final_score,
                credit_rating = EXCLUDED.credit_rating,
                generated_at = EXCLUDED.generated_at,
                updated_at = NOW()
            "#,
        )
        .bind(&report.pinfl)
        .bind(Json(report))
        .bind(report.final_score)
        .bind(report.credit_rating.as_str())
        .bind(report.timestamp)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to store report for {}", report.pinfl))?;

        tracing::info!("✓ Stored report for {}", report.pinfl);
        Ok(())
    }

    async fn retrieve(&self, pinfl: &Pinfl) -> Result<Option<AggregatedReport>, AppError> {
        let row: Option<Json<AggregatedReport>> =
            sqlx::query_scalar("SELECT report FROM credit_reports WHERE pinfl = $1")
                .bind(pinfl.as_str())
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Failed to load report for {}", pinfl))?;

        Ok(row.map(|Json(report)| report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assets, Employment, Rating, ReportSummary, TaxStatus};
    use chrono::{TimeZone, Utc};

    fn report(pinfl: &str, final_score: i64) -> AggregatedReport {
        AggregatedReport {
            pinfl: pinfl.to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap(),
            final_score,
            credit_rating: Rating::B,
            status: "Трудоустроен".to_string(),
            summary: ReportSummary {
                credit_history: vec![],
                employment: Employment {
                    status: "Трудоустроен".to_string(),
                    company: "Acme".to_string(),
                    position: "Engineer".to_string(),
                    salary: 15_000_000,
                },
                assets: Assets {
                    property: false,
                    vehicles: 0,
                    bank_accounts: 1,
                },
                taxes: TaxStatus {
                    status: "Без задолженности".to_string(),
                    last_payment: None,
                },
                total_debt: 0,
                overdue_debt: 0,
            },
            recommendations: vec!["line".to_string()],
        }
    }

    #[tokio::test]
    async fn test_store_then_retrieve() {
        let store = ReportStore::in_memory();
        let original = report("12345678901234", 660);

        store.store(&original).await.unwrap();
        let pinfl = Pinfl::parse("12345678901234").unwrap();

        assert_eq!(store.retrieve(&pinfl).await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_missing_report_is_not_found() {
        let store = ReportStore::in_memory();
        let pinfl = Pinfl::parse("00000000000000").unwrap();

        let err = store.retrieve(&pinfl).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = ReportStore::in_memory();
        let pinfl = Pinfl::parse("12345678901234").unwrap();

        store.store(&report("12345678901234", 660)).await.unwrap();
        store.store(&report("12345678901234", 710)).await.unwrap();

        assert_eq!(store.retrieve(&pinfl).await.unwrap().final_score, 710);
    }

    #[tokio::test]
    async fn test_subjects_are_isolated() {
        let store = ReportStore::in_memory();

        store.store(&report("11111111111111", 600)).await.unwrap();
        store.store(&report("22222222222222", 800)).await.unwrap();

        let first = Pinfl::parse("11111111111111").unwrap();
        let second = Pinfl::parse("22222222222222").unwrap();
        assert_eq!(store.retrieve(&first).await.unwrap().final_score, 600);
        assert_eq!(store.retrieve(&second).await.unwrap().final_score, 800);
    }

    #[tokio::test]
    async fn test_every_stored_subject_stays_retrievable() {
        let store = ReportStore::in_memory();
        let pinfls: Vec<String> = (0..2_000u64).map(|n| format!("{:014}", n)).collect();

        // Hot reads on the first subject must not push later subjects out
        store.store(&report(&pinfls[0], 805)).await.unwrap();
        let hot = Pinfl::parse(&pinfls[0]).unwrap();
        for _ in 0..50 {
            store.retrieve(&hot).await.unwrap();
        }

        for (score, pinfl) in (600..).zip(&pinfls[1..]) {
            store.store(&report(pinfl, score)).await.unwrap();
        }

        for (score, pinfl) in (600..).zip(&pinfls[1..]) {
            let pinfl = Pinfl::parse(pinfl).unwrap();
            assert_eq!(store.retrieve(&pinfl).await.unwrap().final_score, score);
        }
        assert_eq!(store.retrieve(&hot).await.unwrap().final_score, 805);
    }

    #[tokio::test]
    async fn test_corrupted_entry_is_evicted() {
        let memory = InMemoryReportStore::new();
        let original = report("12345678901234", 660);
        memory.store(&original).await.unwrap();

        let mut entry = memory.cache.get("12345678901234").await.unwrap();
        entry.data = entry.data.replace("660", "900");
        memory.cache.insert("12345678901234".to_string(), entry).await;

        let store = ReportStore::InMemory(memory.clone());
        let pinfl = Pinfl::parse("12345678901234").unwrap();

        assert!(matches!(
            store.retrieve(&pinfl).await,
            Err(AppError::NotFound(_))
        ));
        assert!(memory.cache.get("12345678901234").await.is_none());
    }
}
