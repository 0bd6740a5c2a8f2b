use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub katm_base_url: String,
    pub egov_base_url: String,
    pub source_timeout_secs: u64,
    pub database_url: Option<String>, // In-memory store when unset
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            katm_base_url: std::env::var("KATM_BASE_URL")
                .map_err(|_| anyhow::anyhow!("KATM_BASE_URL environment variable required"))
                .and_then(|url| validate_base_url("KATM_BASE_URL", url))?,
            egov_base_url: std::env::var("EGOV_BASE_URL")
                .map_err(|_| anyhow::anyhow!("EGOV_BASE_URL environment variable required"))
                .and_then(|url| validate_base_url("EGOV_BASE_URL", url))?,
            source_timeout_secs: parse_positive(
                "SOURCE_TIMEOUT_SECS",
                std::env::var("SOURCE_TIMEOUT_SECS").ok(),
                10,
            )?,
            database_url: std::env::var("DATABASE_URL")
                .or_else(|_| std::env::var("DB_URL"))
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(validate_database_url)
                .transpose()?,
        };

        tracing::debug!("KATM Base URL: {}", config.katm_base_url);
        tracing::debug!("E-GOV Base URL: {}", config.egov_base_url);
        tracing::debug!("Source timeout: {}s", config.source_timeout_secs);
        match config.database_url {
            Some(ref url) => tracing::debug!("Database: {}", database_location(url)),
            None => tracing::info!("DATABASE_URL not set, reports are kept in memory"),
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Per-source request timeout.
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}

fn validate_base_url(name: &str, url: String) -> anyhow::Result<String> {
    if url.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", name);
    }
    let parsed =
        url::Url::parse(&url).map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(url.trim_end_matches('/').to_string())
}

fn validate_database_url(url: String) -> anyhow::Result<String> {
    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
    }
    Ok(url)
}

/// Scheme, host and port of a database URL, without credentials or path.
fn database_location(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let host = parsed
                .host_str()
                .filter(|h| !h.is_empty())
                .unwrap_or("localhost");
            match parsed.port() {
                Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
                None => format!("{}://{}", parsed.scheme(), host),
            }
        }
        Err(_) => "<unparseable>".to_string(),
    }
}

fn parse_positive(name: &str, raw: Option<String>, default: u64) -> anyhow::Result<u64> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => anyhow::bail!("{} must be a positive integer", name),
    }
}
