//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use acquisitions_types::EngineMode;

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// `None` means a per-process random secret.
    pub session_secret: Option<String>,
    pub session_ttl: Duration,
    /// Mark session cookies `Secure` (`APP_ENV=production`).
    pub secure_cookies: bool,
    /// Remote decision service; `None` selects the in-process engine.
    pub engine_url: Option<String>,
    pub engine_key: Option<String>,
    pub engine_mode: EngineMode,
    /// OTLP collector; telemetry export is off when unset.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let port = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()?;

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let session_ttl = match var("SESSION_TTL_SECS") {
            Some(secs) => Duration::from_secs(secs.parse()?),
            None => acquisitions_hex::session::DEFAULT_TTL,
        };

        let engine_mode = match var("DECISION_ENGINE_MODE") {
            Some(mode) => mode.parse().map_err(|e: String| anyhow::anyhow!(e))?,
            None => EngineMode::Live,
        };

        Ok(Self {
            port,
            database_url,
            session_secret: non_empty("SESSION_SECRET"),
            session_ttl,
            secure_cookies: var("APP_ENV").is_some_and(|v| v == "production"),
            engine_url: non_empty("DECISION_ENGINE_URL"),
            engine_key: non_empty("DECISION_ENGINE_KEY"),
            engine_mode,
            otlp_endpoint: non_empty("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}
