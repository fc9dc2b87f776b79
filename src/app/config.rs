//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application
//! settings. Configuration is loaded from a TOML file, with `RUST_LOG`
//! taking priority over the configured log level so an operator can
//! override verbosity without editing the file.

use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueKind {
    Synthetic,
    Polymarket,
}

impl Default for VenueKind {
    fn default() -> Self {
        Self::Synthetic
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VenueConfig {
    pub kind: VenueKind,
    pub synthetic_seed: u64,
    pub synthetic_market_count: usize,
    pub gamma_base: Option<String>,
    pub clob_base: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            kind: VenueKind::Synthetic,
            synthetic_seed: 1,
            synthetic_market_count: 10,
            gamma_base: None,
            clob_base: None,
            request_timeout_secs: 10,
        }
    }
}

impl VenueConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "marketpulse.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub poll_interval_secs: u64,
    pub min_flush_interval_secs: u64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            min_flush_interval_secs: 30,
        }
    }
}

impl IngestionConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub fn min_flush_interval(&self) -> Duration {
        Duration::from_secs(self.min_flush_interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub rules_path: String,
    pub synonyms_path: Option<String>,
    pub eval_interval_secs: u64,
    pub breaker_trip_threshold: u32,
    pub breaker_window_secs: u64,
    pub breaker_cooldown_secs: u64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            rules_path: "rules.toml".to_string(),
            synonyms_path: None,
            eval_interval_secs: 10,
            breaker_trip_threshold: 5,
            breaker_window_secs: 60,
            breaker_cooldown_secs: 120,
        }
    }
}

impl RulesConfig {
    #[must_use]
    pub fn eval_interval(&self) -> Duration {
        Duration::from_secs(self.eval_interval_secs)
    }

    #[must_use]
    pub fn breaker_window(&self) -> Duration {
        Duration::from_secs(self.breaker_window_secs)
    }

    #[must_use]
    pub fn breaker_cooldown(&self) -> Duration {
        Duration::from_secs(self.breaker_cooldown_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionModeConfig {
    Manual,
    SemiAuto,
    Auto,
}

impl Default for ExecutionModeConfig {
    fn default() -> Self {
        Self::Manual
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub mode: ExecutionModeConfig,
    pub max_notional_per_intent: Decimal,
    pub max_open_intents: u32,
    pub max_daily_notional: Decimal,
    pub max_slippage_bps: Decimal,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionModeConfig::Manual,
            max_notional_per_intent: Decimal::new(500, 0),
            max_open_intents: 5,
            max_daily_notional: Decimal::new(5000, 0),
            max_slippage_bps: Decimal::new(50, 0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub dry_run: bool,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self { dry_run: true }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

impl LoggingConfig {
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));
        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

/// Main application configuration, aggregating every section the
/// orchestrator needs to wire the venue, pipelines, and store together.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub venue: VenueConfig,
    pub ingestion: IngestionConfig,
    pub rules: RulesConfig,
    pub policy: PolicyConfig,
    pub alerts: AlertsConfig,
}

impl Config {
    /// Parse configuration from TOML content and validate it.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        Self::parse_toml(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.policy.max_notional_per_intent <= Decimal::ZERO {
            return Err(Error::Config("policy.max_notional_per_intent must be greater than 0".to_string()));
        }
        if self.policy.max_daily_notional <= Decimal::ZERO {
            return Err(Error::Config("policy.max_daily_notional must be greater than 0".to_string()));
        }
        if self.policy.max_slippage_bps < Decimal::ZERO {
            return Err(Error::Config("policy.max_slippage_bps must be 0 or greater".to_string()));
        }
        if self.rules.breaker_trip_threshold == 0 {
            return Err(Error::Config("rules.breaker_trip_threshold must be greater than 0".to_string()));
        }
        if self.ingestion.poll_interval_secs == 0 {
            return Err(Error::Config("ingestion.poll_interval_secs must be greater than 0".to_string()));
        }
        if self.rules.eval_interval_secs == 0 {
            return Err(Error::Config("rules.eval_interval_secs must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_from_empty_document() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.database.path, "marketpulse.db");
        assert!(matches!(config.venue.kind, VenueKind::Synthetic));
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let toml = "[ingestion]\npoll_interval_secs = 0\n";
        assert!(Config::parse_toml(toml).is_err());
    }

    #[test]
    fn rejects_non_positive_notional_cap() {
        let toml = "[policy]\nmax_notional_per_intent = \"0\"\n";
        assert!(Config::parse_toml(toml).is_err());
    }

    #[test]
    fn parses_a_full_document() {
        let toml = r#"
            [database]
            path = "test.db"

            [venue]
            kind = "synthetic"
            synthetic_seed = 7
            synthetic_market_count = 3

            [ingestion]
            poll_interval_secs = 2

            [rules]
            rules_path = "rules.toml"
            eval_interval_secs = 5

            [policy]
            mode = "semi_auto"
            max_notional_per_intent = "100"
            max_open_intents = 3
            max_daily_notional = "1000"
            max_slippage_bps = "25"

            [alerts]
            dry_run = false
        "#;
        let config = Config::parse_toml(toml).unwrap();
        assert_eq!(config.database.path, "test.db");
        assert_eq!(config.venue.synthetic_seed, 7);
        assert!(!config.alerts.dry_run);
    }
}
