//! Command-line interface definitions.

pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// MarketPulse-X - prediction-market monitoring, rule evaluation, and
/// risk-gated intent suggestion.
#[derive(Parser, Debug)]
#[command(name = "marketpulse-x")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// Override log level (debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run ingestion, rule evaluation, and the intent pipeline until stopped
    Run,

    /// Show markets, rules, and open intents currently known to the store
    Status,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Generate a template config file
    Init(ConfigInitArgs),
    /// Validate a config file without running
    Validate,
}

#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Output path for the generated config file
    #[arg(default_value = "config.toml")]
    pub path: PathBuf,

    /// Overwrite if the file already exists
    #[arg(long)]
    pub force: bool,
}

pub const TEMPLATE_CONFIG: &str = r#"[database]
path = "marketpulse.db"

[logging]
level = "info"
format = "pretty"

[venue]
kind = "synthetic"
synthetic_seed = 1
synthetic_market_count = 10

[ingestion]
poll_interval_secs = 5

[rules]
rules_path = "rules.toml"
eval_interval_secs = 10
breaker_trip_threshold = 5
breaker_cooldown_secs = 120

[policy]
mode = "manual"
max_notional_per_intent = "500"
max_open_intents = 5
max_daily_notional = "5000"
max_slippage_bps = "50"

[alerts]
dry_run = true
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Config;

    #[test]
    fn template_config_parses_and_validates() {
        Config::parse_toml(TEMPLATE_CONFIG).unwrap();
    }

    #[test]
    fn cli_parses_run_subcommand() {
        let cli = Cli::parse_from(["marketpulse-x", "run"]);
        assert!(matches!(cli.command, Commands::Run));
    }
}
