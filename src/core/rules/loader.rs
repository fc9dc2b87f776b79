//! Loads rule definitions from a declarative TOML file and supports
//! reload-on-change so an operator can add or retune a rule without a
//! restart.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Deserialize;

use crate::core::domain::{MarketId, Param, RuleDefinition, RuleId, RuleType};
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rule: Vec<RuleRow>,
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    id: String,
    #[serde(rename = "type")]
    rule_type: RuleType,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    market_scope: Vec<String>,
    #[serde(default)]
    params: BTreeMap<String, Param>,
    #[serde(default)]
    cooldown_secs: u64,
}

const fn default_enabled() -> bool {
    true
}

fn parse(contents: &str) -> Result<Vec<RuleDefinition>> {
    let file: RuleFile = toml::from_str(contents)?;
    Ok(file
        .rule
        .into_iter()
        .map(|row| {
            let mut def = RuleDefinition::new(RuleId::new(row.id), row.rule_type)
                .with_enabled(row.enabled)
                .with_market_scope(row.market_scope.into_iter().map(MarketId::new).collect())
                .with_cooldown_secs(row.cooldown_secs);
            for (key, value) in row.params {
                def = def.with_param(key, value);
            }
            def
        })
        .collect())
}

/// Watches a single TOML rule-definition file and reloads it when its
/// mtime advances.
pub struct RuleLoader {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl RuleLoader {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_modified: None,
        }
    }

    /// Load the file unconditionally, updating the tracked mtime.
    pub async fn load(&mut self) -> Result<Vec<RuleDefinition>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(Error::Io)?;
        self.last_modified = self.current_mtime().await;
        parse(&contents)
    }

    /// `true` if the file's mtime has advanced since the last [`load`].
    pub async fn needs_reload(&self) -> bool {
        match (self.current_mtime().await, self.last_modified) {
            (Some(current), Some(last)) => current > last,
            (Some(_), None) => true,
            _ => false,
        }
    }

    async fn current_mtime(&self) -> Option<SystemTime> {
        tokio::fs::metadata(&self.path).await.ok()?.modified().ok()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_a_minimal_rule() {
        let toml = r#"
            [[rule]]
            id = "r1"
            type = "sum_lt_1"
            cooldown_secs = 30

            [rule.params]
            threshold = "0.97"
        "#;
        let rules = parse(toml).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].rule_type(), RuleType::SumLt1);
        assert_eq!(rules[0].cooldown_secs(), 30);
        assert_eq!(rules[0].param_or("threshold", dec!(0)), dec!(0.97));
    }

    #[test]
    fn defaults_enabled_to_true_and_scope_to_empty() {
        let toml = r#"
            [[rule]]
            id = "r1"
            type = "spike_detect"
        "#;
        let rules = parse(toml).unwrap();
        assert!(rules[0].enabled());
        assert!(rules[0].market_scope().is_empty());
    }

    #[test]
    fn explicit_market_scope_is_preserved() {
        let toml = r#"
            [[rule]]
            id = "r1"
            type = "endgame_sweep"
            market_scope = ["m1", "m2"]
        "#;
        let rules = parse(toml).unwrap();
        assert_eq!(rules[0].market_scope().len(), 2);
    }

    #[tokio::test]
    async fn loader_reports_reload_needed_after_first_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        tokio::fs::write(&path, "[[rule]]\nid = \"r1\"\ntype = \"sum_lt_1\"\n")
            .await
            .unwrap();
        let mut loader = RuleLoader::new(&path);
        assert!(loader.needs_reload().await);
        let rules = loader.load().await.unwrap();
        assert_eq!(rules.len(), 1);
        assert!(!loader.needs_reload().await);
    }
}
