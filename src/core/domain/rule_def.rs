//! Rule definitions: the declarative configuration that drives the rule
//! evaluation engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::RuleId;

/// The closed set of rule types the engine knows how to evaluate. Adding a
/// new rule type means adding a new predicate implementation and a new
/// variant here — there is no dynamic/plugin registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    #[serde(rename = "sum_lt_1")]
    SumLt1,
    SpikeDetect,
    EndgameSweep,
    SynonymMisprice,
    DutchBookDetect,
    CrossMarketMisprice,
    TrendBreakout,
}

impl RuleType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SumLt1 => "SUM_LT_1",
            Self::SpikeDetect => "SPIKE_DETECT",
            Self::EndgameSweep => "ENDGAME_SWEEP",
            Self::SynonymMisprice => "SYNONYM_MISPRICE",
            Self::DutchBookDetect => "DUTCH_BOOK_DETECT",
            Self::CrossMarketMisprice => "CROSS_MARKET_MISPRICE",
            Self::TrendBreakout => "TREND_BREAKOUT",
        }
    }
}

/// A single tunable parameter of a [`RuleDefinition`]. Stored as a decimal
/// so thresholds compare exactly against [`super::money::Price`] values.
pub type Param = Decimal;

/// A configured instance of a [`RuleType`], scoped to zero or more markets
/// and carrying its own threshold parameters and cooldown.
#[derive(Debug, Clone)]
pub struct RuleDefinition {
    rule_id: RuleId,
    rule_type: RuleType,
    enabled: bool,
    market_scope: Vec<super::ids::MarketId>,
    params: std::collections::BTreeMap<String, Param>,
    cooldown_secs: u64,
}

impl RuleDefinition {
    #[must_use]
    pub fn new(rule_id: RuleId, rule_type: RuleType) -> Self {
        Self {
            rule_id,
            rule_type,
            enabled: true,
            market_scope: Vec::new(),
            params: std::collections::BTreeMap::new(),
            cooldown_secs: 0,
        }
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_market_scope(mut self, scope: Vec<super::ids::MarketId>) -> Self {
        self.market_scope = scope;
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: Param) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_cooldown_secs(mut self, secs: u64) -> Self {
        self.cooldown_secs = secs;
        self
    }

    #[must_use]
    pub const fn rule_id(&self) -> &RuleId {
        &self.rule_id
    }

    #[must_use]
    pub const fn rule_type(&self) -> RuleType {
        self.rule_type
    }

    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn market_scope(&self) -> &[super::ids::MarketId] {
        &self.market_scope
    }

    #[must_use]
    pub const fn cooldown_secs(&self) -> u64 {
        self.cooldown_secs
    }

    #[must_use]
    pub const fn params(&self) -> &std::collections::BTreeMap<String, Param> {
        &self.params
    }

    /// Fetch a parameter, falling back to `default` when unset.
    #[must_use]
    pub fn param_or(&self, key: &str, default: Param) -> Param {
        self.params.get(key).copied().unwrap_or(default)
    }

    /// `true` if this rule applies to `market_id` — an empty scope means
    /// "all markets".
    #[must_use]
    pub fn applies_to_market(&self, market_id: &super::ids::MarketId) -> bool {
        self.market_scope.is_empty() || self.market_scope.contains(market_id)
    }
}
