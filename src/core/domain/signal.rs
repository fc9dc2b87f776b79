//! Signals emitted by the rule evaluation engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{MarketId, OptionId, RuleId, SignalId};
use super::money::{Notional, Price, Volume};
use super::rule_def::RuleType;

/// Severity of an emitted signal, used for alert routing and for gating
/// automatic intent creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    P3,
    P2,
    P1,
}

/// A snapshot of one side of a book at signal time, carried for audit and
/// for display in alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub option_id: OptionId,
    pub bid: Option<Price>,
    pub ask: Option<Price>,
}

/// One leg of a suggested trade: buy or sell a fixed notional of a single
/// option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLeg {
    pub option_id: OptionId,
    pub side: super::intent::Side,
    pub price: Price,
    pub size: Volume,
}

/// A suggested trade plan attached to a signal. Always non-empty when
/// present — an empty plan is a domain error, never constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedTrade {
    pub legs: Vec<TradeLeg>,
    pub expected_notional: Notional,
}

/// Rule-specific evidence carried alongside a [`Signal`]. Each variant
/// mirrors the parameters the corresponding predicate actually measured,
/// so an operator reading an alert can see the numbers that triggered it
/// without re-deriving them from raw ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule_type", rename_all = "snake_case")]
pub enum SignalPayload {
    #[serde(rename = "sum_lt_1")]
    SumLt1 {
        sum: Price,
        threshold: Price,
        books: Vec<BookSnapshot>,
    },
    SpikeDetect {
        option_id: OptionId,
        delta: Price,
        window_secs: u64,
    },
    EndgameSweep {
        option_id: OptionId,
        hours_to_close: f64,
        price: Price,
    },
    SynonymMisprice {
        group_id: super::ids::GroupId,
        members: Vec<(MarketId, OptionId, Price)>,
        spread: Price,
    },
    DutchBookDetect {
        legs: Vec<(OptionId, Price)>,
        guaranteed_profit: Notional,
    },
    CrossMarketMisprice {
        left: (MarketId, OptionId, Price),
        right: (MarketId, OptionId, Price),
        spread: Price,
    },
    TrendBreakout {
        option_id: OptionId,
        from_price: Price,
        to_price: Price,
        window_secs: u64,
    },
    /// Fallback for rule types without a dedicated payload shape, or for
    /// forward-compatibility with data read back from the store.
    Generic {
        rule_type: RuleType,
        measurements: std::collections::BTreeMap<String, Decimal>,
    },
}

/// A detected condition emitted by the rule engine for a specific market.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    signal_id: SignalId,
    rule_id: RuleId,
    rule_type: RuleType,
    market_id: MarketId,
    level: Level,
    edge_score: Decimal,
    payload: SignalPayload,
    suggested_trade: Option<SuggestedTrade>,
    emitted_at: DateTime<Utc>,
}

impl Signal {
    #[must_use]
    pub fn new(
        signal_id: SignalId,
        rule_id: RuleId,
        rule_type: RuleType,
        market_id: MarketId,
        level: Level,
        payload: SignalPayload,
        emitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            signal_id,
            rule_id,
            rule_type,
            market_id,
            level,
            edge_score: Decimal::ZERO,
            payload,
            suggested_trade: None,
            emitted_at,
        }
    }

    #[must_use]
    pub fn with_suggested_trade(mut self, trade: Option<SuggestedTrade>) -> Self {
        self.suggested_trade = trade;
        self
    }

    /// Each predicate clamps its own measurement into `[0, 1]` before
    /// attaching it here; this is the key signal consumers should rank
    /// and sort by.
    #[must_use]
    pub fn with_edge_score(mut self, edge_score: Decimal) -> Self {
        self.edge_score = edge_score;
        self
    }

    #[must_use]
    pub const fn signal_id(&self) -> &SignalId {
        &self.signal_id
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
    pub const fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub const fn edge_score(&self) -> Decimal {
        self.edge_score
    }

    /// Retained for back-compat with consumers that read `score` instead
    /// of `edge_score`; the two are the same value.
    #[must_use]
    pub const fn score(&self) -> Decimal {
        self.edge_score
    }

    #[must_use]
    pub const fn payload(&self) -> &SignalPayload {
        &self.payload
    }

    #[must_use]
    pub const fn suggested_trade(&self) -> Option<&SuggestedTrade> {
        self.suggested_trade.as_ref()
    }

    #[must_use]
    pub const fn emitted_at(&self) -> DateTime<Utc> {
        self.emitted_at
    }

    /// `true` for `Level::P1`/`Level::P2` signals, the only levels eligible
    /// for automatic intent creation.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        self.level >= Level::P2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn signal(level: Level) -> Signal {
        Signal::new(
            SignalId::new("s1"),
            RuleId::new("r1"),
            RuleType::SumLt1,
            MarketId::new("m1"),
            level,
            SignalPayload::SumLt1 {
                sum: dec!(0.9),
                threshold: dec!(0.97),
                books: vec![],
            },
            Utc::now(),
        )
    }

    #[test]
    fn levels_order_p1_highest() {
        assert!(Level::P1 > Level::P2);
        assert!(Level::P2 > Level::P3);
    }

    #[test]
    fn p2_and_p1_are_actionable_p3_is_not() {
        assert!(signal(Level::P1).is_actionable());
        assert!(signal(Level::P2).is_actionable());
        assert!(!signal(Level::P3).is_actionable());
    }
}
