//! Shared read-only context a [`super::predicate::Predicate`] evaluates
//! against.

use chrono::{DateTime, Utc};

use crate::core::domain::{Market, MarketId, RuleDefinition, SynonymGroup, Tick};
use crate::core::venue::BookCache;

/// Everything a predicate needs to decide whether a rule fires, for one
/// evaluation cycle. Built once per cycle by the rule engine and handed
/// by reference to every predicate in turn.
pub struct RuleContext<'a> {
    pub rule: &'a RuleDefinition,
    pub markets: &'a [Market],
    pub book_cache: &'a BookCache,
    pub synonym_groups: &'a [SynonymGroup],
    pub recent_ticks: &'a [Tick],
    pub now: DateTime<Utc>,
}

impl<'a> RuleContext<'a> {
    #[must_use]
    pub fn market(&self, market_id: &MarketId) -> Option<&'a Market> {
        self.markets.iter().find(|m| m.market_id() == market_id)
    }

    #[must_use]
    pub fn ticks_for_market(&self, market_id: &MarketId) -> Vec<&'a Tick> {
        self.recent_ticks
            .iter()
            .filter(|t| t.market_id() == market_id)
            .collect()
    }
}
