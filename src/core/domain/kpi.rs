//! Daily rollups of rule performance.

use chrono::NaiveDate;

use super::ids::RuleId;
use super::money::Notional;

/// One day's aggregate outcome for a single rule: how many signals it
/// fired, how many became intents, and the notional those intents moved.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleKpiDaily {
    rule_id: RuleId,
    day: NaiveDate,
    signals_emitted: u64,
    intents_created: u64,
    intents_filled: u64,
    notional_filled: Notional,
}

impl RuleKpiDaily {
    #[must_use]
    pub fn new(rule_id: RuleId, day: NaiveDate) -> Self {
        Self {
            rule_id,
            day,
            signals_emitted: 0,
            intents_created: 0,
            intents_filled: 0,
            notional_filled: Notional::ZERO,
        }
    }

    /// Reconstruct a rollup from already-aggregated totals, as read back
    /// from the store.
    #[must_use]
    pub fn from_totals(
        rule_id: RuleId,
        day: NaiveDate,
        signals_emitted: u64,
        intents_created: u64,
        intents_filled: u64,
        notional_filled: Notional,
    ) -> Self {
        Self {
            rule_id,
            day,
            signals_emitted,
            intents_created,
            intents_filled,
            notional_filled,
        }
    }

    #[must_use]
    pub const fn rule_id(&self) -> &RuleId {
        &self.rule_id
    }

    #[must_use]
    pub const fn day(&self) -> NaiveDate {
        self.day
    }

    #[must_use]
    pub const fn signals_emitted(&self) -> u64 {
        self.signals_emitted
    }

    #[must_use]
    pub const fn intents_created(&self) -> u64 {
        self.intents_created
    }

    #[must_use]
    pub const fn intents_filled(&self) -> u64 {
        self.intents_filled
    }

    #[must_use]
    pub const fn notional_filled(&self) -> Notional {
        self.notional_filled
    }

    pub fn record_signal(&mut self) {
        self.signals_emitted += 1;
    }

    pub fn record_intent_created(&mut self) {
        self.intents_created += 1;
    }

    pub fn record_intent_filled(&mut self, notional: Notional) {
        self.intents_filled += 1;
        self.notional_filled += notional;
    }

    /// Fraction of emitted signals that became intents, `0.0` when no
    /// signals fired yet.
    #[must_use]
    pub fn conversion_rate(&self) -> f64 {
        if self.signals_emitted == 0 {
            0.0
        } else {
            self.intents_created as f64 / self.signals_emitted as f64
        }
    }
}
