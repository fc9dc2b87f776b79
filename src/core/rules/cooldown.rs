//! Per-(rule, market) cooldown so a persistent condition doesn't re-fire
//! every evaluation cycle.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::core::domain::{MarketId, RuleId};

#[derive(Default)]
pub struct CooldownTracker {
    last_fired: DashMap<(RuleId, MarketId), Instant>,
}

impl CooldownTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if `(rule_id, market_id)` is still within its cooldown
    /// window and should not fire again yet.
    #[must_use]
    pub fn is_cooling_down(&self, rule_id: &RuleId, market_id: &MarketId, cooldown: Duration) -> bool {
        let key = (rule_id.clone(), market_id.clone());
        self.last_fired
            .get(&key)
            .is_some_and(|t| t.elapsed() < cooldown)
    }

    /// Record that `(rule_id, market_id)` just fired, starting a fresh
    /// cooldown window.
    pub fn record_fired(&self, rule_id: &RuleId, market_id: &MarketId) {
        self.last_fired
            .insert((rule_id.clone(), market_id.clone()), Instant::now());
    }
}
