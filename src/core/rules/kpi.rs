//! Live KPI aggregation: an exponentially-weighted view of each rule's
//! signal rate, kept in memory between the daily rollups persisted via
//! [`crate::core::domain::RuleKpiDaily`].

use dashmap::DashMap;

use crate::core::domain::RuleId;

const DEFAULT_ALPHA: f64 = 0.2;

struct Ema {
    value: f64,
    initialized: bool,
}

/// Smooths a per-cycle signal count into an exponential moving average
/// per rule, so a single noisy cycle doesn't dominate an operator's view
/// of how "hot" a rule currently is.
pub struct KpiAggregator {
    alpha: f64,
    rates: DashMap<RuleId, Ema>,
}

impl KpiAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_alpha(DEFAULT_ALPHA)
    }

    #[must_use]
    pub fn with_alpha(alpha: f64) -> Self {
        Self {
            alpha,
            rates: DashMap::new(),
        }
    }

    /// Fold in this cycle's signal count for `rule_id`.
    pub fn observe(&self, rule_id: &RuleId, signals_this_cycle: u64) {
        let mut entry = self.rates.entry(rule_id.clone()).or_insert(Ema {
            value: 0.0,
            initialized: false,
        });
        let sample = signals_this_cycle as f64;
        if entry.initialized {
            entry.value = self.alpha * sample + (1.0 - self.alpha) * entry.value;
        } else {
            entry.value = sample;
            entry.initialized = true;
        }
    }

    /// Current smoothed signal rate for `rule_id`, `0.0` if never
    /// observed.
    #[must_use]
    pub fn rate(&self, rule_id: &RuleId) -> f64 {
        self.rates.get(rule_id).map_or(0.0, |e| e.value)
    }
}

impl Default for KpiAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_rule_has_zero_rate() {
        let agg = KpiAggregator::new();
        assert_eq!(agg.rate(&RuleId::new("r1")), 0.0);
    }

    #[test]
    fn first_observation_seeds_the_average() {
        let agg = KpiAggregator::new();
        agg.observe(&RuleId::new("r1"), 4);
        assert_eq!(agg.rate(&RuleId::new("r1")), 4.0);
    }

    #[test]
    fn subsequent_observations_smooth_toward_new_samples() {
        let agg = KpiAggregator::with_alpha(0.5);
        agg.observe(&RuleId::new("r1"), 4);
        agg.observe(&RuleId::new("r1"), 0);
        assert_eq!(agg.rate(&RuleId::new("r1")), 2.0);
    }
}
