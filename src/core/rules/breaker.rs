//! Circuit breaker guarding the rule engine against a rule whose
//! emission rate for a given market has run away: once a `(rule,
//! market)` pair emits more than `breaker_max` signals within the
//! tracking window, further emission for that pair is suspended until
//! it settles.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::core::domain::{MarketId, RuleId};

/// Multiple of the base cooldown a breaker may back off to across
/// repeated failed probes.
const MAX_COOLDOWN_MULTIPLE: u32 = 8;

/// State of a single `(rule_id, market_id)` pair's breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

struct Entry {
    state: BreakerState,
    emissions: VecDeque<Instant>,
    opened_at: Option<Instant>,
    cooldown: Duration,
    probe_issued: bool,
}

impl Entry {
    fn closed(cooldown: Duration) -> Self {
        Self {
            state: BreakerState::Closed,
            emissions: VecDeque::new(),
            opened_at: None,
            cooldown,
            probe_issued: false,
        }
    }

    /// Moves `Open -> HalfOpen` once the cooldown has elapsed, clearing
    /// the emission window so the probe is judged on its own.
    fn maybe_half_open(&mut self) {
        if self.state == BreakerState::Open && self.opened_at.is_some_and(|t| t.elapsed() >= self.cooldown) {
            self.state = BreakerState::HalfOpen;
            self.probe_issued = false;
            self.emissions.clear();
        }
    }
}

/// One breaker per `(rule_id, market_id)` pair. Trips `Open` once
/// emissions within `window` exceed `breaker_max`, half-opens after the
/// cooldown elapses to allow exactly one probe emission, then either
/// closes (probe held the rate down) or re-opens for double the prior
/// cooldown, bounded by [`MAX_COOLDOWN_MULTIPLE`] times the base.
pub struct CircuitBreaker {
    breaker_max: u32,
    window: Duration,
    base_cooldown: Duration,
    entries: DashMap<(RuleId, MarketId), Entry>,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(breaker_max: u32, window: Duration, cooldown: Duration) -> Self {
        Self {
            breaker_max,
            window,
            base_cooldown: cooldown,
            entries: DashMap::new(),
        }
    }

    /// `true` if signal emission for `(rule_id, market_id)` is currently
    /// allowed. A half-open breaker allows exactly one probe emission
    /// until [`Self::record_emission`] resolves it one way or the other.
    pub fn allows_emission(&self, rule_id: &RuleId, market_id: &MarketId) -> bool {
        let key = (rule_id.clone(), market_id.clone());
        let mut entry = self.entries.entry(key).or_insert_with(|| Entry::closed(self.base_cooldown));
        entry.maybe_half_open();
        match entry.state {
            BreakerState::Closed => true,
            BreakerState::Open => false,
            BreakerState::HalfOpen => {
                if entry.probe_issued {
                    false
                } else {
                    entry.probe_issued = true;
                    true
                }
            }
        }
    }

    /// Record a signal actually emitted for `(rule_id, market_id)`,
    /// updating the rate window and resolving a pending half-open
    /// probe. Call this only after [`Self::allows_emission`] returned
    /// `true` for the same pair.
    pub fn record_emission(&self, rule_id: &RuleId, market_id: &MarketId) {
        let key = (rule_id.clone(), market_id.clone());
        let mut entry = self.entries.entry(key).or_insert_with(|| Entry::closed(self.base_cooldown));
        let now = Instant::now();
        entry.emissions.push_back(now);
        while entry.emissions.front().is_some_and(|t| now.duration_since(*t) > self.window) {
            entry.emissions.pop_front();
        }
        let tripping = entry.emissions.len() as u32 > self.breaker_max;

        match entry.state {
            BreakerState::HalfOpen => {
                entry.probe_issued = false;
                if tripping {
                    let max_cooldown = self.base_cooldown * MAX_COOLDOWN_MULTIPLE;
                    entry.cooldown = (entry.cooldown * 2).min(max_cooldown);
                    entry.state = BreakerState::Open;
                    entry.opened_at = Some(now);
                } else {
                    entry.state = BreakerState::Closed;
                    entry.cooldown = self.base_cooldown;
                    entry.opened_at = None;
                    entry.emissions.clear();
                }
            }
            BreakerState::Closed if tripping => {
                entry.state = BreakerState::Open;
                entry.opened_at = Some(now);
            }
            _ => {}
        }
    }

    /// Current state for `(rule_id, market_id)`, transitioning
    /// `Open -> HalfOpen` as a side effect once the cooldown has
    /// elapsed, without consuming the probe slot.
    #[must_use]
    pub fn state(&self, rule_id: &RuleId, market_id: &MarketId) -> BreakerState {
        let key = (rule_id.clone(), market_id.clone());
        let Some(mut entry) = self.entries.get_mut(&key) else {
            return BreakerState::Closed;
        };
        entry.maybe_half_open();
        entry.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_pair_starts_closed() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(60), Duration::from_secs(60));
        let (rule, market) = (RuleId::new("r1"), MarketId::new("m1"));
        assert_eq!(breaker.state(&rule, &market), BreakerState::Closed);
        assert!(breaker.allows_emission(&rule, &market));
    }

    #[test]
    fn trips_open_once_emission_rate_exceeds_max() {
        let breaker = CircuitBreaker::new(1, Duration::from_secs(60), Duration::from_secs(60));
        let (rule, market) = (RuleId::new("r1"), MarketId::new("m1"));
        assert!(breaker.allows_emission(&rule, &market));
        breaker.record_emission(&rule, &market);
        assert!(breaker.allows_emission(&rule, &market));
        breaker.record_emission(&rule, &market);
        assert!(!breaker.allows_emission(&rule, &market));
    }

    #[test]
    fn distinct_rules_on_the_same_market_have_independent_breakers() {
        let breaker = CircuitBreaker::new(1, Duration::from_secs(60), Duration::from_secs(60));
        let market = MarketId::new("m1");
        let (rule_a, rule_b) = (RuleId::new("a"), RuleId::new("b"));
        breaker.record_emission(&rule_a, &market);
        breaker.record_emission(&rule_a, &market);
        assert!(!breaker.allows_emission(&rule_a, &market));
        assert!(breaker.allows_emission(&rule_b, &market));
    }

    #[test]
    fn half_open_allows_exactly_one_probe_until_resolved() {
        let breaker = CircuitBreaker::new(1, Duration::from_secs(60), Duration::from_millis(1));
        let (rule, market) = (RuleId::new("r1"), MarketId::new("m1"));
        breaker.record_emission(&rule, &market);
        breaker.record_emission(&rule, &market);
        assert!(!breaker.allows_emission(&rule, &market));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(breaker.state(&rule, &market), BreakerState::HalfOpen);
        assert!(breaker.allows_emission(&rule, &market));
        assert!(!breaker.allows_emission(&rule, &market));
    }

    #[test]
    fn successful_probe_closes_breaker_and_resets_cooldown() {
        let breaker = CircuitBreaker::new(1, Duration::from_secs(60), Duration::from_millis(1));
        let (rule, market) = (RuleId::new("r1"), MarketId::new("m1"));
        breaker.record_emission(&rule, &market);
        breaker.record_emission(&rule, &market);
        std::thread::sleep(Duration::from_millis(5));
        assert!(breaker.allows_emission(&rule, &market));
        breaker.record_emission(&rule, &market);
        assert_eq!(breaker.state(&rule, &market), BreakerState::Closed);
        assert!(breaker.allows_emission(&rule, &market));
    }

    #[test]
    fn failed_probe_reopens_for_double_the_cooldown() {
        let breaker = CircuitBreaker::new(0, Duration::from_secs(60), Duration::from_millis(1));
        let (rule, market) = (RuleId::new("r1"), MarketId::new("m1"));
        breaker.record_emission(&rule, &market);
        std::thread::sleep(Duration::from_millis(5));
        assert!(breaker.allows_emission(&rule, &market));
        breaker.record_emission(&rule, &market);
        assert_eq!(breaker.state(&rule, &market), BreakerState::Open);
        assert!(!breaker.allows_emission(&rule, &market));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(breaker.state(&rule, &market), BreakerState::HalfOpen);
    }
}
