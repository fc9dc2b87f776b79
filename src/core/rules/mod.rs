//! Rule evaluation engine: folds ingested ticks into a rolling window,
//! then on a fixed cycle evaluates every enabled [`RuleDefinition`]
//! against it through the matching [`Predicate`].

pub mod breaker;
pub mod context;
pub mod cooldown;
pub mod kpi;
pub mod loader;
pub mod predicate;
pub mod predicates;
pub mod synonyms;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::domain::{Market, RuleDefinition, Signal, SynonymGroup, Tick};
use crate::core::metrics::Metrics;
use crate::core::venue::BookCache;

pub use breaker::{BreakerState, CircuitBreaker};
pub use context::RuleContext;
pub use cooldown::CooldownTracker;
pub use kpi::KpiAggregator;
pub use predicate::{clamp01, Predicate, PredicateRegistry};

const RECENT_TICK_WINDOW: Duration = Duration::from_secs(15 * 60);

fn default_registry() -> PredicateRegistry {
    let mut registry = PredicateRegistry::new();
    registry.register(Box::new(predicates::SumLt1Predicate));
    registry.register(Box::new(predicates::SpikeDetectPredicate));
    registry.register(Box::new(predicates::EndgameSweepPredicate));
    registry.register(Box::new(predicates::SynonymMispricePredicate));
    registry.register(Box::new(predicates::DutchBookDetectPredicate));
    registry.register(Box::new(predicates::CrossMarketMispricePredicate));
    registry.register(Box::new(predicates::TrendBreakoutPredicate));
    registry
}

/// Evaluates every enabled rule against a rolling window of recent ticks
/// on a fixed cycle, subject to per-(rule, market) cooldown and a
/// per-(rule, market) circuit breaker.
pub struct RuleEngine {
    registry: PredicateRegistry,
    cooldown: CooldownTracker,
    breaker: Arc<CircuitBreaker>,
    kpi: KpiAggregator,
    metrics: Metrics,
    eval_interval: Duration,
    recent_ticks: VecDeque<Tick>,
}

impl RuleEngine {
    #[must_use]
    pub fn new(breaker: Arc<CircuitBreaker>, metrics: Metrics, eval_interval: Duration) -> Self {
        Self {
            registry: default_registry(),
            cooldown: CooldownTracker::new(),
            breaker,
            kpi: KpiAggregator::new(),
            metrics,
            eval_interval,
            recent_ticks: VecDeque::new(),
        }
    }

    fn prune_window(&mut self, now: chrono::DateTime<chrono::Utc>) {
        let cutoff = now - chrono::Duration::from_std(RECENT_TICK_WINDOW).unwrap();
        while self.recent_ticks.front().is_some_and(|t| t.observed_at() < cutoff) {
            self.recent_ticks.pop_front();
        }
    }

    fn evaluate_cycle(
        &mut self,
        rules: &[RuleDefinition],
        markets: &[Market],
        book_cache: &BookCache,
        synonym_groups: &[SynonymGroup],
    ) -> Vec<Signal> {
        let now = chrono::Utc::now();
        self.prune_window(now);
        let recent: Vec<Tick> = self.recent_ticks.iter().cloned().collect();
        let start = Instant::now();
        let mut signals = Vec::new();

        for rule in rules.iter().filter(|r| r.enabled()) {
            let ctx = RuleContext {
                rule,
                markets,
                book_cache,
                synonym_groups,
                recent_ticks: &recent,
                now,
            };
            let mut fired = self.registry.evaluate(&ctx);
            fired.retain(|signal| {
                let allowed = self.breaker.allows_emission(rule.rule_id(), signal.market_id())
                    && !self.cooldown.is_cooling_down(rule.rule_id(), signal.market_id(), Duration::from_secs(rule.cooldown_secs()));
                if allowed {
                    self.breaker.record_emission(rule.rule_id(), signal.market_id());
                    self.cooldown.record_fired(rule.rule_id(), signal.market_id());
                    self.metrics.record_signal(rule.rule_type().as_str());
                }
                allowed
            });
            self.kpi.observe(rule.rule_id(), fired.len() as u64);
            signals.extend(fired);
        }

        self.metrics.record_rule_eval(start.elapsed());
        signals
    }

    /// Feed one ingested tick into the rolling window.
    pub fn ingest(&mut self, tick: Tick) {
        self.recent_ticks.push_back(tick);
    }

    /// Run the evaluation loop until `cancel` fires. `rules`/`markets`/
    /// `synonym_groups` are re-read from their shared cells each cycle so
    /// a reload takes effect on the next tick without restarting the
    /// loop.
    #[allow(clippy::too_many_arguments)]
    pub async fn run(
        mut self,
        mut tick_rx: mpsc::Receiver<Tick>,
        signal_tx: mpsc::Sender<Signal>,
        rules: Arc<tokio::sync::RwLock<Vec<RuleDefinition>>>,
        markets: Arc<tokio::sync::RwLock<Vec<Market>>>,
        synonym_groups: Arc<tokio::sync::RwLock<Vec<SynonymGroup>>>,
        book_cache: Arc<BookCache>,
        cancel: CancellationToken,
    ) {
        info!("rule engine starting");
        let mut tick = tokio::time::interval(self.eval_interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                maybe_tick = tick_rx.recv() => {
                    match maybe_tick {
                        Some(t) => self.ingest(t),
                        None => {
                            info!("tick channel closed, stopping rule engine");
                            return;
                        }
                    }
                }
                _ = tick.tick() => {
                    let rules = rules.read().await;
                    let markets = markets.read().await;
                    let synonym_groups = synonym_groups.read().await;
                    let signals = self.evaluate_cycle(&rules, &markets, &book_cache, &synonym_groups);
                    debug!(count = signals.len(), "rule evaluation cycle complete");
                    for signal in signals {
                        if signal_tx.send(signal).await.is_err() {
                            info!("signal receiver dropped, stopping rule engine");
                            return;
                        }
                    }
                }
                () = cancel.cancelled() => {
                    info!("rule engine stopping");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{MarketId, MarketOption, MarketStatus, OptionId, RuleId, RuleType};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn evaluate_cycle_applies_cooldown_across_repeated_calls() {
        let breaker = Arc::new(CircuitBreaker::new(1000, Duration::from_secs(60), Duration::from_secs(60)));
        let mut engine = RuleEngine::new(breaker, Metrics::new(), Duration::from_secs(1));
        let cache = BookCache::new();
        cache.insert(Tick::new(MarketId::new("m1"), OptionId::new("yes"), Utc::now()).with_last(Some(dec!(0.45))));
        cache.insert(Tick::new(MarketId::new("m1"), OptionId::new("no"), Utc::now()).with_last(Some(dec!(0.45))));
        let markets = vec![
            Market::new(MarketId::new("m1"), "m", MarketStatus::Open).with_options(vec![
                MarketOption::new(OptionId::new("yes"), MarketId::new("m1"), "Yes"),
                MarketOption::new(OptionId::new("no"), MarketId::new("m1"), "No"),
            ]),
        ];
        let rules = vec![
            RuleDefinition::new(RuleId::new("r1"), RuleType::SumLt1)
                .with_param("threshold", dec!(0.97))
                .with_cooldown_secs(60),
        ];

        let first = engine.evaluate_cycle(&rules, &markets, &cache, &[]);
        assert_eq!(first.len(), 1);
        let second = engine.evaluate_cycle(&rules, &markets, &cache, &[]);
        assert!(second.is_empty());
    }

    #[test]
    fn evaluate_cycle_skips_disabled_rules() {
        let breaker = Arc::new(CircuitBreaker::new(1000, Duration::from_secs(60), Duration::from_secs(60)));
        let mut engine = RuleEngine::new(breaker, Metrics::new(), Duration::from_secs(1));
        let cache = BookCache::new();
        cache.insert(Tick::new(MarketId::new("m1"), OptionId::new("yes"), Utc::now()).with_last(Some(dec!(0.45))));
        cache.insert(Tick::new(MarketId::new("m1"), OptionId::new("no"), Utc::now()).with_last(Some(dec!(0.45))));
        let markets = vec![
            Market::new(MarketId::new("m1"), "m", MarketStatus::Open).with_options(vec![
                MarketOption::new(OptionId::new("yes"), MarketId::new("m1"), "Yes"),
                MarketOption::new(OptionId::new("no"), MarketId::new("m1"), "No"),
            ]),
        ];
        let rules = vec![
            RuleDefinition::new(RuleId::new("r1"), RuleType::SumLt1)
                .with_param("threshold", dec!(0.97))
                .with_enabled(false),
        ];
        assert!(engine.evaluate_cycle(&rules, &markets, &cache, &[]).is_empty());
    }

    #[test]
    fn evaluate_cycle_respects_open_breaker() {
        let breaker = Arc::new(CircuitBreaker::new(0, Duration::from_secs(60), Duration::from_secs(60)));
        breaker.record_emission(&RuleId::new("r1"), &MarketId::new("m1"));
        let mut engine = RuleEngine::new(breaker, Metrics::new(), Duration::from_secs(1));
        let cache = BookCache::new();
        cache.insert(Tick::new(MarketId::new("m1"), OptionId::new("yes"), Utc::now()).with_last(Some(dec!(0.45))));
        cache.insert(Tick::new(MarketId::new("m1"), OptionId::new("no"), Utc::now()).with_last(Some(dec!(0.45))));
        let markets = vec![
            Market::new(MarketId::new("m1"), "m", MarketStatus::Open).with_options(vec![
                MarketOption::new(OptionId::new("yes"), MarketId::new("m1"), "Yes"),
                MarketOption::new(OptionId::new("no"), MarketId::new("m1"), "No"),
            ]),
        ];
        let rules = vec![RuleDefinition::new(RuleId::new("r1"), RuleType::SumLt1).with_param("threshold", dec!(0.97))];
        assert!(engine.evaluate_cycle(&rules, &markets, &cache, &[]).is_empty());
    }
}
