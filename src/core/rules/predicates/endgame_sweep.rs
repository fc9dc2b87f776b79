//! `ENDGAME_SWEEP`: a market is close to resolving and an option is still
//! trading far from its likely terminal price, suggesting a sweep.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use uuid::Uuid;

use crate::core::domain::{Level, RuleType, Signal, SignalId, SignalPayload};
use crate::core::rules::context::RuleContext;
use crate::core::rules::predicate::{clamp01, Predicate};

pub struct EndgameSweepPredicate;

impl Predicate for EndgameSweepPredicate {
    fn rule_type(&self) -> RuleType {
        RuleType::EndgameSweep
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Signal> {
        let hours_threshold = ctx
            .rule
            .param_or("hours_to_close_max", Decimal::new(2, 0))
            .to_f64()
            .unwrap_or(2.0);
        let extreme_low = ctx.rule.param_or("extreme_low", Decimal::new(5, 2));
        let extreme_high = ctx.rule.param_or("extreme_high", Decimal::new(95, 2));
        let mut signals = Vec::new();

        for market in ctx.markets {
            if !ctx.rule.applies_to_market(market.market_id()) {
                continue;
            }
            let Some(hours) = market.hours_to_close(ctx.now) else { continue };
            if hours < 0.0 || hours > hours_threshold {
                continue;
            }
            for option in market.options() {
                let Some(tick) = ctx.book_cache.get(market.market_id(), option.option_id()) else { continue };
                let Some(price) = tick.mid() else { continue };
                if price > extreme_low && price < extreme_high {
                    continue;
                }
                let extremity = (price - extreme_high).max(extreme_low - price);
                signals.push(
                    Signal::new(
                        SignalId::new(Uuid::new_v4().to_string()),
                        ctx.rule.rule_id().clone(),
                        RuleType::EndgameSweep,
                        market.market_id().clone(),
                        Level::P2,
                        SignalPayload::EndgameSweep {
                            option_id: option.option_id().clone(),
                            hours_to_close: hours,
                            price,
                        },
                        ctx.now,
                    )
                    .with_edge_score(clamp01(extremity)),
                );
            }
        }
        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{Market, MarketId, MarketOption, MarketStatus, OptionId, RuleDefinition, RuleId, Tick};
    use crate::core::venue::BookCache;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn fires_near_close_at_extreme_price() {
        let rule = RuleDefinition::new(RuleId::new("r1"), RuleType::EndgameSweep);
        let cache = BookCache::new();
        cache.insert(Tick::new(MarketId::new("m1"), OptionId::new("yes"), Utc::now()).with_last(Some(dec!(0.97))));
        let markets = vec![
            Market::new(MarketId::new("m1"), "m", MarketStatus::Open)
                .with_options(vec![MarketOption::new(OptionId::new("yes"), MarketId::new("m1"), "Yes")])
                .with_end_ts(Some(Utc::now() + chrono::Duration::minutes(30))),
        ];
        let ctx = RuleContext {
            rule: &rule,
            markets: &markets,
            book_cache: &cache,
            synonym_groups: &[],
            recent_ticks: &[],
            now: Utc::now(),
        };
        assert_eq!(EndgameSweepPredicate.evaluate(&ctx).len(), 1);
    }

    #[test]
    fn does_not_fire_far_from_close() {
        let rule = RuleDefinition::new(RuleId::new("r1"), RuleType::EndgameSweep);
        let cache = BookCache::new();
        cache.insert(Tick::new(MarketId::new("m1"), OptionId::new("yes"), Utc::now()).with_last(Some(dec!(0.97))));
        let markets = vec![
            Market::new(MarketId::new("m1"), "m", MarketStatus::Open)
                .with_options(vec![MarketOption::new(OptionId::new("yes"), MarketId::new("m1"), "Yes")])
                .with_end_ts(Some(Utc::now() + chrono::Duration::days(5))),
        ];
        let ctx = RuleContext {
            rule: &rule,
            markets: &markets,
            book_cache: &cache,
            synonym_groups: &[],
            recent_ticks: &[],
            now: Utc::now(),
        };
        assert!(EndgameSweepPredicate.evaluate(&ctx).is_empty());
    }

    #[test]
    fn does_not_fire_at_non_extreme_price() {
        let rule = RuleDefinition::new(RuleId::new("r1"), RuleType::EndgameSweep);
        let cache = BookCache::new();
        cache.insert(Tick::new(MarketId::new("m1"), OptionId::new("yes"), Utc::now()).with_last(Some(dec!(0.5))));
        let markets = vec![
            Market::new(MarketId::new("m1"), "m", MarketStatus::Open)
                .with_options(vec![MarketOption::new(OptionId::new("yes"), MarketId::new("m1"), "Yes")])
                .with_end_ts(Some(Utc::now() + chrono::Duration::minutes(30))),
        ];
        let ctx = RuleContext {
            rule: &rule,
            markets: &markets,
            book_cache: &cache,
            synonym_groups: &[],
            recent_ticks: &[],
            now: Utc::now(),
        };
        assert!(EndgameSweepPredicate.evaluate(&ctx).is_empty());
    }
}
