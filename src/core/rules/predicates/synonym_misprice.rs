//! `SYNONYM_MISPRICE`: members of a synonym group, believed to track the
//! same implied probability, have drifted apart.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::domain::{Level, RuleType, Signal, SignalId, SignalPayload};
use crate::core::rules::context::RuleContext;
use crate::core::rules::predicate::{clamp01, Predicate};

pub struct SynonymMispricePredicate;

impl Predicate for SynonymMispricePredicate {
    fn rule_type(&self) -> RuleType {
        RuleType::SynonymMisprice
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Signal> {
        let threshold = ctx.rule.param_or("spread_threshold", Decimal::new(3, 2));
        let mut signals = Vec::new();

        for group in ctx.synonym_groups {
            let mut prices = Vec::new();
            for member in group.members() {
                let Some(tick) = ctx.book_cache.get(&member.market_id, &member.option_id) else { continue };
                let Some(mid) = tick.mid() else { continue };
                prices.push((member.market_id.clone(), member.option_id.clone(), mid));
            }
            if prices.len() < 2 {
                continue;
            }
            let min = prices.iter().map(|(_, _, p)| *p).min().unwrap();
            let max = prices.iter().map(|(_, _, p)| *p).max().unwrap();
            let spread = max - min;
            if spread < threshold {
                continue;
            }
            let market_id = prices[0].0.clone();
            let level = if spread >= threshold * Decimal::TWO { Level::P1 } else { Level::P2 };
            signals.push(
                Signal::new(
                    SignalId::new(Uuid::new_v4().to_string()),
                    ctx.rule.rule_id().clone(),
                    RuleType::SynonymMisprice,
                    market_id,
                    level,
                    SignalPayload::SynonymMisprice {
                        group_id: group.group_id().clone(),
                        members: prices,
                        spread,
                    },
                    ctx.now,
                )
                .with_edge_score(clamp01(spread)),
            );
        }
        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{GroupId, MarketId, OptionId, RuleDefinition, RuleId, SynonymGroup, SynonymMember, SynonymMethod, Tick};
    use crate::core::venue::BookCache;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn group() -> SynonymGroup {
        SynonymGroup::new(
            GroupId::new("g1"),
            SynonymMethod::Explicit,
            vec![
                SynonymMember { market_id: MarketId::new("m1"), option_id: OptionId::new("yes") },
                SynonymMember { market_id: MarketId::new("m2"), option_id: OptionId::new("yes") },
            ],
        )
    }

    #[test]
    fn fires_when_members_diverge_beyond_threshold() {
        let rule = RuleDefinition::new(RuleId::new("r1"), RuleType::SynonymMisprice).with_param("spread_threshold", dec!(0.05));
        let cache = BookCache::new();
        cache.insert(Tick::new(MarketId::new("m1"), OptionId::new("yes"), Utc::now()).with_last(Some(dec!(0.40))));
        cache.insert(Tick::new(MarketId::new("m2"), OptionId::new("yes"), Utc::now()).with_last(Some(dec!(0.50))));
        let groups = vec![group()];
        let ctx = RuleContext {
            rule: &rule,
            markets: &[],
            book_cache: &cache,
            synonym_groups: &groups,
            recent_ticks: &[],
            now: Utc::now(),
        };
        assert_eq!(SynonymMispricePredicate.evaluate(&ctx).len(), 1);
    }

    #[test]
    fn does_not_fire_when_within_threshold() {
        let rule = RuleDefinition::new(RuleId::new("r1"), RuleType::SynonymMisprice).with_param("spread_threshold", dec!(0.10));
        let cache = BookCache::new();
        cache.insert(Tick::new(MarketId::new("m1"), OptionId::new("yes"), Utc::now()).with_last(Some(dec!(0.40))));
        cache.insert(Tick::new(MarketId::new("m2"), OptionId::new("yes"), Utc::now()).with_last(Some(dec!(0.43))));
        let groups = vec![group()];
        let ctx = RuleContext {
            rule: &rule,
            markets: &[],
            book_cache: &cache,
            synonym_groups: &groups,
            recent_ticks: &[],
            now: Utc::now(),
        };
        assert!(SynonymMispricePredicate.evaluate(&ctx).is_empty());
    }
}
