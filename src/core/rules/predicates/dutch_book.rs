//! `DUTCH_BOOK_DETECT`: buying the best ask of every option in a market
//! costs less than the guaranteed payout of one, a complement to
//! `SUM_LT_1` phrased as an executable leg set.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::domain::{Level, RuleType, Signal, SignalId, SignalPayload};
use crate::core::rules::context::RuleContext;
use crate::core::rules::predicate::{clamp01, Predicate};

pub struct DutchBookDetectPredicate;

impl Predicate for DutchBookDetectPredicate {
    fn rule_type(&self) -> RuleType {
        RuleType::DutchBookDetect
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Signal> {
        let min_profit = ctx.rule.param_or("min_profit", Decimal::new(1, 2));
        let mut signals = Vec::new();

        for market in ctx.markets {
            if !ctx.rule.applies_to_market(market.market_id()) || market.options().is_empty() {
                continue;
            }
            let mut legs = Vec::new();
            let mut total_ask = Decimal::ZERO;
            let mut complete = true;
            for option in market.options() {
                let Some(tick) = ctx.book_cache.get(market.market_id(), option.option_id()) else {
                    complete = false;
                    break;
                };
                let Some(ask) = tick.ask() else {
                    complete = false;
                    break;
                };
                total_ask += ask;
                legs.push((option.option_id().clone(), ask));
            }
            if !complete {
                continue;
            }
            let profit = Decimal::ONE - total_ask;
            if profit < min_profit {
                continue;
            }
            signals.push(
                Signal::new(
                    SignalId::new(Uuid::new_v4().to_string()),
                    ctx.rule.rule_id().clone(),
                    RuleType::DutchBookDetect,
                    market.market_id().clone(),
                    Level::P1,
                    SignalPayload::DutchBookDetect {
                        legs,
                        guaranteed_profit: profit,
                    },
                    ctx.now,
                )
                .with_edge_score(clamp01(profit)),
            );
        }
        signals
    }
}
