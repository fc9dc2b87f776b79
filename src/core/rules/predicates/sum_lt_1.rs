//! `SUM_LT_1`: a market's option mid prices sum to less than one, implying
//! a risk-free basket purchase.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::domain::{BookSnapshot, Level, Signal, SignalId, SignalPayload};
use crate::core::rules::context::RuleContext;
use crate::core::rules::predicate::{clamp01, Predicate};
use crate::core::domain::RuleType;

pub struct SumLt1Predicate;

impl Predicate for SumLt1Predicate {
    fn rule_type(&self) -> RuleType {
        RuleType::SumLt1
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Signal> {
        let threshold = ctx.rule.param_or("threshold", Decimal::ONE);
        let mut signals = Vec::new();

        for market in ctx.markets {
            if !ctx.rule.applies_to_market(market.market_id()) {
                continue;
            }
            let mut books = Vec::new();
            let mut sum = Decimal::ZERO;
            let mut complete = !market.options().is_empty();
            for option in market.options() {
                let Some(tick) = ctx.book_cache.get(market.market_id(), option.option_id()) else {
                    complete = false;
                    break;
                };
                let Some(mid) = tick.mid() else {
                    complete = false;
                    break;
                };
                sum += mid;
                books.push(BookSnapshot {
                    option_id: option.option_id().clone(),
                    bid: tick.bid(),
                    ask: tick.ask(),
                });
            }
            if !complete || sum >= threshold {
                continue;
            }
            let level = if threshold - sum >= Decimal::new(3, 2) {
                Level::P1
            } else {
                Level::P2
            };
            signals.push(
                Signal::new(
                    SignalId::new(Uuid::new_v4().to_string()),
                    ctx.rule.rule_id().clone(),
                    RuleType::SumLt1,
                    market.market_id().clone(),
                    level,
                    SignalPayload::SumLt1 {
                        sum,
                        threshold,
                        books,
                    },
                    ctx.now,
                )
                .with_edge_score(clamp01(threshold - sum)),
            );
        }
        signals
    }
}
