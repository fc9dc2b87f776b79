//! `TREND_BREAKOUT`: an option has moved monotonically through a window
//! and broken out past its recent range, distinct from `SPIKE_DETECT`'s
//! single-jump detection.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use uuid::Uuid;

use crate::core::domain::{Level, RuleType, Signal, SignalId, SignalPayload};
use crate::core::rules::context::RuleContext;
use crate::core::rules::predicate::{clamp01, Predicate};

pub struct TrendBreakoutPredicate;

impl Predicate for TrendBreakoutPredicate {
    fn rule_type(&self) -> RuleType {
        RuleType::TrendBreakout
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Signal> {
        let min_moves = ctx.rule.param_or("min_monotonic_moves", Decimal::new(3, 0)).to_u64().unwrap_or(3) as usize;
        let breakout_threshold = ctx.rule.param_or("breakout_threshold", Decimal::new(5, 2));
        let window_secs = ctx
            .rule
            .param_or("window_secs", Decimal::new(300, 0))
            .to_u64()
            .unwrap_or(300);
        let mut signals = Vec::new();

        for market in ctx.markets {
            if !ctx.rule.applies_to_market(market.market_id()) {
                continue;
            }
            let ticks = ctx.ticks_for_market(market.market_id());
            for option in market.options() {
                let mut series: Vec<_> = ticks
                    .iter()
                    .filter(|t| t.option_id() == option.option_id())
                    .filter_map(|t| t.mid().map(|m| (t.observed_at(), m)))
                    .collect();
                series.sort_by_key(|(ts, _)| *ts);
                if series.len() < min_moves + 1 {
                    continue;
                }
                let rising = series.windows(2).all(|w| w[1].1 >= w[0].1);
                let falling = series.windows(2).all(|w| w[1].1 <= w[0].1);
                if !rising && !falling {
                    continue;
                }
                let from_price = series.first().unwrap().1;
                let to_price = series.last().unwrap().1;
                if (to_price - from_price).abs() < breakout_threshold {
                    continue;
                }
                let mean = (from_price + to_price) / Decimal::TWO;
                let deviation = (to_price - from_price).abs() / mean.max(Decimal::new(1, 4));
                signals.push(
                    Signal::new(
                        SignalId::new(Uuid::new_v4().to_string()),
                        ctx.rule.rule_id().clone(),
                        RuleType::TrendBreakout,
                        market.market_id().clone(),
                        Level::P2,
                        SignalPayload::TrendBreakout {
                            option_id: option.option_id().clone(),
                            from_price,
                            to_price,
                            window_secs,
                        },
                        ctx.now,
                    )
                    .with_edge_score(clamp01(deviation)),
                );
            }
        }
        signals
    }
}
