//! `SPIKE_DETECT`: an option's mid price moved by more than a threshold
//! within a short window.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use uuid::Uuid;

use crate::core::domain::{Level, RuleType, Signal, SignalId, SignalPayload};
use crate::core::rules::context::RuleContext;
use crate::core::rules::predicate::{clamp01, Predicate};

pub struct SpikeDetectPredicate;

impl Predicate for SpikeDetectPredicate {
    fn rule_type(&self) -> RuleType {
        RuleType::SpikeDetect
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Signal> {
        let threshold = ctx.rule.param_or("delta_threshold", Decimal::new(5, 2));
        let window_secs = ctx
            .rule
            .param_or("window_secs", Decimal::new(60, 0))
            .to_u64()
            .unwrap_or(60);
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
                let Some((_, first)) = series.first() else { continue };
                let Some((_, last)) = series.last() else { continue };
                let delta = (*last - *first).abs();
                if delta < threshold {
                    continue;
                }
                let level = if delta >= threshold * Decimal::TWO { Level::P1 } else { Level::P2 };
                signals.push(
                    Signal::new(
                        SignalId::new(Uuid::new_v4().to_string()),
                        ctx.rule.rule_id().clone(),
                        RuleType::SpikeDetect,
                        market.market_id().clone(),
                        level,
                        SignalPayload::SpikeDetect {
                            option_id: option.option_id().clone(),
                            delta,
                            window_secs,
                        },
                        ctx.now,
                    )
                    .with_edge_score(clamp01(delta)),
                );
            }
        }
        signals
    }
}
