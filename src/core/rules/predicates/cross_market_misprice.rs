//! `CROSS_MARKET_MISPRICE`: two distinct, explicitly-paired markets imply
//! different probabilities for what should be the same outcome label.
//!
//! Unlike `SYNONYM_MISPRICE`, pairing here is a fixed two-market scope on
//! the rule itself rather than a discovered group.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::domain::{Level, RuleType, Signal, SignalId, SignalPayload};
use crate::core::rules::context::RuleContext;
use crate::core::rules::predicate::{clamp01, Predicate};

pub struct CrossMarketMispricePredicate;

impl Predicate for CrossMarketMispricePredicate {
    fn rule_type(&self) -> RuleType {
        RuleType::CrossMarketMisprice
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Signal> {
        let [left_id, right_id] = ctx.rule.market_scope() else {
            return Vec::new();
        };
        let threshold = ctx.rule.param_or("spread_threshold", Decimal::new(3, 2));
        let label = "Yes";

        let Some(left_market) = ctx.market(left_id) else { return Vec::new() };
        let Some(right_market) = ctx.market(right_id) else { return Vec::new() };
        let Some(left_option) = left_market.option_by_label(label) else { return Vec::new() };
        let Some(right_option) = right_market.option_by_label(label) else { return Vec::new() };
        let Some(left_tick) = ctx.book_cache.get(left_id, left_option.option_id()) else { return Vec::new() };
        let Some(right_tick) = ctx.book_cache.get(right_id, right_option.option_id()) else { return Vec::new() };
        let (Some(left_mid), Some(right_mid)) = (left_tick.mid(), right_tick.mid()) else {
            return Vec::new();
        };

        let spread = (left_mid - right_mid).abs();
        if spread < threshold {
            return Vec::new();
        }
        let level = if spread >= threshold * Decimal::TWO { Level::P1 } else { Level::P2 };
        vec![Signal::new(
            SignalId::new(Uuid::new_v4().to_string()),
            ctx.rule.rule_id().clone(),
            RuleType::CrossMarketMisprice,
            left_id.clone(),
            level,
            SignalPayload::CrossMarketMisprice {
                left: (left_id.clone(), left_option.option_id().clone(), left_mid),
                right: (right_id.clone(), right_option.option_id().clone(), right_mid),
                spread,
            },
            ctx.now,
        )
        .with_edge_score(clamp01(spread))]
    }
}
