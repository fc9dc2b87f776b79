//! Derives a concrete trade plan from a fired [`Signal`], one planner per
//! rule type — mirroring the rule engine's
//! one-[`crate::core::rules::predicate::Predicate`]-per-[`RuleType`]
//! design.

use crate::core::domain::{IntentDetail, Notional, RuleType, Side, Signal, SignalPayload};

/// Produces the leg set and total notional for an [`crate::core::domain::OrderIntent`]
/// from a signal's payload and suggested trade. Returns `None` when the
/// signal carries no suggested trade and no default plan applies.
pub trait Planner: Send + Sync {
    fn rule_type(&self) -> RuleType;

    fn plan(&self, signal: &Signal) -> Option<(Vec<IntentDetail>, Notional)>;
}

/// Falls back to whatever [`SuggestedTrade`](crate::core::domain::SuggestedTrade)
/// the signal already carries; used for every rule type that doesn't
/// need bespoke planning logic.
pub struct SuggestedTradePlanner(pub RuleType);

impl Planner for SuggestedTradePlanner {
    fn rule_type(&self) -> RuleType {
        self.0
    }

    fn plan(&self, signal: &Signal) -> Option<(Vec<IntentDetail>, Notional)> {
        let trade = signal.suggested_trade()?;
        let legs = trade
            .legs
            .iter()
            .map(|leg| IntentDetail {
                option_id: leg.option_id.clone(),
                side: leg.side,
                price: leg.price,
                size: leg.size,
            })
            .collect();
        Some((legs, trade.expected_notional))
    }
}

/// Builds a one-sided buy plan directly from a `SUM_LT_1` payload's book
/// snapshots, sized to a fixed per-leg notional — used when the signal
/// has no precomputed [`SuggestedTrade`].
pub struct SumLt1Planner {
    pub leg_size: rust_decimal::Decimal,
}

impl Planner for SumLt1Planner {
    fn rule_type(&self) -> RuleType {
        RuleType::SumLt1
    }

    fn plan(&self, signal: &Signal) -> Option<(Vec<IntentDetail>, Notional)> {
        if let Some(trade) = signal.suggested_trade() {
            return SuggestedTradePlanner(RuleType::SumLt1).plan_from_trade(trade);
        }
        let SignalPayload::SumLt1 { books, .. } = signal.payload() else { return None };
        if books.is_empty() {
            return None;
        }
        let mut legs = Vec::new();
        let mut notional = Notional::ZERO;
        for book in books {
            let price = book.ask?;
            legs.push(IntentDetail {
                option_id: book.option_id.clone(),
                side: Side::Buy,
                price,
                size: self.leg_size,
            });
            notional += price * self.leg_size;
        }
        Some((legs, notional))
    }
}

impl SuggestedTradePlanner {
    fn plan_from_trade(&self, trade: &crate::core::domain::SuggestedTrade) -> Option<(Vec<IntentDetail>, Notional)> {
        let legs = trade
            .legs
            .iter()
            .map(|leg| IntentDetail {
                option_id: leg.option_id.clone(),
                side: leg.side,
                price: leg.price,
                size: leg.size,
            })
            .collect();
        Some((legs, trade.expected_notional))
    }
}

/// Dispatches to the planner registered for a signal's rule type.
#[derive(Default)]
pub struct PlannerRegistry {
    planners: Vec<Box<dyn Planner>>,
}

impl PlannerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, planner: Box<dyn Planner>) {
        self.planners.push(planner);
    }

    #[must_use]
    pub fn plan(&self, signal: &Signal) -> Option<(Vec<IntentDetail>, Notional)> {
        self.planners
            .iter()
            .find(|p| p.rule_type() == signal.rule_type())
            .and_then(|p| p.plan(signal))
    }
}
