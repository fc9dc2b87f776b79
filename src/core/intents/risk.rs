//! The risk gauntlet: the gates a confirmed intent must clear, run to
//! completion and accumulated rather than stopped at the first failure,
//! so a rejected intent's `rejection_reasons` lists every violated gate.

use rust_decimal::Decimal;

use crate::core::domain::{ExecutionPolicy, MarketId, Notional, RuleId};
use crate::core::rules::CircuitBreaker;

/// Why a candidate intent violated a risk gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskRejection {
    NotionalCapExceeded { notional: String, cap: String },
    OpenIntentCapExceeded { open: u32, cap: u32 },
    DailyCapExceeded { projected: String, cap: String },
    SlippageExceeded { slippage_bps: String, cap_bps: String },
    StaleBook,
    CircuitBreakerOpen,
}

impl RiskRejection {
    /// Stable code recorded in an `OrderIntent`'s `rejection_reasons`.
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::NotionalCapExceeded { .. } => "notional_cap_exceeded",
            Self::OpenIntentCapExceeded { .. } => "open_intent_cap_exceeded",
            Self::DailyCapExceeded { .. } => "daily_cap_exceeded",
            Self::SlippageExceeded { .. } => "slippage_exceeded",
            Self::StaleBook => "stale_book",
            Self::CircuitBreakerOpen => "circuit_breaker_open",
        }
    }
}

/// Inputs the gauntlet needs beyond the policy itself: the world state at
/// the moment a suggested intent is confirmed.
pub struct RiskInputs {
    pub rule_id: RuleId,
    pub market_id: MarketId,
    pub notional: Notional,
    pub open_intents: u32,
    pub daily_notional_so_far: Notional,
    pub quoted_price: Decimal,
    pub planned_price: Decimal,
}

/// Runs every gate, accumulating all violations: per-intent notional
/// cap, concurrency cap, daily notional cap, slippage guardrail (or
/// `StaleBook` when there's no current quote), and the rule/market
/// circuit breaker. An empty result means the intent clears the
/// gauntlet.
#[must_use]
pub fn run(policy: &ExecutionPolicy, breaker: &CircuitBreaker, inputs: &RiskInputs) -> Vec<RiskRejection> {
    let mut rejections = Vec::new();

    if inputs.notional > policy.max_notional_per_intent() {
        rejections.push(RiskRejection::NotionalCapExceeded {
            notional: inputs.notional.to_string(),
            cap: policy.max_notional_per_intent().to_string(),
        });
    }

    if inputs.open_intents >= policy.max_open_intents() {
        rejections.push(RiskRejection::OpenIntentCapExceeded {
            open: inputs.open_intents,
            cap: policy.max_open_intents(),
        });
    }

    let projected = inputs.daily_notional_so_far + inputs.notional;
    if projected > policy.max_daily_notional() {
        rejections.push(RiskRejection::DailyCapExceeded {
            projected: projected.to_string(),
            cap: policy.max_daily_notional().to_string(),
        });
    }

    if inputs.quoted_price == Decimal::ZERO {
        rejections.push(RiskRejection::StaleBook);
    } else {
        let slippage_bps = ((inputs.planned_price - inputs.quoted_price) / inputs.quoted_price).abs() * Decimal::new(10_000, 0);
        if slippage_bps > policy.max_slippage_bps() {
            rejections.push(RiskRejection::SlippageExceeded {
                slippage_bps: slippage_bps.to_string(),
                cap_bps: policy.max_slippage_bps().to_string(),
            });
        }
    }

    if !breaker.allows_emission(&inputs.rule_id, &inputs.market_id) {
        rejections.push(RiskRejection::CircuitBreakerOpen);
    }

    rejections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{ExecutionMode, MarketId, PolicyId};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn policy() -> ExecutionPolicy {
        ExecutionPolicy::new(PolicyId::new("p1"), ExecutionMode::SemiAuto, dec!(500), 5, dec!(5000), dec!(50))
    }

    fn inputs() -> RiskInputs {
        RiskInputs {
            rule_id: RuleId::new("r1"),
            market_id: MarketId::new("m1"),
            notional: dec!(100),
            open_intents: 0,
            daily_notional_so_far: dec!(0),
            quoted_price: dec!(0.5),
            planned_price: dec!(0.5),
        }
    }

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(3, Duration::from_secs(60), Duration::from_secs(60))
    }

    #[test]
    fn passes_when_all_gates_clear() {
        assert!(run(&policy(), &breaker(), &inputs()).is_empty());
    }

    #[test]
    fn rejects_over_per_intent_notional_cap() {
        let mut i = inputs();
        i.notional = dec!(501);
        assert_eq!(
            run(&policy(), &breaker(), &i),
            vec![RiskRejection::NotionalCapExceeded {
                notional: "501".to_string(),
                cap: "500".to_string(),
            }]
        );
    }

    #[test]
    fn rejects_at_open_intent_cap() {
        let mut i = inputs();
        i.open_intents = 5;
        let rejections = run(&policy(), &breaker(), &i);
        assert!(matches!(rejections.as_slice(), [RiskRejection::OpenIntentCapExceeded { .. }]));
    }

    #[test]
    fn rejects_over_daily_cap() {
        let mut i = inputs();
        i.daily_notional_so_far = dec!(4950);
        i.notional = dec!(100);
        let rejections = run(&policy(), &breaker(), &i);
        assert!(matches!(rejections.as_slice(), [RiskRejection::DailyCapExceeded { .. }]));
    }

    #[test]
    fn rejects_excess_slippage() {
        let mut i = inputs();
        i.quoted_price = dec!(0.40);
        i.planned_price = dec!(0.50);
        let rejections = run(&policy(), &breaker(), &i);
        assert!(matches!(rejections.as_slice(), [RiskRejection::SlippageExceeded { .. }]));
    }

    #[test]
    fn rejects_with_stale_book_when_quote_is_missing() {
        let mut i = inputs();
        i.quoted_price = Decimal::ZERO;
        assert_eq!(run(&policy(), &breaker(), &i), vec![RiskRejection::StaleBook]);
    }

    #[test]
    fn rejects_when_breaker_open() {
        let breaker = CircuitBreaker::new(0, Duration::from_secs(60), Duration::from_secs(60));
        let i = inputs();
        breaker.record_emission(&i.rule_id, &i.market_id);
        assert_eq!(run(&policy(), &breaker, &i), vec![RiskRejection::CircuitBreakerOpen]);
    }

    #[test]
    fn accumulates_every_violated_gate_instead_of_short_circuiting() {
        let mut i = inputs();
        i.notional = dec!(501);
        i.open_intents = 5;
        i.quoted_price = Decimal::ZERO;
        let rejections = run(&policy(), &breaker(), &i);
        assert_eq!(rejections.len(), 3);
        assert!(rejections.contains(&RiskRejection::StaleBook));
        assert!(rejections.iter().any(|r| matches!(r, RiskRejection::NotionalCapExceeded { .. })));
        assert!(rejections.iter().any(|r| matches!(r, RiskRejection::OpenIntentCapExceeded { .. })));
    }
}
