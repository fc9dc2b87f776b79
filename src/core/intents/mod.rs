//! Intent/risk pipeline: turns an actionable signal into a risk-gated
//! [`OrderIntent`], then advances it through confirmation.

pub mod planner;
pub mod risk;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::core::domain::{DomainError, ExecutionPolicy, IntentId, IntentStatus, OrderIntent, Signal};
use crate::core::metrics::Metrics;
use crate::core::rules::CircuitBreaker;

pub use planner::{PlannerRegistry, SumLt1Planner, SuggestedTradePlanner};
pub use risk::{RiskInputs, RiskRejection};

/// Why a candidate intent was never created.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntentError {
    #[error("signal is not actionable: {0}")]
    NotActionable(#[from] DomainError),

    #[error("no trade plan available for this signal")]
    NoPlan,
}

/// World state the gauntlet needs, gathered by the caller (normally from
/// the store) before calling [`IntentService::create_intent`].
pub struct IntentWorldState {
    pub open_intents: u32,
    pub daily_notional_so_far: rust_decimal::Decimal,
    pub quoted_price: Decimal,
}

pub struct IntentService {
    planners: PlannerRegistry,
    breaker: Arc<CircuitBreaker>,
    metrics: Metrics,
}

impl IntentService {
    #[must_use]
    pub fn new(planners: PlannerRegistry, breaker: Arc<CircuitBreaker>, metrics: Metrics) -> Self {
        Self {
            planners,
            breaker,
            metrics,
        }
    }

    /// Plan and persist a candidate intent from `signal`, ungated by any
    /// risk check. Always returns the intent in `IntentStatus::Suggested`;
    /// call [`Self::confirm_intent`] to run the risk gauntlet and move it
    /// forward.
    pub fn create_intent(&self, signal: &Signal, policy: &ExecutionPolicy, now: DateTime<Utc>) -> Result<OrderIntent, IntentError> {
        if !signal.is_actionable() {
            return Err(IntentError::NotActionable(DomainError::SignalNotActionable(signal.level())));
        }

        let (legs, notional) = self.planners.plan(signal).ok_or(IntentError::NoPlan)?;
        let intent = OrderIntent::new(
            IntentId::new(Uuid::new_v4().to_string()),
            signal.signal_id().clone(),
            policy.policy_id().clone(),
            legs,
            notional,
            now,
        );
        self.metrics.record_order_intent("suggested");
        Ok(intent)
    }

    /// Run the full risk gauntlet against a `Suggested` intent,
    /// accumulating every violated gate. A failing gauntlet moves the
    /// intent to a terminal `Rejected` with all reasons recorded in
    /// [`OrderIntent::rejection_reasons`] — this is a normal outcome, not
    /// an `Err`. A passing gauntlet advances `Suggested -> Sent ->
    /// Filled` in the same call, recording `fill_price` from the first
    /// leg's price (synthetic/mock fill; live venues would acknowledge
    /// the `Sent` order before this crate learns of a fill).
    ///
    /// Returns `Err` only for an illegal call — confirming an intent
    /// that isn't currently `Suggested`.
    pub fn confirm_intent(
        &self,
        intent: &mut OrderIntent,
        policy: &ExecutionPolicy,
        inputs: &RiskInputs,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let failures = risk::run(policy, &self.breaker, inputs);
        if !failures.is_empty() {
            let reasons = failures.iter().map(|f| f.reason_code().to_string()).collect();
            intent.reject(reasons, now)?;
            self.metrics.record_order_intent("rejected");
            return Ok(());
        }

        intent.transition(IntentStatus::Sent, now)?;
        self.metrics.record_order_intent("sent");

        let fill_price = intent.legs().first().map_or(Decimal::ZERO, |leg| leg.price);
        intent.fill(fill_price, now).expect("sent always transitions to filled");
        self.metrics.record_order_intent("filled");

        Ok(())
    }

    /// Expire any intent that has sat in `Suggested` or `Sent` longer
    /// than `max_age`.
    pub fn expire_stale(&self, intent: &mut OrderIntent, now: DateTime<Utc>, max_age: Duration) -> bool {
        let age = now - intent.created_at();
        if age > chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX) {
            if intent.transition(IntentStatus::Expired, now).is_ok() {
                self.metrics.record_order_intent("expired");
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{BookSnapshot, ExecutionMode, Level, MarketId, OptionId, PolicyId, RuleId, RuleType, SignalId, SignalPayload};
    use rust_decimal_macros::dec;

    fn service() -> IntentService {
        let mut planners = PlannerRegistry::new();
        planners.register(Box::new(SumLt1Planner { leg_size: dec!(10) }));
        let breaker = Arc::new(CircuitBreaker::new(3, Duration::from_secs(60), Duration::from_secs(60)));
        IntentService::new(planners, breaker, Metrics::new())
    }

    fn policy(mode: ExecutionMode) -> ExecutionPolicy {
        ExecutionPolicy::new(PolicyId::new("p1"), mode, dec!(500), 5, dec!(5000), dec!(50))
    }

    fn actionable_signal() -> Signal {
        Signal::new(
            SignalId::new("s1"),
            RuleId::new("r1"),
            RuleType::SumLt1,
            MarketId::new("m1"),
            Level::P1,
            SignalPayload::SumLt1 {
                sum: dec!(0.9),
                threshold: dec!(0.97),
                books: vec![BookSnapshot {
                    option_id: OptionId::new("yes"),
                    bid: Some(dec!(0.44)),
                    ask: Some(dec!(0.45)),
                }],
            },
            Utc::now(),
        )
    }

    fn risk_inputs(signal: &Signal, notional: rust_decimal::Decimal, quoted_price: rust_decimal::Decimal) -> RiskInputs {
        RiskInputs {
            rule_id: signal.rule_id().clone(),
            market_id: signal.market_id().clone(),
            notional,
            open_intents: 0,
            daily_notional_so_far: dec!(0),
            quoted_price,
            planned_price: quoted_price,
        }
    }

    #[test]
    fn rejects_non_actionable_signal() {
        let mut signal = actionable_signal();
        signal = Signal::new(
            signal.signal_id().clone(),
            signal.rule_id().clone(),
            signal.rule_type(),
            signal.market_id().clone(),
            Level::P3,
            signal.payload().clone(),
            signal.emitted_at(),
        );
        let result = service().create_intent(&signal, &policy(ExecutionMode::Auto), Utc::now());
        assert!(matches!(result, Err(IntentError::NotActionable(_))));
    }

    #[test]
    fn create_intent_is_ungated_and_always_leaves_intent_suggested() {
        let intent = service()
            .create_intent(&actionable_signal(), &policy(ExecutionMode::Auto), Utc::now())
            .unwrap();
        assert_eq!(intent.status(), IntentStatus::Suggested);
        assert!(intent.rejection_reasons().is_empty());
    }

    #[test]
    fn confirm_intent_fills_in_the_same_call_when_the_gauntlet_passes() {
        let svc = service();
        let signal = actionable_signal();
        let policy = policy(ExecutionMode::Manual);
        let mut intent = svc.create_intent(&signal, &policy, Utc::now()).unwrap();
        let inputs = risk_inputs(&signal, intent.notional(), dec!(0.45));

        svc.confirm_intent(&mut intent, &policy, &inputs, Utc::now()).unwrap();

        assert_eq!(intent.status(), IntentStatus::Filled);
        assert_eq!(intent.fill_price(), Some(dec!(0.45)));
    }

    #[test]
    fn confirm_intent_rejects_and_records_every_violated_gate() {
        let svc = service();
        let signal = actionable_signal();
        let policy = policy(ExecutionMode::Manual);
        let mut intent = svc.create_intent(&signal, &policy, Utc::now()).unwrap();
        let mut inputs = risk_inputs(&signal, intent.notional(), dec!(0.45));
        inputs.notional = dec!(501);
        inputs.open_intents = 5;

        svc.confirm_intent(&mut intent, &policy, &inputs, Utc::now()).unwrap();

        assert_eq!(intent.status(), IntentStatus::Rejected);
        assert!(intent.rejection_reasons().contains(&"notional_cap_exceeded".to_string()));
        assert!(intent.rejection_reasons().contains(&"open_intent_cap_exceeded".to_string()));
    }

    #[test]
    fn confirm_intent_rejects_with_stale_book_when_quote_is_missing() {
        let svc = service();
        let signal = actionable_signal();
        let policy = policy(ExecutionMode::Manual);
        let mut intent = svc.create_intent(&signal, &policy, Utc::now()).unwrap();
        let mut inputs = risk_inputs(&signal, intent.notional(), dec!(0.45));
        inputs.quoted_price = Decimal::ZERO;

        svc.confirm_intent(&mut intent, &policy, &inputs, Utc::now()).unwrap();

        assert_eq!(intent.status(), IntentStatus::Rejected);
        assert_eq!(intent.rejection_reasons(), ["stale_book"]);
    }

    #[test]
    fn expire_stale_expires_old_suggested_intent() {
        let mut intent = service()
            .create_intent(&actionable_signal(), &policy(ExecutionMode::Manual), Utc::now())
            .unwrap();
        let later = Utc::now() + chrono::Duration::hours(2);
        assert!(service().expire_stale(&mut intent, later, Duration::from_secs(3600)));
        assert_eq!(intent.status(), IntentStatus::Expired);
    }
}
