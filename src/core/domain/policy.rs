//! Execution policy: the risk envelope that gates intent creation and
//! confirmation.

use rust_decimal::Decimal;

use super::ids::PolicyId;
use super::money::Notional;

/// How aggressively an [`super::intent::OrderIntent`] may be advanced once
/// suggested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Intents are suggested only; an operator must confirm every one.
    Manual,
    /// Intents below a configured notional auto-confirm; larger ones wait
    /// on an operator.
    SemiAuto,
    /// Intents auto-confirm whenever the risk gauntlet passes.
    Auto,
}

/// The risk envelope applied by the intent pipeline's risk gauntlet.
#[derive(Debug, Clone)]
pub struct ExecutionPolicy {
    policy_id: PolicyId,
    mode: ExecutionMode,
    max_notional_per_intent: Notional,
    max_open_intents: u32,
    max_daily_notional: Notional,
    max_slippage_bps: Decimal,
}

impl ExecutionPolicy {
    #[must_use]
    pub fn new(
        policy_id: PolicyId,
        mode: ExecutionMode,
        max_notional_per_intent: Notional,
        max_open_intents: u32,
        max_daily_notional: Notional,
        max_slippage_bps: Decimal,
    ) -> Self {
        Self {
            policy_id,
            mode,
            max_notional_per_intent,
            max_open_intents,
            max_daily_notional,
            max_slippage_bps,
        }
    }

    #[must_use]
    pub const fn policy_id(&self) -> &PolicyId {
        &self.policy_id
    }

    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }

    #[must_use]
    pub const fn max_notional_per_intent(&self) -> Notional {
        self.max_notional_per_intent
    }

    #[must_use]
    pub const fn max_open_intents(&self) -> u32 {
        self.max_open_intents
    }

    #[must_use]
    pub const fn max_daily_notional(&self) -> Notional {
        self.max_daily_notional
    }

    #[must_use]
    pub const fn max_slippage_bps(&self) -> Decimal {
        self.max_slippage_bps
    }

    /// `true` if `notional` auto-confirms without operator sign-off under
    /// this policy's mode.
    #[must_use]
    pub fn auto_confirms(&self, notional: Notional) -> bool {
        match self.mode {
            ExecutionMode::Manual => false,
            ExecutionMode::Auto => true,
            ExecutionMode::SemiAuto => notional <= self.max_notional_per_intent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn policy(mode: ExecutionMode) -> ExecutionPolicy {
        ExecutionPolicy::new(
            PolicyId::new("p1"),
            mode,
            dec!(500),
            5,
            dec!(5000),
            dec!(50),
        )
    }

    #[test]
    fn manual_never_auto_confirms() {
        assert!(!policy(ExecutionMode::Manual).auto_confirms(dec!(1)));
    }

    #[test]
    fn auto_always_auto_confirms() {
        assert!(policy(ExecutionMode::Auto).auto_confirms(dec!(10_000)));
    }

    #[test]
    fn semi_auto_confirms_only_below_per_intent_cap() {
        let p = policy(ExecutionMode::SemiAuto);
        assert!(p.auto_confirms(dec!(500)));
        assert!(!p.auto_confirms(dec!(500.01)));
    }
}
