//! The `Predicate` trait: one implementation per [`RuleType`], mirroring
//! the engine's closed-set-of-rule-types design.

use rust_decimal::Decimal;

use crate::core::domain::{RuleType, Signal};

use super::context::RuleContext;

/// Clamp a raw predicate measurement into `[0, 1]` for use as a signal's
/// `edge_score`.
#[must_use]
pub fn clamp01(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE)
}

/// A single rule type's detection logic. Implementations are pure
/// functions of their [`RuleContext`] — no implementation performs I/O or
/// holds mutable state across calls; cross-cycle state (cooldowns, the
/// circuit breaker) is owned by the engine instead.
pub trait Predicate: Send + Sync {
    /// The rule type this predicate implements.
    fn rule_type(&self) -> RuleType;

    /// Evaluate `ctx` and return zero or more signals. A predicate may
    /// emit more than one signal per cycle (for example, one per market in
    /// scope that currently violates the rule).
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Signal>;
}

/// Holds one predicate per [`RuleType`] and dispatches evaluation to the
/// one matching a given [`crate::core::domain::RuleDefinition`].
#[derive(Default)]
pub struct PredicateRegistry {
    predicates: Vec<Box<dyn Predicate>>,
}

impl PredicateRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, predicate: Box<dyn Predicate>) {
        self.predicates.push(predicate);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    #[must_use]
    pub fn get(&self, rule_type: RuleType) -> Option<&dyn Predicate> {
        self.predicates
            .iter()
            .find(|p| p.rule_type() == rule_type)
            .map(std::convert::AsRef::as_ref)
    }

    /// Evaluate `ctx` against whichever registered predicate matches
    /// `ctx.rule.rule_type()`; returns an empty vec if none is registered.
    #[must_use]
    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Signal> {
        self.get(ctx.rule.rule_type())
            .map(|p| p.evaluate(ctx))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysEmpty;
    impl Predicate for AlwaysEmpty {
        fn rule_type(&self) -> RuleType {
            RuleType::SumLt1
        }

        fn evaluate(&self, _ctx: &RuleContext<'_>) -> Vec<Signal> {
            Vec::new()
        }
    }

    #[test]
    fn registry_starts_empty() {
        let registry = PredicateRegistry::new();
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_finds_predicate_by_rule_type() {
        let mut registry = PredicateRegistry::new();
        registry.register(Box::new(AlwaysEmpty));
        assert!(registry.get(RuleType::SumLt1).is_some());
        assert!(registry.get(RuleType::SpikeDetect).is_none());
        assert_eq!(registry.len(), 1);
    }
}
