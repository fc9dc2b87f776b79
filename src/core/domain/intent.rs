//! Order intents: the output of the intent/risk pipeline.

use chrono::{DateTime, Utc};

use super::ids::{IntentId, PolicyId, SignalId};
use super::money::{Notional, Price, Volume};

/// Buy or sell side of an [`OrderIntent`] leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

/// Lifecycle status of an [`OrderIntent`]. Transitions are one-directional:
/// `Suggested -> Sent -> Filled`, or `Suggested -> Rejected`, or
/// `Suggested | Sent -> Expired`. Any other transition is a domain error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Suggested,
    Sent,
    Filled,
    Rejected,
    Expired,
}

impl IntentStatus {
    /// `true` if moving from `self` to `next` is a legal lifecycle
    /// transition.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use IntentStatus::{Expired, Filled, Rejected, Sent, Suggested};
        matches!(
            (self, next),
            (Suggested, Sent)
                | (Suggested, Rejected)
                | (Suggested, Expired)
                | (Sent, Filled)
                | (Sent, Expired)
        )
    }
}

/// One leg of an order intent's trade detail.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IntentDetail {
    pub option_id: super::ids::OptionId,
    pub side: Side,
    pub price: Price,
    pub size: Volume,
}

/// A concrete, risk-gated proposal to trade, derived from one actionable
/// [`super::signal::Signal`].
#[derive(Debug, Clone)]
pub struct OrderIntent {
    intent_id: IntentId,
    signal_id: SignalId,
    policy_id: PolicyId,
    status: IntentStatus,
    legs: Vec<IntentDetail>,
    notional: Notional,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    rejection_reasons: Vec<String>,
    fill_price: Option<Price>,
}

impl OrderIntent {
    #[must_use]
    pub fn new(
        intent_id: IntentId,
        signal_id: SignalId,
        policy_id: PolicyId,
        legs: Vec<IntentDetail>,
        notional: Notional,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            intent_id,
            signal_id,
            policy_id,
            status: IntentStatus::Suggested,
            legs,
            notional,
            created_at,
            updated_at: created_at,
            rejection_reasons: Vec::new(),
            fill_price: None,
        }
    }

    #[must_use]
    pub const fn intent_id(&self) -> &IntentId {
        &self.intent_id
    }

    #[must_use]
    pub const fn signal_id(&self) -> &SignalId {
        &self.signal_id
    }

    #[must_use]
    pub const fn policy_id(&self) -> &PolicyId {
        &self.policy_id
    }

    #[must_use]
    pub const fn status(&self) -> IntentStatus {
        self.status
    }

    #[must_use]
    pub fn legs(&self) -> &[IntentDetail] {
        &self.legs
    }

    #[must_use]
    pub const fn notional(&self) -> Notional {
        self.notional
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn rejection_reasons(&self) -> &[String] {
        &self.rejection_reasons
    }

    #[must_use]
    pub const fn fill_price(&self) -> Option<Price> {
        self.fill_price
    }

    /// Attempt a lifecycle transition, rejecting illegal ones at the
    /// boundary and leaving `self` unmodified on failure.
    pub fn transition(
        &mut self,
        next: IntentStatus,
        at: DateTime<Utc>,
    ) -> Result<(), super::error::DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(super::error::DomainError::IllegalIntentTransition {
                intent: self.intent_id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = at;
        Ok(())
    }

    /// Transition to `Rejected`, recording every violated risk gate.
    pub fn reject(&mut self, reasons: Vec<String>, at: DateTime<Utc>) -> Result<(), super::error::DomainError> {
        self.transition(IntentStatus::Rejected, at)?;
        self.rejection_reasons = reasons;
        Ok(())
    }

    /// Transition to `Filled`, recording the price it filled at.
    pub fn fill(&mut self, fill_price: Price, at: DateTime<Utc>) -> Result<(), super::error::DomainError> {
        self.transition(IntentStatus::Filled, at)?;
        self.fill_price = Some(fill_price);
        Ok(())
    }
}
