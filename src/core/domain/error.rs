//! Domain invariant violations.
//!
//! Raised at aggregate boundaries and rejected before any mutation is
//! applied — the aggregate's prior state is always preserved. Distinct
//! from transient I/O errors, which never reach this type.

use thiserror::Error;

use super::ids::{IntentId, MarketId, OptionId};
use super::intent::IntentStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("option {option} does not belong to market {market}")]
    OptionNotInMarket { market: MarketId, option: OptionId },

    #[error("tick for ({market}, {option}) at ts={new_ts} regresses before last written ts={last_ts}")]
    TickOutOfOrder {
        market: MarketId,
        option: OptionId,
        last_ts: i64,
        new_ts: i64,
    },

    #[error("intent {intent} cannot transition from {from:?} to {to:?}")]
    IllegalIntentTransition {
        intent: IntentId,
        from: IntentStatus,
        to: IntentStatus,
    },

    #[error("signal level {0:?} is not eligible for intent creation")]
    SignalNotActionable(super::signal::Level),

    #[error("rule definition is disabled: {0}")]
    RuleDisabled(super::ids::RuleId),

    #[error("empty trade plan")]
    EmptyPlan,
}
