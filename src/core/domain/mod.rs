//! Pure domain types: markets, ticks, rules, signals, synonym groups,
//! execution policy and order intents. No I/O lives here.

pub mod audit;
pub mod error;
pub mod ids;
pub mod intent;
pub mod kpi;
pub mod market;
pub mod money;
pub mod policy;
pub mod rule_def;
pub mod signal;
pub mod synonym;
pub mod tick;

pub use audit::AuditLog;
pub use error::DomainError;
pub use ids::{GroupId, IntentId, MarketId, OptionId, PolicyId, RuleId, SignalId};
pub use intent::{IntentDetail, IntentStatus, OrderIntent, Side};
pub use kpi::RuleKpiDaily;
pub use market::{Market, MarketOption, MarketStatus};
pub use money::{Notional, Price, Volume};
pub use policy::{ExecutionMode, ExecutionPolicy};
pub use rule_def::{Param, RuleDefinition, RuleType};
pub use signal::{BookSnapshot, Level, Signal, SignalPayload, SuggestedTrade, TradeLeg};
pub use synonym::{SynonymGroup, SynonymMember, SynonymMethod};
pub use tick::Tick;
