//! Persistence traits, one per aggregate. [`sqlite`] backs them with a
//! Diesel/SQLite pool; [`memory`] backs them with plain in-process maps
//! for fast unit and integration tests.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::core::domain::{
    AuditLog, ExecutionPolicy, Market, MarketId, Notional, OrderIntent, PolicyId, RuleDefinition, RuleId,
    RuleKpiDaily, Signal, SynonymGroup, Tick,
};
use crate::error::Result;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait MarketStore: Send + Sync {
    async fn upsert_market(&self, market: &Market) -> Result<()>;
    async fn get_market(&self, id: &MarketId) -> Result<Option<Market>>;
    async fn list_markets(&self) -> Result<Vec<Market>>;
}

#[async_trait]
pub trait TickStore: Send + Sync {
    async fn insert_tick(&self, tick: &Tick) -> Result<()>;
    async fn recent_ticks(&self, market_id: &MarketId, since: DateTime<Utc>) -> Result<Vec<Tick>>;
}

#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn upsert_rule(&self, rule: &RuleDefinition) -> Result<()>;
    async fn list_rules(&self) -> Result<Vec<RuleDefinition>>;
}

#[async_trait]
pub trait SignalStore: Send + Sync {
    async fn insert_signal(&self, signal: &Signal) -> Result<()>;
    async fn list_signals_for_market(&self, market_id: &MarketId, limit: i64) -> Result<Vec<Signal>>;
}

#[async_trait]
pub trait SynonymStore: Send + Sync {
    async fn upsert_group(&self, group: &SynonymGroup) -> Result<()>;
    async fn list_groups(&self) -> Result<Vec<SynonymGroup>>;
}

#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn upsert_policy(&self, policy: &ExecutionPolicy) -> Result<()>;
    async fn get_policy(&self, id: &PolicyId) -> Result<Option<ExecutionPolicy>>;
}

#[async_trait]
pub trait IntentStore: Send + Sync {
    async fn insert_intent(&self, intent: &OrderIntent) -> Result<()>;
    async fn update_intent(&self, intent: &OrderIntent) -> Result<()>;
    async fn count_open_intents(&self) -> Result<u32>;
    async fn daily_notional_so_far(&self, day: NaiveDate) -> Result<Notional>;
}

#[async_trait]
pub trait KpiStore: Send + Sync {
    async fn upsert_kpi(&self, kpi: &RuleKpiDaily) -> Result<()>;
    async fn get_kpi(&self, rule_id: &RuleId, day: NaiveDate) -> Result<Option<RuleKpiDaily>>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn record(&self, log: &AuditLog) -> Result<()>;
}

/// The full persistence surface the application needs, as a single
/// trait object. Blanket-implemented for anything implementing every
/// component trait, so [`SqliteStore`] and [`InMemoryStore`] both
/// satisfy it without extra boilerplate.
pub trait Store:
    MarketStore + TickStore + RuleStore + SignalStore + SynonymStore + PolicyStore + IntentStore + KpiStore + AuditStore
{
}

impl<T> Store for T where
    T: MarketStore + TickStore + RuleStore + SignalStore + SynonymStore + PolicyStore + IntentStore + KpiStore + AuditStore
{
}
