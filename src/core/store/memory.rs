//! In-memory store implementations, used by tests and by any deployment
//! that runs without persistence.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;

use crate::core::domain::{
    AuditLog, ExecutionPolicy, Market, MarketId, Notional, OrderIntent, PolicyId, RuleDefinition, RuleId,
    RuleKpiDaily, Signal, SynonymGroup, Tick,
};
use crate::error::Result;

use super::{AuditStore, IntentStore, KpiStore, MarketStore, PolicyStore, RuleStore, SignalStore, SynonymStore, TickStore};

/// A fully in-memory implementation of every store trait, backed by
/// concurrent maps. Never persists across process restarts.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    markets: Arc<DashMap<MarketId, Market>>,
    ticks: Arc<DashMap<MarketId, Vec<Tick>>>,
    rules: Arc<DashMap<RuleId, RuleDefinition>>,
    signals: Arc<DashMap<MarketId, Vec<Signal>>>,
    synonym_groups: Arc<DashMap<String, SynonymGroup>>,
    policies: Arc<DashMap<PolicyId, ExecutionPolicy>>,
    intents: Arc<DashMap<String, OrderIntent>>,
    kpis: Arc<DashMap<(RuleId, NaiveDate), RuleKpiDaily>>,
    audit_log: Arc<std::sync::Mutex<Vec<AuditLog>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MarketStore for InMemoryStore {
    async fn upsert_market(&self, market: &Market) -> Result<()> {
        self.markets.insert(market.market_id().clone(), market.clone());
        Ok(())
    }

    async fn get_market(&self, id: &MarketId) -> Result<Option<Market>> {
        Ok(self.markets.get(id).map(|m| m.clone()))
    }

    async fn list_markets(&self) -> Result<Vec<Market>> {
        Ok(self.markets.iter().map(|e| e.value().clone()).collect())
    }
}

#[async_trait]
impl TickStore for InMemoryStore {
    async fn insert_tick(&self, tick: &Tick) -> Result<()> {
        self.ticks.entry(tick.market_id().clone()).or_default().push(tick.clone());
        Ok(())
    }

    async fn recent_ticks(&self, market_id: &MarketId, since: DateTime<Utc>) -> Result<Vec<Tick>> {
        Ok(self
            .ticks
            .get(market_id)
            .map(|v| v.iter().filter(|t| t.observed_at() >= since).cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl RuleStore for InMemoryStore {
    async fn upsert_rule(&self, rule: &RuleDefinition) -> Result<()> {
        self.rules.insert(rule.rule_id().clone(), rule.clone());
        Ok(())
    }

    async fn list_rules(&self) -> Result<Vec<RuleDefinition>> {
        Ok(self.rules.iter().map(|e| e.value().clone()).collect())
    }
}

#[async_trait]
impl SignalStore for InMemoryStore {
    async fn insert_signal(&self, signal: &Signal) -> Result<()> {
        self.signals.entry(signal.market_id().clone()).or_default().push(signal.clone());
        Ok(())
    }

    async fn list_signals_for_market(&self, market_id: &MarketId, limit: i64) -> Result<Vec<Signal>> {
        Ok(self
            .signals
            .get(market_id)
            .map(|v| {
                let mut sorted = v.clone();
                sorted.sort_by_key(|s| std::cmp::Reverse(s.emitted_at()));
                sorted.truncate(limit.max(0) as usize);
                sorted
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl SynonymStore for InMemoryStore {
    async fn upsert_group(&self, group: &SynonymGroup) -> Result<()> {
        self.synonym_groups.insert(group.group_id().as_str().to_owned(), group.clone());
        Ok(())
    }

    async fn list_groups(&self) -> Result<Vec<SynonymGroup>> {
        Ok(self.synonym_groups.iter().map(|e| e.value().clone()).collect())
    }
}

#[async_trait]
impl PolicyStore for InMemoryStore {
    async fn upsert_policy(&self, policy: &ExecutionPolicy) -> Result<()> {
        self.policies.insert(policy.policy_id().clone(), policy.clone());
        Ok(())
    }

    async fn get_policy(&self, id: &PolicyId) -> Result<Option<ExecutionPolicy>> {
        Ok(self.policies.get(id).map(|p| p.clone()))
    }
}

#[async_trait]
impl IntentStore for InMemoryStore {
    async fn insert_intent(&self, intent: &OrderIntent) -> Result<()> {
        self.intents.insert(intent.intent_id().as_str().to_owned(), intent.clone());
        Ok(())
    }

    async fn update_intent(&self, intent: &OrderIntent) -> Result<()> {
        self.intents.insert(intent.intent_id().as_str().to_owned(), intent.clone());
        Ok(())
    }

    async fn count_open_intents(&self) -> Result<u32> {
        use crate::core::domain::IntentStatus;
        Ok(self
            .intents
            .iter()
            .filter(|e| matches!(e.value().status(), IntentStatus::Suggested | IntentStatus::Sent))
            .count() as u32)
    }

    async fn daily_notional_so_far(&self, day: NaiveDate) -> Result<Notional> {
        let mut total = Notional::ZERO;
        for entry in self.intents.iter() {
            if entry.value().created_at().date_naive() == day {
                total += entry.value().notional();
            }
        }
        Ok(total)
    }
}

#[async_trait]
impl KpiStore for InMemoryStore {
    async fn upsert_kpi(&self, kpi: &RuleKpiDaily) -> Result<()> {
        self.kpis.insert((kpi.rule_id().clone(), kpi.day()), kpi.clone());
        Ok(())
    }

    async fn get_kpi(&self, rule_id: &RuleId, day: NaiveDate) -> Result<Option<RuleKpiDaily>> {
        Ok(self.kpis.get(&(rule_id.clone(), day)).map(|k| k.clone()))
    }
}

#[async_trait]
impl AuditStore for InMemoryStore {
    async fn record(&self, log: &AuditLog) -> Result<()> {
        self.audit_log.lock().expect("audit log lock poisoned").push(log.clone());
        Ok(())
    }
}
