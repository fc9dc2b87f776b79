//! Diesel/SQLite-backed implementation of the store traits.
//!
//! Each method borrows a pooled connection and runs a handful of
//! synchronous Diesel calls inside `spawn_blocking`, since Diesel has no
//! native async driver for sqlite.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use crate::core::db::{convert, model::*, schema, DbPool};
use crate::core::domain::{
    AuditLog, ExecutionPolicy, Market, MarketId, Notional, OrderIntent, PolicyId, RuleDefinition, RuleId,
    RuleKpiDaily, Signal, SynonymGroup, Tick,
};
use crate::error::{Error, Result};

use super::{AuditStore, IntentStore, KpiStore, MarketStore, PolicyStore, RuleStore, SignalStore, SynonymStore, TickStore};

/// Store backed by a pooled sqlite connection, used in production.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>> {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }
}

async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Database(e.to_string()))?
}

#[async_trait]
impl MarketStore for SqliteStore {
    async fn upsert_market(&self, market: &Market) -> Result<()> {
        let store = self.clone();
        let market = market.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let row = convert::market_to_row(&market)?;
            diesel::insert_into(schema::markets::table)
                .values(&row)
                .on_conflict(schema::markets::market_id)
                .do_update()
                .set(&row)
                .execute(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            diesel::delete(schema::market_options::table)
                .filter(schema::market_options::market_id.eq(market.market_id().as_str()))
                .execute(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            for opt_row in convert::market_option_rows(&market) {
                diesel::insert_into(schema::market_options::table)
                    .values(&opt_row)
                    .execute(&mut conn)
                    .map_err(|e| Error::Database(e.to_string()))?;
            }
            Ok(())
        })
        .await
    }

    async fn get_market(&self, id: &MarketId) -> Result<Option<Market>> {
        let store = self.clone();
        let id = id.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let row = schema::markets::table
                .filter(schema::markets::market_id.eq(id.as_str()))
                .first::<MarketRow>(&mut conn)
                .optional()
                .map_err(|e| Error::Database(e.to_string()))?;
            let Some(row) = row else { return Ok(None) };
            let options = schema::market_options::table
                .filter(schema::market_options::market_id.eq(id.as_str()))
                .load::<MarketOptionRow>(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(Some(convert::row_to_market(row, options)?))
        })
        .await
    }

    async fn list_markets(&self) -> Result<Vec<Market>> {
        let store = self.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let rows = schema::markets::table
                .load::<MarketRow>(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            let mut markets = Vec::with_capacity(rows.len());
            for row in rows {
                let options = schema::market_options::table
                    .filter(schema::market_options::market_id.eq(&row.market_id))
                    .load::<MarketOptionRow>(&mut conn)
                    .map_err(|e| Error::Database(e.to_string()))?;
                markets.push(convert::row_to_market(row, options)?);
            }
            Ok(markets)
        })
        .await
    }
}

#[async_trait]
impl TickStore for SqliteStore {
    async fn insert_tick(&self, tick: &Tick) -> Result<()> {
        let store = self.clone();
        let tick = tick.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let row = convert::tick_to_new_row(&tick);
            diesel::insert_into(schema::ticks::table)
                .values(&row)
                .execute(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn recent_ticks(&self, market_id: &MarketId, since: DateTime<Utc>) -> Result<Vec<Tick>> {
        let store = self.clone();
        let market_id = market_id.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let rows = schema::ticks::table
                .filter(schema::ticks::market_id.eq(market_id.as_str()))
                .filter(schema::ticks::observed_at.ge(since.timestamp()))
                .order(schema::ticks::observed_at.asc())
                .load::<TickRow>(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            rows.into_iter().map(convert::row_to_tick).collect()
        })
        .await
    }
}

#[async_trait]
impl RuleStore for SqliteStore {
    async fn upsert_rule(&self, rule: &RuleDefinition) -> Result<()> {
        let store = self.clone();
        let rule = rule.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let row = convert::rule_to_row(&rule)?;
            diesel::insert_into(schema::rule_definitions::table)
                .values(&row)
                .on_conflict(schema::rule_definitions::rule_id)
                .do_update()
                .set(&row)
                .execute(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn list_rules(&self) -> Result<Vec<RuleDefinition>> {
        let store = self.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let rows = schema::rule_definitions::table
                .load::<RuleDefinitionRow>(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            rows.into_iter().map(convert::row_to_rule).collect()
        })
        .await
    }
}

#[async_trait]
impl SignalStore for SqliteStore {
    async fn insert_signal(&self, signal: &Signal) -> Result<()> {
        let store = self.clone();
        let signal = signal.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let row = convert::signal_to_row(&signal)?;
            diesel::insert_into(schema::signals::table)
                .values(&row)
                .execute(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn list_signals_for_market(&self, market_id: &MarketId, limit: i64) -> Result<Vec<Signal>> {
        let store = self.clone();
        let market_id = market_id.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let rows = schema::signals::table
                .filter(schema::signals::market_id.eq(market_id.as_str()))
                .order(schema::signals::emitted_at.desc())
                .limit(limit)
                .load::<SignalRow>(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            rows.into_iter().map(convert::row_to_signal).collect()
        })
        .await
    }
}

#[async_trait]
impl SynonymStore for SqliteStore {
    async fn upsert_group(&self, group: &SynonymGroup) -> Result<()> {
        let store = self.clone();
        let group = group.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let row = convert::synonym_group_row(&group);
            diesel::insert_into(schema::synonym_groups::table)
                .values(&row)
                .on_conflict(schema::synonym_groups::group_id)
                .do_update()
                .set(schema::synonym_groups::method.eq(&row.method))
                .execute(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            diesel::delete(schema::synonym_group_members::table)
                .filter(schema::synonym_group_members::group_id.eq(group.group_id().as_str()))
                .execute(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            for member_row in convert::synonym_member_new_rows(&group) {
                diesel::insert_into(schema::synonym_group_members::table)
                    .values(&member_row)
                    .execute(&mut conn)
                    .map_err(|e| Error::Database(e.to_string()))?;
            }
            Ok(())
        })
        .await
    }

    async fn list_groups(&self) -> Result<Vec<SynonymGroup>> {
        let store = self.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let rows = schema::synonym_groups::table
                .load::<SynonymGroupRow>(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            let mut groups = Vec::with_capacity(rows.len());
            for row in rows {
                let members = schema::synonym_group_members::table
                    .filter(schema::synonym_group_members::group_id.eq(&row.group_id))
                    .load::<SynonymGroupMemberRow>(&mut conn)
                    .map_err(|e| Error::Database(e.to_string()))?;
                groups.push(convert::row_to_synonym_group(row, members)?);
            }
            Ok(groups)
        })
        .await
    }
}

#[async_trait]
impl PolicyStore for SqliteStore {
    async fn upsert_policy(&self, policy: &ExecutionPolicy) -> Result<()> {
        let store = self.clone();
        let policy = policy.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let row = convert::policy_to_row(&policy);
            diesel::insert_into(schema::execution_policies::table)
                .values(&row)
                .on_conflict(schema::execution_policies::policy_id)
                .do_update()
                .set(&row)
                .execute(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn get_policy(&self, id: &PolicyId) -> Result<Option<ExecutionPolicy>> {
        let store = self.clone();
        let id = id.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let row = schema::execution_policies::table
                .filter(schema::execution_policies::policy_id.eq(id.as_str()))
                .first::<ExecutionPolicyRow>(&mut conn)
                .optional()
                .map_err(|e| Error::Database(e.to_string()))?;
            row.map(convert::row_to_policy).transpose()
        })
        .await
    }
}

#[async_trait]
impl IntentStore for SqliteStore {
    async fn insert_intent(&self, intent: &OrderIntent) -> Result<()> {
        let store = self.clone();
        let intent = intent.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let row = convert::intent_to_row(&intent)?;
            diesel::insert_into(schema::order_intents::table)
                .values(&row)
                .execute(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn update_intent(&self, intent: &OrderIntent) -> Result<()> {
        let store = self.clone();
        let intent = intent.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let row = convert::intent_to_row(&intent)?;
            diesel::update(schema::order_intents::table.filter(schema::order_intents::intent_id.eq(&row.intent_id)))
                .set(&row)
                .execute(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn count_open_intents(&self) -> Result<u32> {
        let store = self.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let count: i64 = schema::order_intents::table
                .filter(
                    schema::order_intents::status
                        .eq("suggested")
                        .or(schema::order_intents::status.eq("sent")),
                )
                .count()
                .get_result(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(count as u32)
        })
        .await
    }

    async fn daily_notional_so_far(&self, day: NaiveDate) -> Result<Notional> {
        let store = self.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let start = day.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
            let end = start + 86_400;
            let rows = schema::order_intents::table
                .filter(schema::order_intents::created_at.ge(start))
                .filter(schema::order_intents::created_at.lt(end))
                .select(schema::order_intents::notional)
                .load::<String>(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            let mut total = Notional::ZERO;
            for s in rows {
                total += s.parse::<rust_decimal::Decimal>().map_err(|e| Error::Parse(e.to_string()))?;
            }
            Ok(total)
        })
        .await
    }
}

#[async_trait]
impl KpiStore for SqliteStore {
    async fn upsert_kpi(&self, kpi: &RuleKpiDaily) -> Result<()> {
        let store = self.clone();
        let kpi = kpi.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let row = convert::kpi_to_row(&kpi);
            diesel::insert_into(schema::rule_kpi_daily::table)
                .values(&row)
                .on_conflict((schema::rule_kpi_daily::rule_id, schema::rule_kpi_daily::day))
                .do_update()
                .set(&row)
                .execute(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn get_kpi(&self, rule_id: &RuleId, day: NaiveDate) -> Result<Option<RuleKpiDaily>> {
        let store = self.clone();
        let rule_id = rule_id.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let row = schema::rule_kpi_daily::table
                .filter(schema::rule_kpi_daily::rule_id.eq(rule_id.as_str()))
                .filter(schema::rule_kpi_daily::day.eq(day.format("%Y-%m-%d").to_string()))
                .first::<RuleKpiDailyRow>(&mut conn)
                .optional()
                .map_err(|e| Error::Database(e.to_string()))?;
            row.map(convert::row_to_kpi).transpose()
        })
        .await
    }
}

#[async_trait]
impl AuditStore for SqliteStore {
    async fn record(&self, log: &AuditLog) -> Result<()> {
        let store = self.clone();
        let log = log.clone();
        blocking(move || {
            let mut conn = store.conn()?;
            let row = convert::audit_to_new_row(&log);
            diesel::insert_into(schema::audit_log::table)
                .values(&row)
                .execute(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::create_pool;
    use crate::core::domain::{MarketStatus, RuleType};
    use rust_decimal_macros::dec;

    fn store() -> SqliteStore {
        SqliteStore::new(create_pool(":memory:").unwrap())
    }

    #[tokio::test]
    async fn market_roundtrips_through_store() {
        let store = store();
        let market = Market::new(MarketId::new("m1"), "Will it rain?", MarketStatus::Open)
            .with_tags(vec!["weather".into()]);
        store.upsert_market(&market).await.unwrap();
        let fetched = store.get_market(&MarketId::new("m1")).await.unwrap().unwrap();
        assert_eq!(fetched.title(), "Will it rain?");
        assert_eq!(fetched.tags(), &["weather".to_string()]);
    }

    #[tokio::test]
    async fn rule_roundtrips_with_params() {
        let store = store();
        let rule = RuleDefinition::new(RuleId::new("r1"), RuleType::SumLt1).with_param("threshold", dec!(0.97));
        store.upsert_rule(&rule).await.unwrap();
        let rules = store.list_rules().await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].param_or("threshold", dec!(1)), dec!(0.97));
    }

    #[tokio::test]
    async fn intent_store_counts_open_intents() {
        let store = store();
        let intent = OrderIntent::new(
            crate::core::domain::IntentId::new("i1"),
            crate::core::domain::SignalId::new("s1"),
            PolicyId::new("p1"),
            vec![],
            dec!(10),
            Utc::now(),
        );
        store.insert_intent(&intent).await.unwrap();
        assert_eq!(store.count_open_intents().await.unwrap(), 1);
    }
}
