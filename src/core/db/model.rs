//! Diesel row structs. Decimal and enum domain fields are stored as text
//! and parsed back on read — sqlite has no native decimal type, and
//! storing as text keeps the exact decimal representation diesel's own
//! numeric types would lose.

use diesel::prelude::*;

use super::schema::*;

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = markets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketRow {
    pub market_id: String,
    pub title: String,
    pub status: String,
    pub start_ts: Option<i64>,
    pub end_ts: Option<i64>,
    pub tags_json: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = market_options)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketOptionRow {
    pub option_id: String,
    pub market_id: String,
    pub label: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ticks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TickRow {
    pub id: i64,
    pub market_id: String,
    pub option_id: String,
    pub bid: Option<String>,
    pub ask: Option<String>,
    pub last: Option<String>,
    pub volume_24h: Option<String>,
    pub observed_at: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ticks)]
pub struct NewTickRow {
    pub market_id: String,
    pub option_id: String,
    pub bid: Option<String>,
    pub ask: Option<String>,
    pub last: Option<String>,
    pub volume_24h: Option<String>,
    pub observed_at: i64,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = rule_definitions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RuleDefinitionRow {
    pub rule_id: String,
    pub rule_type: String,
    pub enabled: bool,
    pub market_scope_json: String,
    pub params_json: String,
    pub cooldown_secs: i64,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = signals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SignalRow {
    pub signal_id: String,
    pub rule_id: String,
    pub rule_type: String,
    pub market_id: String,
    pub level: String,
    pub edge_score: String,
    pub payload_json: String,
    pub suggested_trade_json: Option<String>,
    pub emitted_at: i64,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = synonym_groups)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SynonymGroupRow {
    pub group_id: String,
    pub method: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = synonym_group_members)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SynonymGroupMemberRow {
    pub id: i64,
    pub group_id: String,
    pub market_id: String,
    pub option_id: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = synonym_group_members)]
pub struct NewSynonymGroupMemberRow {
    pub group_id: String,
    pub market_id: String,
    pub option_id: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = execution_policies)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExecutionPolicyRow {
    pub policy_id: String,
    pub mode: String,
    pub max_notional_per_intent: String,
    pub max_open_intents: i32,
    pub max_daily_notional: String,
    pub max_slippage_bps: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = order_intents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderIntentRow {
    pub intent_id: String,
    pub signal_id: String,
    pub policy_id: String,
    pub status: String,
    pub legs_json: String,
    pub notional: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = rule_kpi_daily)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RuleKpiDailyRow {
    pub rule_id: String,
    pub day: String,
    pub signals_emitted: i64,
    pub intents_created: i64,
    pub intents_filled: i64,
    pub notional_filled: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = audit_log)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AuditLogRow {
    pub id: i64,
    pub actor: String,
    pub action: String,
    pub subject: String,
    pub detail: String,
    pub recorded_at: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_log)]
pub struct NewAuditLogRow {
    pub actor: String,
    pub action: String,
    pub subject: String,
    pub detail: String,
    pub recorded_at: i64,
}
