//! Row <-> domain conversions shared by the sqlite store.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::core::domain::{
    AuditLog, ExecutionMode, ExecutionPolicy, GroupId, IntentDetail, IntentId, IntentStatus, Level, Market,
    MarketId, MarketOption, MarketStatus, OptionId, OrderIntent, PolicyId, RuleDefinition, RuleId,
    RuleKpiDaily, RuleType, Signal, SignalId, SignalPayload, SuggestedTrade, SynonymGroup, SynonymMember,
    SynonymMethod, Tick,
};
use crate::error::{Error, Result};

use super::model::{
    AuditLogRow, ExecutionPolicyRow, MarketOptionRow, MarketRow, NewAuditLogRow, NewSynonymGroupMemberRow,
    NewTickRow, OrderIntentRow, RuleDefinitionRow, RuleKpiDailyRow, SignalRow, SynonymGroupMemberRow,
    SynonymGroupRow, TickRow,
};

fn parse_decimal(s: &str) -> Result<Decimal> {
    Decimal::from_str(s).map_err(|e| Error::Parse(e.to_string()))
}

fn ts_to_secs(ts: DateTime<Utc>) -> i64 {
    ts.timestamp()
}

fn secs_to_ts(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| Error::Parse(format!("invalid timestamp {secs}")))
}

pub fn market_to_row(market: &Market) -> Result<MarketRow> {
    Ok(MarketRow {
        market_id: market.market_id().as_str().to_owned(),
        title: market.title().to_owned(),
        status: serde_json::to_string(&market.status())?.trim_matches('"').to_owned(),
        start_ts: market.start_ts().map(ts_to_secs),
        end_ts: market.end_ts().map(ts_to_secs),
        tags_json: serde_json::to_string(market.tags())?,
    })
}

pub fn market_option_rows(market: &Market) -> Vec<MarketOptionRow> {
    market
        .options()
        .iter()
        .map(|o| MarketOptionRow {
            option_id: o.option_id().as_str().to_owned(),
            market_id: o.market_id().as_str().to_owned(),
            label: o.label().to_owned(),
        })
        .collect()
}

pub fn row_to_market(row: MarketRow, options: Vec<MarketOptionRow>) -> Result<Market> {
    let status: MarketStatus = serde_json::from_str(&format!("\"{}\"", row.status))?;
    let tags: Vec<String> = serde_json::from_str(&row.tags_json)?;
    let options = options
        .into_iter()
        .map(|o| MarketOption::new(OptionId::new(o.option_id), MarketId::new(o.market_id), o.label))
        .collect();
    Ok(Market::new(MarketId::new(row.market_id), row.title, status)
        .with_end_ts(row.end_ts.map(secs_to_ts).transpose()?)
        .with_tags(tags)
        .with_options(options))
}

pub fn tick_to_new_row(tick: &Tick) -> NewTickRow {
    NewTickRow {
        market_id: tick.market_id().as_str().to_owned(),
        option_id: tick.option_id().as_str().to_owned(),
        bid: tick.bid().map(|d| d.to_string()),
        ask: tick.ask().map(|d| d.to_string()),
        last: tick.last().map(|d| d.to_string()),
        volume_24h: tick.volume_24h().map(|d| d.to_string()),
        observed_at: ts_to_secs(tick.observed_at()),
    }
}

pub fn row_to_tick(row: TickRow) -> Result<Tick> {
    let mut tick = Tick::new(
        MarketId::new(row.market_id),
        OptionId::new(row.option_id),
        secs_to_ts(row.observed_at)?,
    );
    if let Some(bid) = row.bid {
        tick = tick.with_bid(Some(parse_decimal(&bid)?));
    }
    if let Some(ask) = row.ask {
        tick = tick.with_ask(Some(parse_decimal(&ask)?));
    }
    if let Some(last) = row.last {
        tick = tick.with_last(Some(parse_decimal(&last)?));
    }
    if let Some(vol) = row.volume_24h {
        tick = tick.with_volume_24h(Some(parse_decimal(&vol)?));
    }
    Ok(tick)
}

pub fn rule_to_row(rule: &RuleDefinition) -> Result<RuleDefinitionRow> {
    Ok(RuleDefinitionRow {
        rule_id: rule.rule_id().as_str().to_owned(),
        rule_type: rule.rule_type().as_str().to_owned(),
        enabled: rule.enabled(),
        market_scope_json: serde_json::to_string(rule.market_scope())?,
        params_json: serde_json::to_string(rule.params())?,
        cooldown_secs: rule.cooldown_secs() as i64,
    })
}

pub fn row_to_rule(row: RuleDefinitionRow) -> Result<RuleDefinition> {
    let rule_type = rule_type_from_str(&row.rule_type)?;
    let market_scope: Vec<MarketId> = serde_json::from_str::<Vec<String>>(&row.market_scope_json)?
        .into_iter()
        .map(MarketId::new)
        .collect();
    let params: BTreeMap<String, Decimal> = serde_json::from_str(&row.params_json)?;
    let mut rule = RuleDefinition::new(RuleId::new(row.rule_id), rule_type)
        .with_enabled(row.enabled)
        .with_market_scope(market_scope)
        .with_cooldown_secs(row.cooldown_secs as u64);
    for (k, v) in params {
        rule = rule.with_param(k, v);
    }
    Ok(rule)
}

fn rule_type_from_str(s: &str) -> Result<RuleType> {
    match s {
        "SUM_LT_1" => Ok(RuleType::SumLt1),
        "SPIKE_DETECT" => Ok(RuleType::SpikeDetect),
        "ENDGAME_SWEEP" => Ok(RuleType::EndgameSweep),
        "SYNONYM_MISPRICE" => Ok(RuleType::SynonymMisprice),
        "DUTCH_BOOK_DETECT" => Ok(RuleType::DutchBookDetect),
        "CROSS_MARKET_MISPRICE" => Ok(RuleType::CrossMarketMisprice),
        "TREND_BREAKOUT" => Ok(RuleType::TrendBreakout),
        other => Err(Error::Parse(format!("unknown rule_type {other}"))),
    }
}

pub fn signal_to_row(signal: &Signal) -> Result<SignalRow> {
    Ok(SignalRow {
        signal_id: signal.signal_id().as_str().to_owned(),
        rule_id: signal.rule_id().as_str().to_owned(),
        rule_type: signal.rule_type().as_str().to_owned(),
        market_id: signal.market_id().as_str().to_owned(),
        level: level_to_str(signal.level()).to_owned(),
        edge_score: signal.edge_score().to_string(),
        payload_json: serde_json::to_string(signal.payload())?,
        suggested_trade_json: signal
            .suggested_trade()
            .map(serde_json::to_string)
            .transpose()?,
        emitted_at: ts_to_secs(signal.emitted_at()),
    })
}

fn level_to_str(level: Level) -> &'static str {
    match level {
        Level::P1 => "p1",
        Level::P2 => "p2",
        Level::P3 => "p3",
    }
}

pub fn row_to_signal(row: SignalRow) -> Result<Signal> {
    let rule_type = rule_type_from_str(&row.rule_type)?;
    let level: Level = serde_json::from_str(&format!("\"{}\"", row.level))?;
    let payload: SignalPayload = serde_json::from_str(&row.payload_json)?;
    let suggested_trade: Option<SuggestedTrade> = row
        .suggested_trade_json
        .map(|s| serde_json::from_str(&s))
        .transpose()?;
    let edge_score = parse_decimal(&row.edge_score)?;
    Ok(Signal::new(
        SignalId::new(row.signal_id),
        RuleId::new(row.rule_id),
        rule_type,
        MarketId::new(row.market_id),
        level,
        payload,
        secs_to_ts(row.emitted_at)?,
    )
    .with_suggested_trade(suggested_trade)
    .with_edge_score(edge_score))
}

pub fn synonym_group_row(group: &SynonymGroup) -> SynonymGroupRow {
    SynonymGroupRow {
        group_id: group.group_id().as_str().to_owned(),
        method: synonym_method_to_str(group.method()).to_owned(),
    }
}

fn synonym_method_to_str(method: SynonymMethod) -> &'static str {
    match method {
        SynonymMethod::Explicit => "explicit",
        SynonymMethod::Keyword => "keyword",
        SynonymMethod::Embedding => "embedding",
    }
}

pub fn synonym_member_new_rows(group: &SynonymGroup) -> Vec<NewSynonymGroupMemberRow> {
    group
        .members()
        .iter()
        .map(|m| NewSynonymGroupMemberRow {
            group_id: group.group_id().as_str().to_owned(),
            market_id: m.market_id.as_str().to_owned(),
            option_id: m.option_id.as_str().to_owned(),
        })
        .collect()
}

pub fn row_to_synonym_group(row: SynonymGroupRow, members: Vec<SynonymGroupMemberRow>) -> Result<SynonymGroup> {
    let method: SynonymMethod = serde_json::from_str(&format!("\"{}\"", row.method))?;
    let members = members
        .into_iter()
        .map(|m| SynonymMember {
            market_id: MarketId::new(m.market_id),
            option_id: OptionId::new(m.option_id),
        })
        .collect();
    Ok(SynonymGroup::new(GroupId::new(row.group_id), method, members))
}

pub fn policy_to_row(policy: &ExecutionPolicy) -> ExecutionPolicyRow {
    ExecutionPolicyRow {
        policy_id: policy.policy_id().as_str().to_owned(),
        mode: execution_mode_to_str(policy.mode()).to_owned(),
        max_notional_per_intent: policy.max_notional_per_intent().to_string(),
        max_open_intents: policy.max_open_intents() as i32,
        max_daily_notional: policy.max_daily_notional().to_string(),
        max_slippage_bps: policy.max_slippage_bps().to_string(),
    }
}

fn execution_mode_to_str(mode: ExecutionMode) -> &'static str {
    match mode {
        ExecutionMode::Manual => "manual",
        ExecutionMode::SemiAuto => "semi_auto",
        ExecutionMode::Auto => "auto",
    }
}

pub fn row_to_policy(row: ExecutionPolicyRow) -> Result<ExecutionPolicy> {
    let mode: ExecutionMode = serde_json::from_str(&format!("\"{}\"", row.mode))?;
    Ok(ExecutionPolicy::new(
        PolicyId::new(row.policy_id),
        mode,
        parse_decimal(&row.max_notional_per_intent)?,
        row.max_open_intents as u32,
        parse_decimal(&row.max_daily_notional)?,
        parse_decimal(&row.max_slippage_bps)?,
    ))
}

pub fn intent_to_row(intent: &OrderIntent) -> Result<OrderIntentRow> {
    Ok(OrderIntentRow {
        intent_id: intent.intent_id().as_str().to_owned(),
        signal_id: intent.signal_id().as_str().to_owned(),
        policy_id: intent.policy_id().as_str().to_owned(),
        status: intent_status_to_str(intent.status()).to_owned(),
        legs_json: serde_json::to_string(intent.legs())?,
        notional: intent.notional().to_string(),
        created_at: ts_to_secs(intent.created_at()),
        updated_at: ts_to_secs(intent.updated_at()),
    })
}

fn intent_status_to_str(status: IntentStatus) -> &'static str {
    match status {
        IntentStatus::Suggested => "suggested",
        IntentStatus::Sent => "sent",
        IntentStatus::Filled => "filled",
        IntentStatus::Rejected => "rejected",
        IntentStatus::Expired => "expired",
    }
}

pub fn row_to_intent(row: OrderIntentRow) -> Result<OrderIntent> {
    let legs: Vec<IntentDetail> = serde_json::from_str(&row.legs_json)?;
    let notional = parse_decimal(&row.notional)?;
    let mut intent = OrderIntent::new(
        IntentId::new(row.intent_id),
        SignalId::new(row.signal_id),
        PolicyId::new(row.policy_id),
        legs,
        notional,
        secs_to_ts(row.created_at)?,
    );
    let status: IntentStatus = serde_json::from_str(&format!("\"{}\"", row.status))?;
    if status != IntentStatus::Suggested {
        intent
            .transition(status, secs_to_ts(row.updated_at)?)
            .map_err(Error::Domain)?;
    }
    Ok(intent)
}

pub fn kpi_to_row(kpi: &RuleKpiDaily) -> RuleKpiDailyRow {
    RuleKpiDailyRow {
        rule_id: kpi.rule_id().as_str().to_owned(),
        day: kpi.day().format("%Y-%m-%d").to_string(),
        signals_emitted: kpi.signals_emitted() as i64,
        intents_created: kpi.intents_created() as i64,
        intents_filled: kpi.intents_filled() as i64,
        notional_filled: kpi.notional_filled().to_string(),
    }
}

pub fn row_to_kpi(row: RuleKpiDailyRow) -> Result<RuleKpiDaily> {
    let day = NaiveDate::parse_from_str(&row.day, "%Y-%m-%d").map_err(|e| Error::Parse(e.to_string()))?;
    Ok(RuleKpiDaily::from_totals(
        RuleId::new(row.rule_id),
        day,
        row.signals_emitted as u64,
        row.intents_created as u64,
        row.intents_filled as u64,
        parse_decimal(&row.notional_filled)?,
    ))
}

pub fn audit_to_new_row(log: &AuditLog) -> NewAuditLogRow {
    NewAuditLogRow {
        actor: log.actor().to_owned(),
        action: log.action().to_owned(),
        subject: log.subject().to_owned(),
        detail: log.detail().to_owned(),
        recorded_at: ts_to_secs(log.recorded_at()),
    }
}

pub fn row_to_audit(row: AuditLogRow) -> Result<AuditLog> {
    Ok(AuditLog::new(
        row.id as u64,
        row.actor,
        row.action,
        row.subject,
        row.detail,
        secs_to_ts(row.recorded_at)?,
    ))
}
