//! Diesel table definitions, one per persisted aggregate.

diesel::table! {
    markets (market_id) {
        market_id -> Text,
        title -> Text,
        status -> Text,
        start_ts -> Nullable<BigInt>,
        end_ts -> Nullable<BigInt>,
        tags_json -> Text,
    }
}

diesel::table! {
    market_options (option_id) {
        option_id -> Text,
        market_id -> Text,
        label -> Text,
    }
}

diesel::table! {
    ticks (id) {
        id -> BigInt,
        market_id -> Text,
        option_id -> Text,
        bid -> Nullable<Text>,
        ask -> Nullable<Text>,
        last -> Nullable<Text>,
        volume_24h -> Nullable<Text>,
        observed_at -> BigInt,
    }
}

diesel::table! {
    rule_definitions (rule_id) {
        rule_id -> Text,
        rule_type -> Text,
        enabled -> Bool,
        market_scope_json -> Text,
        params_json -> Text,
        cooldown_secs -> BigInt,
    }
}

diesel::table! {
    signals (signal_id) {
        signal_id -> Text,
        rule_id -> Text,
        rule_type -> Text,
        market_id -> Text,
        level -> Text,
        edge_score -> Text,
        payload_json -> Text,
        suggested_trade_json -> Nullable<Text>,
        emitted_at -> BigInt,
    }
}

diesel::table! {
    synonym_groups (group_id) {
        group_id -> Text,
        method -> Text,
    }
}

diesel::table! {
    synonym_group_members (id) {
        id -> BigInt,
        group_id -> Text,
        market_id -> Text,
        option_id -> Text,
    }
}

diesel::table! {
    execution_policies (policy_id) {
        policy_id -> Text,
        mode -> Text,
        max_notional_per_intent -> Text,
        max_open_intents -> Integer,
        max_daily_notional -> Text,
        max_slippage_bps -> Text,
    }
}

diesel::table! {
    order_intents (intent_id) {
        intent_id -> Text,
        signal_id -> Text,
        policy_id -> Text,
        status -> Text,
        legs_json -> Text,
        notional -> Text,
        created_at -> BigInt,
        updated_at -> BigInt,
    }
}

diesel::table! {
    rule_kpi_daily (rule_id, day) {
        rule_id -> Text,
        day -> Text,
        signals_emitted -> BigInt,
        intents_created -> BigInt,
        intents_filled -> BigInt,
        notional_filled -> Text,
    }
}

diesel::table! {
    audit_log (id) {
        id -> BigInt,
        actor -> Text,
        action -> Text,
        subject -> Text,
        detail -> Text,
        recorded_at -> BigInt,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    markets,
    market_options,
    ticks,
    rule_definitions,
    signals,
    synonym_groups,
    synonym_group_members,
    execution_policies,
    order_intents,
    rule_kpi_daily,
    audit_log,
);
