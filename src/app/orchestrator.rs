//! Bootstraps the wired application from [`Config`] and runs it to
//! completion: free `build_*`/`init_*` functions construct the services,
//! and a thin [`Orchestrator`] spawns and supervises them.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::app::config::{Config, ExecutionModeConfig, VenueKind};
use crate::app::state::AppState;
use crate::core::alerts::{AlertDispatcher, LogAlertTransport};
use crate::core::db;
use crate::core::domain::{AuditLog, ExecutionMode, ExecutionPolicy, IntentStatus, PolicyId, Signal, Tick};
use crate::core::ingestion::IngestionPipeline;
use crate::core::intents::{IntentService, IntentWorldState, PlannerRegistry, RiskInputs, SumLt1Planner, SuggestedTradePlanner};
use crate::core::metrics::Metrics;
use crate::core::rules::loader::RuleLoader;
use crate::core::rules::{synonyms, CircuitBreaker, RuleEngine};
use crate::core::store::{AuditStore, IntentStore, MarketStore, RuleStore, SignalStore, Store, SynonymStore};
use crate::core::venue::{PolymarketVenueClient, SyntheticVenueClient, VenueClient};
use crate::error::Result;

fn build_venue_client(config: &Config) -> Result<Arc<dyn VenueClient>> {
    let client: Arc<dyn VenueClient> = match config.venue.kind {
        VenueKind::Synthetic => Arc::new(SyntheticVenueClient::new(config.venue.synthetic_seed, config.venue.synthetic_market_count)),
        VenueKind::Polymarket => {
            let mut client = PolymarketVenueClient::new(config.venue.request_timeout())?;
            if let (Some(gamma), Some(clob)) = (&config.venue.gamma_base, &config.venue.clob_base) {
                client = client.with_bases(gamma.clone(), clob.clone());
            }
            Arc::new(client)
        }
    };
    Ok(client)
}

fn execution_mode(config: &ExecutionModeConfig) -> ExecutionMode {
    match config {
        ExecutionModeConfig::Manual => ExecutionMode::Manual,
        ExecutionModeConfig::SemiAuto => ExecutionMode::SemiAuto,
        ExecutionModeConfig::Auto => ExecutionMode::Auto,
    }
}

fn default_policy(config: &Config) -> ExecutionPolicy {
    ExecutionPolicy::new(
        PolicyId::new("default"),
        execution_mode(&config.policy.mode),
        config.policy.max_notional_per_intent,
        config.policy.max_open_intents,
        config.policy.max_daily_notional,
        config.policy.max_slippage_bps,
    )
}

fn build_planner_registry() -> PlannerRegistry {
    let mut registry = PlannerRegistry::new();
    registry.register(Box::new(SumLt1Planner { leg_size: rust_decimal::Decimal::TEN }));
    for rule_type in [
        crate::core::domain::RuleType::SpikeDetect,
        crate::core::domain::RuleType::EndgameSweep,
        crate::core::domain::RuleType::SynonymMisprice,
        crate::core::domain::RuleType::DutchBookDetect,
        crate::core::domain::RuleType::CrossMarketMisprice,
        crate::core::domain::RuleType::TrendBreakout,
    ] {
        registry.register(Box::new(SuggestedTradePlanner(rule_type)));
    }
    registry
}

/// Load rules and synonym groups from disk into `state`'s shared cells.
/// Called once at startup and safe to call again on a reload signal.
async fn refresh_rule_config(state: &AppState, config: &Config) -> Result<()> {
    let mut loader = RuleLoader::new(&config.rules.rules_path);
    let rules = loader.load().await?;
    for rule in &rules {
        state.store.upsert_rule(rule).await?;
    }
    state.set_rules(rules).await;

    if let Some(path) = &config.rules.synonyms_path {
        let contents = tokio::fs::read_to_string(path).await.map_err(crate::error::Error::Io)?;
        let markets = state.markets.read().await.clone();
        let groups = synonyms::resolve(&contents, &markets)?;
        for group in &groups {
            state.store.upsert_group(group).await?;
        }
        state.set_synonym_groups(groups).await;
    }
    Ok(())
}

/// Fetch the venue's current market list and store + cache it.
async fn refresh_markets(state: &AppState, venue: &dyn VenueClient) -> Result<()> {
    let markets = venue.list_markets().await?;
    for market in &markets {
        state.store.upsert_market(market).await?;
    }
    state.set_markets(markets).await;
    Ok(())
}

/// Consume signals emitted by the rule engine: persist, alert, and
/// (when actionable) risk-gate an order intent.
async fn run_signal_consumer(
    mut signal_rx: mpsc::Receiver<Signal>,
    state: AppState,
    intents: IntentService,
    alerts: AlertDispatcher,
) {
    while let Some(signal) = signal_rx.recv().await {
        if let Err(err) = state.store.insert_signal(&signal).await {
            warn!(error = %err, "failed to persist signal");
        }
        alerts.dispatch(&signal).await;

        if signal.is_actionable() {
            if let Err(err) = create_and_store_intent(&state, &intents, &signal).await {
                info!(signal_id = %signal.signal_id(), reason = %err, "intent not created");
            }
        }
    }
}

async fn create_and_store_intent(state: &AppState, intents: &IntentService, signal: &Signal) -> Result<()> {
    let policy = state.policy.read().await.clone();
    let now = chrono::Utc::now();

    let mut intent = intents
        .create_intent(signal, &policy, now)
        .map_err(|e| crate::error::Error::Config(e.to_string()))?;
    state.store.insert_intent(&intent).await?;
    state
        .store
        .record(&AuditLog::new(
            now.timestamp() as u64,
            "intent_service",
            "create_intent",
            intent.intent_id().as_str(),
            format!("status={:?}", intent.status()),
            now,
        ))
        .await?;

    if policy.auto_confirms(intent.notional()) {
        let open_intents = state.store.count_open_intents().await?;
        let daily_notional_so_far = state.store.daily_notional_so_far(now.date_naive()).await?;
        let quoted_price = signal
            .suggested_trade()
            .and_then(|t| t.legs.first())
            .map_or(rust_decimal::Decimal::ZERO, |l| l.price);
        let planned_price = intent.legs().first().map_or(rust_decimal::Decimal::ZERO, |leg| leg.price);

        let world = IntentWorldState {
            open_intents,
            daily_notional_so_far,
            quoted_price,
        };
        let inputs = RiskInputs {
            rule_id: signal.rule_id().clone(),
            market_id: signal.market_id().clone(),
            notional: intent.notional(),
            open_intents: world.open_intents,
            daily_notional_so_far: world.daily_notional_so_far,
            quoted_price: world.quoted_price,
            planned_price,
        };

        intents.confirm_intent(&mut intent, &policy, &inputs, now)?;
        state.store.update_intent(&intent).await?;
        state
            .store
            .record(&AuditLog::new(
                now.timestamp() as u64,
                "intent_service",
                "confirm_intent",
                intent.intent_id().as_str(),
                format!("status={:?}", intent.status()),
                now,
            ))
            .await?;
        match intent.status() {
            IntentStatus::Filled => info!(intent_id = %intent.intent_id(), "intent auto-confirmed and filled"),
            IntentStatus::Rejected => info!(intent_id = %intent.intent_id(), reasons = ?intent.rejection_reasons(), "intent auto-confirmation rejected"),
            _ => {}
        }
    }

    Ok(())
}

/// Forwards ticks from ingestion into both the book cache and the rule
/// engine's input channel.
async fn run_tick_forwarder(mut tick_rx: mpsc::Receiver<Tick>, engine_tx: mpsc::Sender<Tick>) {
    while let Some(tick) = tick_rx.recv().await {
        if engine_tx.send(tick).await.is_err() {
            return;
        }
    }
}

pub struct Orchestrator;

impl Orchestrator {
    /// Build every service from `config` and run them until `cancel`
    /// fires (normally on ctrl-c, see [`Self::run_with_shutdown`]).
    pub async fn run(config: Config, cancel: CancellationToken) -> Result<()> {
        let metrics = Metrics::new();
        let pool = db::create_pool(&config.database.path)?;
        let store: Arc<dyn Store> = Arc::new(crate::core::store::SqliteStore::new(pool));
        let breaker = Arc::new(CircuitBreaker::new(
            config.rules.breaker_trip_threshold,
            config.rules.breaker_window(),
            config.rules.breaker_cooldown(),
        ));
        let state = AppState::new(store.clone(), breaker.clone(), metrics, default_policy(&config));

        let venue = build_venue_client(&config)?;
        refresh_markets(&state, venue.as_ref()).await?;
        refresh_rule_config(&state, &config).await?;

        let market_ids: Vec<_> = state.markets.read().await.iter().map(|m| m.market_id().clone()).collect();

        let (venue_tx, venue_rx) = mpsc::channel(256);
        let (engine_tx, engine_rx) = mpsc::channel(256);
        let (signal_tx, signal_rx) = mpsc::channel(256);

        let ingestion = IngestionPipeline::new(
            venue,
            state.book_cache.clone(),
            state.metrics,
            config.ingestion.poll_interval(),
            config.ingestion.min_flush_interval(),
        );
        let engine = RuleEngine::new(breaker, state.metrics, config.rules.eval_interval());

        let transport: Box<dyn crate::core::alerts::AlertTransport> = Box::new(LogAlertTransport);
        let alerts = AlertDispatcher::new(transport, state.metrics);
        let intents = IntentService::new(build_planner_registry(), state.breaker.clone(), state.metrics);

        let mut handles = Vec::new();
        handles.push(tokio::spawn(ingestion.run(market_ids, venue_tx, cancel.clone())));
        handles.push(tokio::spawn(run_tick_forwarder(venue_rx, engine_tx)));
        handles.push(tokio::spawn(engine.run(
            engine_rx,
            signal_tx,
            state.rules.clone(),
            state.markets.clone(),
            state.synonym_groups.clone(),
            state.book_cache.clone(),
            cancel.clone(),
        )));
        handles.push(tokio::spawn(run_signal_consumer(signal_rx, state, intents, alerts)));

        for handle in handles {
            let _ = handle.await;
        }
        Ok(())
    }

    /// Run until an operator sends SIGINT, then cancel every spawned
    /// loop and wait for them to drain.
    pub async fn run_with_shutdown(config: Config) -> Result<()> {
        let cancel = CancellationToken::new();
        let shutdown_cancel = cancel.clone();

        tokio::select! {
            result = Self::run(config, cancel) => result,
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received, stopping");
                shutdown_cancel.cancel();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_reflects_configured_caps() {
        let config = Config::parse_toml("").unwrap();
        let policy = default_policy(&config);
        assert_eq!(policy.max_open_intents(), config.policy.max_open_intents);
    }

    #[test]
    fn build_planner_registry_plans_sum_lt_1_signals() {
        use crate::core::domain::{BookSnapshot, Level, MarketId, OptionId, RuleId, RuleType, SignalId, SignalPayload};
        use rust_decimal_macros::dec;

        let registry = build_planner_registry();
        let signal = Signal::new(
            SignalId::new("s1"),
            RuleId::new("r1"),
            RuleType::SumLt1,
            MarketId::new("m1"),
            Level::P1,
            SignalPayload::SumLt1 {
                sum: dec!(0.9),
                threshold: dec!(0.97),
                books: vec![BookSnapshot {
                    option_id: OptionId::new("yes"),
                    bid: Some(dec!(0.44)),
                    ask: Some(dec!(0.45)),
                }],
            },
            chrono::Utc::now(),
        );
        assert!(registry.plan(&signal).is_some());
    }
}
