//! Shared application state: the handles wired at startup and threaded
//! through every spawned loop. Position and exposure bookkeeping already
//! lives in [`crate::core::rules::CircuitBreaker`] and the store's daily
//! notional query, so this struct stays a thin set of shared cells
//! rather than reimplementing them.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::core::domain::{ExecutionPolicy, Market, RuleDefinition, SynonymGroup};
use crate::core::metrics::Metrics;
use crate::core::rules::CircuitBreaker;
use crate::core::store::Store;
use crate::core::venue::BookCache;

/// Shared handles every pipeline needs. Cheap to clone: every field is
/// an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub book_cache: Arc<BookCache>,
    pub breaker: Arc<CircuitBreaker>,
    pub metrics: Metrics,
    pub markets: Arc<RwLock<Vec<Market>>>,
    pub rules: Arc<RwLock<Vec<RuleDefinition>>>,
    pub synonym_groups: Arc<RwLock<Vec<SynonymGroup>>>,
    pub policy: Arc<RwLock<ExecutionPolicy>>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, breaker: Arc<CircuitBreaker>, metrics: Metrics, policy: ExecutionPolicy) -> Self {
        Self {
            store,
            book_cache: Arc::new(BookCache::new()),
            breaker,
            metrics,
            markets: Arc::new(RwLock::new(Vec::new())),
            rules: Arc::new(RwLock::new(Vec::new())),
            synonym_groups: Arc::new(RwLock::new(Vec::new())),
            policy: Arc::new(RwLock::new(policy)),
        }
    }

    /// Replace the in-memory market list, e.g. after a venue refresh.
    pub async fn set_markets(&self, markets: Vec<Market>) {
        *self.markets.write().await = markets;
    }

    /// Replace the in-memory rule set, e.g. after a rule file reload.
    pub async fn set_rules(&self, rules: Vec<RuleDefinition>) {
        *self.rules.write().await = rules;
    }

    /// Replace the in-memory synonym group set.
    pub async fn set_synonym_groups(&self, groups: Vec<SynonymGroup>) {
        *self.synonym_groups.write().await = groups;
    }
}
