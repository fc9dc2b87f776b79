//! Concurrent, TTL-bounded cache of the latest tick per option.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::core::domain::{MarketId, OptionId, Tick};

const DEFAULT_TTL: Duration = Duration::from_secs(5);

struct Entry {
    tick: Tick,
    inserted_at: Instant,
}

/// Many-readers/single-writer-per-key cache of the most recent tick per
/// `(market_id, option_id)`. Stale entries (older than the TTL) are
/// treated as absent by readers rather than evicted eagerly.
pub struct BookCache {
    ttl: Duration,
    entries: DashMap<(MarketId, OptionId), Entry>,
}

impl BookCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Insert `tick` unconditionally if it is newer than whatever is
    /// currently cached for its key; older/equal ticks are dropped.
    pub fn insert(&self, tick: Tick) {
        let key = (tick.market_id().clone(), tick.option_id().clone());
        match self.entries.get(&key) {
            Some(existing) if !tick.is_newer_than(&existing.tick) => {}
            _ => {
                self.entries.insert(
                    key,
                    Entry {
                        tick,
                        inserted_at: Instant::now(),
                    },
                );
            }
        }
    }

    /// Fetch the cached tick for `(market_id, option_id)`, returning
    /// `None` if absent or stale.
    #[must_use]
    pub fn get(&self, market_id: &MarketId, option_id: &OptionId) -> Option<Tick> {
        let key = (market_id.clone(), option_id.clone());
        self.entries.get(&key).and_then(|entry| {
            if entry.inserted_at.elapsed() <= self.ttl {
                Some(entry.tick.clone())
            } else {
                None
            }
        })
    }

    /// All fresh ticks currently cached for a market.
    #[must_use]
    pub fn get_market(&self, market_id: &MarketId) -> Vec<Tick> {
        self.entries
            .iter()
            .filter(|e| &e.key().0 == market_id && e.value().inserted_at.elapsed() <= self.ttl)
            .map(|e| e.value().tick.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BookCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn base_ts() -> chrono::DateTime<Utc> {
        Utc::now()
    }

    fn tick_at(market: &str, option: &str, ts: chrono::DateTime<Utc>) -> Tick {
        Tick::new(MarketId::new(market), OptionId::new(option), ts).with_last(Some(dec!(0.5)))
    }

    #[test]
    fn insert_then_get_roundtrips() {
        let cache = BookCache::new();
        cache.insert(tick_at("m1", "yes", base_ts()));
        let got = cache.get(&MarketId::new("m1"), &OptionId::new("yes"));
        assert!(got.is_some());
    }

    #[test]
    fn older_tick_does_not_overwrite_newer_one() {
        let cache = BookCache::new();
        let newer_ts = base_ts() + chrono::Duration::seconds(10);
        cache.insert(tick_at("m1", "yes", newer_ts));
        cache.insert(tick_at("m1", "yes", base_ts()));
        let got = cache.get(&MarketId::new("m1"), &OptionId::new("yes")).unwrap();
        assert_eq!(got.observed_at(), newer_ts);
    }

    #[test]
    fn stale_entry_reads_as_absent() {
        let cache = BookCache::with_ttl(Duration::from_millis(1));
        cache.insert(tick_at("m1", "yes", base_ts()));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(&MarketId::new("m1"), &OptionId::new("yes")).is_none());
    }

    #[test]
    fn get_market_filters_by_market_id() {
        let cache = BookCache::new();
        cache.insert(tick_at("m1", "yes", base_ts()));
        cache.insert(tick_at("m2", "yes", base_ts()));
        assert_eq!(cache.get_market(&MarketId::new("m1")).len(), 1);
    }
}
