//! Last-value dedup: drop ticks that carry no new information before they
//! reach the rule engine.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::core::domain::{MarketId, OptionId, Tick};

struct Entry {
    tick: Tick,
    last_forwarded_at: DateTime<Utc>,
}

/// Tracks the last tick seen per `(market_id, option_id)` and reports
/// whether a newly observed tick should be forwarded. A tick is
/// suppressed only when it is newer than the last one seen, its
/// `(last, bid, ask)` tuple is unchanged from the cached value, *and*
/// less than `min_flush_interval` has passed since that pair last
/// actually forwarded a tick. An unchanged tuple is still re-forwarded
/// once the interval elapses, and any tuple change always forwards
/// regardless of timing.
pub struct LastValueCache {
    last: DashMap<(MarketId, OptionId), Entry>,
    min_flush_interval: Duration,
}

impl LastValueCache {
    #[must_use]
    pub fn new(min_flush_interval: Duration) -> Self {
        Self {
            last: DashMap::new(),
            min_flush_interval,
        }
    }

    /// `true` if `tick` should be forwarded; updates internal state as a
    /// side effect regardless of the outcome so out-of-order ticks never
    /// regress the stored value.
    pub fn should_forward(&self, tick: &Tick) -> bool {
        let key = (tick.market_id().clone(), tick.option_id().clone());
        match self.last.get(&key) {
            None => {
                drop(self.last.insert(
                    key,
                    Entry {
                        tick: tick.clone(),
                        last_forwarded_at: tick.observed_at(),
                    },
                ));
                true
            }
            Some(existing) => {
                if !tick.is_newer_than(&existing.tick) {
                    return false;
                }
                let tuple_changed = (existing.tick.last(), existing.tick.bid(), existing.tick.ask()) != (tick.last(), tick.bid(), tick.ask());
                let elapsed = tick
                    .observed_at()
                    .signed_duration_since(existing.last_forwarded_at)
                    .to_std()
                    .unwrap_or(Duration::ZERO);
                let interval_elapsed = elapsed >= self.min_flush_interval;
                let forward = tuple_changed || interval_elapsed;
                let last_forwarded_at = if forward { tick.observed_at() } else { existing.last_forwarded_at };
                drop(existing);
                self.last.insert(
                    key,
                    Entry {
                        tick: tick.clone(),
                        last_forwarded_at,
                    },
                );
                forward
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.last.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tick(ts_offset: i64, mid: rust_decimal::Decimal) -> Tick {
        Tick::new(
            MarketId::new("m1"),
            OptionId::new("yes"),
            Utc::now() + chrono::Duration::seconds(ts_offset),
        )
        .with_last(Some(mid))
    }

    fn tick_with_book(ts_offset: i64, bid: rust_decimal::Decimal, ask: rust_decimal::Decimal) -> Tick {
        Tick::new(
            MarketId::new("m1"),
            OptionId::new("yes"),
            Utc::now() + chrono::Duration::seconds(ts_offset),
        )
        .with_bid(Some(bid))
        .with_ask(Some(ask))
    }

    #[test]
    fn first_tick_for_a_key_is_always_forwarded() {
        let cache = LastValueCache::new(Duration::from_secs(30));
        assert!(cache.should_forward(&tick(0, dec!(0.5))));
    }

    #[test]
    fn unchanged_tuple_within_the_interval_is_suppressed() {
        let cache = LastValueCache::new(Duration::from_secs(30));
        assert!(cache.should_forward(&tick(0, dec!(0.5))));
        assert!(!cache.should_forward(&tick(1, dec!(0.5))));
    }

    #[test]
    fn changed_price_is_forwarded() {
        let cache = LastValueCache::new(Duration::from_secs(30));
        assert!(cache.should_forward(&tick(0, dec!(0.5))));
        assert!(cache.should_forward(&tick(1, dec!(0.55))));
    }

    #[test]
    fn unchanged_mid_with_moved_book_is_still_forwarded() {
        let cache = LastValueCache::new(Duration::from_secs(30));
        assert!(cache.should_forward(&tick_with_book(0, dec!(0.40), dec!(0.50))));
        let moved = tick_with_book(1, dec!(0.42), dec!(0.48));
        assert_eq!(moved.mid(), Some(dec!(0.45)));
        assert!(cache.should_forward(&moved));
    }

    #[test]
    fn unchanged_tuple_is_reflushed_once_the_interval_elapses() {
        let cache = LastValueCache::new(Duration::from_secs(30));
        assert!(cache.should_forward(&tick(0, dec!(0.5))));
        assert!(!cache.should_forward(&tick(10, dec!(0.5))));
        assert!(!cache.should_forward(&tick(20, dec!(0.5))));
        assert!(cache.should_forward(&tick(31, dec!(0.5))));
    }

    #[test]
    fn out_of_order_tick_is_not_forwarded() {
        let cache = LastValueCache::new(Duration::from_secs(30));
        assert!(cache.should_forward(&tick(10, dec!(0.5))));
        assert!(!cache.should_forward(&tick(0, dec!(0.9))));
    }
}
