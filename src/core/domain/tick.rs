//! Normalized venue price ticks.

use chrono::{DateTime, Utc};

use super::ids::{MarketId, OptionId};
use super::money::{Price, Volume};

/// A single normalized price observation for one option, at one instant.
///
/// All venue-specific payloads are normalized into this shape by the
/// ingestion pipeline before anything downstream ever sees them.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    market_id: MarketId,
    option_id: OptionId,
    bid: Option<Price>,
    ask: Option<Price>,
    last: Option<Price>,
    volume_24h: Option<Volume>,
    observed_at: DateTime<Utc>,
}

impl Tick {
    #[must_use]
    pub fn new(market_id: MarketId, option_id: OptionId, observed_at: DateTime<Utc>) -> Self {
        Self {
            market_id,
            option_id,
            bid: None,
            ask: None,
            last: None,
            volume_24h: None,
            observed_at,
        }
    }

    #[must_use]
    pub fn with_bid(mut self, bid: Option<Price>) -> Self {
        self.bid = bid;
        self
    }

    #[must_use]
    pub fn with_ask(mut self, ask: Option<Price>) -> Self {
        self.ask = ask;
        self
    }

    #[must_use]
    pub fn with_last(mut self, last: Option<Price>) -> Self {
        self.last = last;
        self
    }

    #[must_use]
    pub fn with_volume_24h(mut self, volume_24h: Option<Volume>) -> Self {
        self.volume_24h = volume_24h;
        self
    }

    #[must_use]
    pub const fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    #[must_use]
    pub const fn option_id(&self) -> &OptionId {
        &self.option_id
    }

    #[must_use]
    pub const fn bid(&self) -> Option<Price> {
        self.bid
    }

    #[must_use]
    pub const fn ask(&self) -> Option<Price> {
        self.ask
    }

    #[must_use]
    pub const fn last(&self) -> Option<Price> {
        self.last
    }

    #[must_use]
    pub const fn volume_24h(&self) -> Option<Volume> {
        self.volume_24h
    }

    #[must_use]
    pub const fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// Mid price from bid/ask, falling back to `last` when one side of the
    /// book is missing.
    #[must_use]
    pub fn mid(&self) -> Option<Price> {
        match (self.bid, self.ask) {
            (Some(b), Some(a)) => Some((b + a) / rust_decimal::Decimal::TWO),
            _ => self.last,
        }
    }

    /// `true` if this tick is strictly newer than `other`, by
    /// `observed_at`. Used to reject out-of-order writes at the cache and
    /// store boundary.
    #[must_use]
    pub fn is_newer_than(&self, other: &Tick) -> bool {
        self.observed_at > other.observed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn mid_averages_bid_and_ask() {
        let t = Tick::new(MarketId::new("m"), OptionId::new("o"), ts(1))
            .with_bid(Some(dec!(0.40)))
            .with_ask(Some(dec!(0.44)));
        assert_eq!(t.mid(), Some(dec!(0.42)));
    }

    #[test]
    fn mid_falls_back_to_last_without_both_sides() {
        let t = Tick::new(MarketId::new("m"), OptionId::new("o"), ts(1)).with_last(Some(dec!(0.5)));
        assert_eq!(t.mid(), Some(dec!(0.5)));
    }

    #[test]
    fn is_newer_than_compares_observed_at() {
        let older = Tick::new(MarketId::new("m"), OptionId::new("o"), ts(1));
        let newer = Tick::new(MarketId::new("m"), OptionId::new("o"), ts(2));
        assert!(newer.is_newer_than(&older));
        assert!(!older.is_newer_than(&newer));
    }
}
