//! Deterministic synthetic venue, used for local development, demos and
//! integration tests that need a venue without network access.

use async_trait::async_trait;
use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tokio::sync::Mutex;

use crate::core::domain::{Market, MarketId, MarketOption, MarketStatus, OptionId, Tick};

use super::{VenueClient, VenueError};

/// A venue backed by a seeded RNG. Two instances built with the same seed
/// produce identical market lists and tick sequences, which makes it
/// usable as a deterministic fixture rather than only a demo toy.
pub struct SyntheticVenueClient {
    markets: Vec<Market>,
    rng: Mutex<StdRng>,
}

impl SyntheticVenueClient {
    #[must_use]
    pub fn new(seed: u64, market_count: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let markets = (0..market_count)
            .map(|i| {
                let market_id = MarketId::new(format!("synthetic-{i}"));
                Market::new(market_id.clone(), format!("Synthetic market {i}"), MarketStatus::Open)
                    .with_options(vec![
                        MarketOption::new(OptionId::new("yes"), market_id.clone(), "Yes"),
                        MarketOption::new(OptionId::new("no"), market_id, "No"),
                    ])
            })
            .collect();
        let _ = rng.gen::<u8>();
        Self {
            markets,
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl VenueClient for SyntheticVenueClient {
    fn venue_name(&self) -> &'static str {
        "synthetic"
    }

    async fn list_markets(&self) -> Result<Vec<Market>, VenueError> {
        Ok(self.markets.clone())
    }

    async fn fetch_ticks(&self, markets: &[MarketId]) -> Result<Vec<Tick>, VenueError> {
        let mut rng = self.rng.lock().await;
        let now = Utc::now();
        let mut ticks = Vec::new();
        for market in &self.markets {
            if !markets.is_empty() && !markets.contains(market.market_id()) {
                continue;
            }
            let yes_price = rng.gen_range(0.05..0.95);
            let spread = rng.gen_range(0.005..0.03);
            let yes = Decimal::from_f64(yes_price).unwrap_or(Decimal::new(50, 2));
            let no = Decimal::ONE - yes;
            let half_spread = Decimal::from_f64(spread / 2.0).unwrap_or(Decimal::new(1, 2));
            for option in market.options() {
                let mid = if option.label().eq_ignore_ascii_case("yes") {
                    yes
                } else {
                    no
                };
                ticks.push(
                    Tick::new(market.market_id().clone(), option.option_id().clone(), now)
                        .with_bid(Some(mid - half_spread))
                        .with_ask(Some(mid + half_spread))
                        .with_last(Some(mid)),
                );
            }
        }
        Ok(ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_seed_produces_same_market_set() {
        let a = SyntheticVenueClient::new(42, 3);
        let b = SyntheticVenueClient::new(42, 3);
        let ma = a.list_markets().await.unwrap();
        let mb = b.list_markets().await.unwrap();
        assert_eq!(ma.len(), mb.len());
        assert_eq!(ma[0].market_id(), mb[0].market_id());
    }

    #[tokio::test]
    async fn fetch_ticks_covers_every_option_of_every_requested_market() {
        let venue = SyntheticVenueClient::new(1, 2);
        let markets = venue.list_markets().await.unwrap();
        let ids: Vec<_> = markets.iter().map(|m| m.market_id().clone()).collect();
        let ticks = venue.fetch_ticks(&ids).await.unwrap();
        assert_eq!(ticks.len(), 4);
    }

    #[tokio::test]
    async fn yes_and_no_mid_prices_sum_to_one() {
        let venue = SyntheticVenueClient::new(7, 1);
        let markets = venue.list_markets().await.unwrap();
        let ids: Vec<_> = markets.iter().map(|m| m.market_id().clone()).collect();
        let ticks = venue.fetch_ticks(&ids).await.unwrap();
        let sum: Decimal = ticks.iter().filter_map(Tick::last).sum();
        assert_eq!(sum, Decimal::ONE);
    }
}
