//! Polymarket venue client: a thin REST adapter over the public Gamma and
//! CLOB endpoints. Errors are classified into [`super::VenueError`]
//! variants at this boundary so nothing downstream has to inspect HTTP
//! status codes or provider-specific payload shapes.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

use crate::core::domain::{Market, MarketId, MarketOption, MarketStatus, OptionId, Tick};

use super::{VenueClient, VenueError};

const DEFAULT_GAMMA_BASE: &str = "https://gamma-api.polymarket.com";
const DEFAULT_CLOB_BASE: &str = "https://clob.polymarket.com";

pub struct PolymarketVenueClient {
    http: reqwest::Client,
    gamma_base: String,
    clob_base: String,
}

impl PolymarketVenueClient {
    /// Build a client with a bounded request timeout; reqwest's own
    /// connect-timeout handling applies underneath.
    pub fn new(request_timeout: Duration) -> Result<Self, VenueError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| VenueError::Connection(e.to_string()))?;
        Ok(Self {
            http,
            gamma_base: DEFAULT_GAMMA_BASE.to_string(),
            clob_base: DEFAULT_CLOB_BASE.to_string(),
        })
    }

    #[must_use]
    pub fn with_bases(mut self, gamma_base: impl Into<String>, clob_base: impl Into<String>) -> Self {
        self.gamma_base = gamma_base.into();
        self.clob_base = clob_base.into();
        self
    }

    fn classify_status(status: reqwest::StatusCode, body: String) -> VenueError {
        if status.as_u16() == 429 {
            VenueError::RateLimited
        } else if status.is_server_error() {
            VenueError::ServerError {
                status: status.as_u16(),
                body,
            }
        } else {
            VenueError::ClientError {
                status: status.as_u16(),
                body,
            }
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, VenueError> {
        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                VenueError::Timeout
            } else {
                VenueError::Connection(e.to_string())
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status, body));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| VenueError::SchemaViolation(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct GammaMarket {
    condition_id: String,
    question: String,
    closed: bool,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    tokens: Vec<GammaToken>,
}

#[derive(Debug, Deserialize)]
struct GammaToken {
    token_id: String,
    outcome: String,
}

#[derive(Debug, Deserialize)]
struct ClobPrice {
    price: String,
}

#[async_trait]
impl VenueClient for PolymarketVenueClient {
    fn venue_name(&self) -> &'static str {
        "polymarket"
    }

    async fn list_markets(&self) -> Result<Vec<Market>, VenueError> {
        let url = format!("{}/markets?closed=false", self.gamma_base);
        let raw: Vec<GammaMarket> = self.get_json(&url).await?;
        Ok(raw
            .into_iter()
            .map(|m| {
                let market_id = MarketId::new(m.condition_id);
                let status = if m.closed { MarketStatus::Closed } else { MarketStatus::Open };
                let end_ts = m
                    .end_date
                    .as_deref()
                    .and_then(|d| chrono::DateTime::parse_from_rfc3339(d).ok())
                    .map(|d| d.with_timezone(&Utc));
                let options = m
                    .tokens
                    .into_iter()
                    .map(|t| MarketOption::new(OptionId::new(t.token_id), market_id.clone(), t.outcome))
                    .collect();
                Market::new(market_id, m.question, status)
                    .with_options(options)
                    .with_end_ts(end_ts)
            })
            .collect())
    }

    async fn fetch_ticks(&self, markets: &[MarketId]) -> Result<Vec<Tick>, VenueError> {
        let venue_markets = self.list_markets().await?;
        let mut ticks = Vec::new();
        let now = Utc::now();
        for market in venue_markets.iter().filter(|m| markets.contains(m.market_id())) {
            for option in market.options() {
                let bid_url = format!("{}/price?token_id={}&side=buy", self.clob_base, option.option_id());
                let ask_url = format!("{}/price?token_id={}&side=sell", self.clob_base, option.option_id());
                let bid: Option<ClobPrice> = self.get_json(&bid_url).await.ok();
                let ask: Option<ClobPrice> = self.get_json(&ask_url).await.ok();
                let parse = |p: Option<ClobPrice>| p.and_then(|p| Decimal::from_str(&p.price).ok());
                ticks.push(
                    Tick::new(market.market_id().clone(), option.option_id().clone(), now)
                        .with_bid(parse(bid))
                        .with_ask(parse(ask)),
                );
            }
        }
        Ok(ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_classifies_as_rate_limited() {
        let status = reqwest::StatusCode::from_u16(429).unwrap();
        assert!(matches!(
            PolymarketVenueClient::classify_status(status, String::new()),
            VenueError::RateLimited
        ));
    }

    #[test]
    fn status_503_classifies_as_server_error() {
        let status = reqwest::StatusCode::from_u16(503).unwrap();
        assert!(matches!(
            PolymarketVenueClient::classify_status(status, String::new()),
            VenueError::ServerError { status: 503, .. }
        ));
    }

    #[test]
    fn status_404_classifies_as_client_error() {
        let status = reqwest::StatusCode::from_u16(404).unwrap();
        assert!(matches!(
            PolymarketVenueClient::classify_status(status, String::new()),
            VenueError::ClientError { status: 404, .. }
        ));
    }
}
