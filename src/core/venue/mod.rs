//! Venue client: the pluggable boundary between a prediction-market venue
//! and the rest of the system. A small `Send + Sync` trait object behind
//! which concrete venues live, so the ingestion pipeline never depends on
//! a specific venue.

pub mod cache;
pub mod polymarket;
pub mod synthetic;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::domain::{Market, MarketId, Tick};

pub use cache::BookCache;
pub use polymarket::PolymarketVenueClient;
pub use synthetic::SyntheticVenueClient;

/// Errors a [`VenueClient`] can surface. Classified into retriable and
/// fatal so the ingestion pipeline's backoff policy can dispatch on it
/// without inspecting error strings.
#[derive(Error, Debug, Clone)]
pub enum VenueError {
    #[error("venue request timed out")]
    Timeout,

    #[error("venue connection failed: {0}")]
    Connection(String),

    #[error("venue returned server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("venue rate limited the request")]
    RateLimited,

    #[error("venue rejected the request ({status}): {body}")]
    ClientError { status: u16, body: String },

    #[error("venue payload failed schema validation: {0}")]
    SchemaViolation(String),
}

impl VenueError {
    /// `true` for transient faults the ingestion pipeline's backoff policy
    /// should retry; `false` for faults that will not resolve by retrying
    /// the same request.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Connection(_) | Self::ServerError { .. } | Self::RateLimited
        )
    }
}

/// A venue: something that can list markets and fetch their current
/// ticks. Concrete implementations (Polymarket, synthetic) live behind
/// this trait so the ingestion pipeline is venue-agnostic.
#[async_trait]
pub trait VenueClient: Send + Sync {
    /// Stable identifier for this venue, used in logs and metrics labels.
    fn venue_name(&self) -> &'static str;

    /// List markets currently tracked by this venue.
    async fn list_markets(&self) -> Result<Vec<Market>, VenueError>;

    /// Fetch the latest tick for every option of the given markets.
    async fn fetch_ticks(&self, markets: &[MarketId]) -> Result<Vec<Tick>, VenueError>;
}
