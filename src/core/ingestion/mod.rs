//! Ingestion pipeline: polls a [`VenueClient`] on a fixed cycle, filters
//! out ticks that carry no new information, and feeds the survivors into
//! the book cache and onward to the rule engine.

pub mod backoff;
pub mod dedup;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::core::domain::{MarketId, Tick};
use crate::core::metrics::Metrics;
use crate::core::venue::{BookCache, VenueClient, VenueError};

use backoff::Backoff;
use dedup::LastValueCache;

/// One fetch-process-sleep cycle over a single venue. Cycles never
/// overlap: the next fetch only starts after the previous one (and its
/// sleep) has finished, so a slow venue naturally backs off the whole
/// pipeline rather than queueing unbounded work.
pub struct IngestionPipeline {
    venue: Arc<dyn VenueClient>,
    cache: Arc<BookCache>,
    dedup: LastValueCache,
    metrics: Metrics,
    poll_interval: Duration,
}

impl IngestionPipeline {
    #[must_use]
    pub fn new(venue: Arc<dyn VenueClient>, cache: Arc<BookCache>, metrics: Metrics, poll_interval: Duration, min_flush_interval: Duration) -> Self {
        Self {
            venue,
            cache,
            dedup: LastValueCache::new(min_flush_interval),
            metrics,
            poll_interval,
        }
    }

    /// Run until `cancel` fires. Forwarded ticks are sent to `tx`; if the
    /// receiver has been dropped the loop exits on the next send attempt.
    pub async fn run(
        mut self,
        markets: Vec<MarketId>,
        tx: mpsc::Sender<Tick>,
        cancel: CancellationToken,
    ) {
        let venue_name = self.venue.venue_name();
        let mut backoff = Backoff::new(Duration::from_millis(500), Duration::from_secs(60));
        info!(venue = venue_name, "ingestion pipeline starting");

        loop {
            if cancel.is_cancelled() {
                info!(venue = venue_name, "ingestion pipeline stopping");
                return;
            }

            let cycle_start = Instant::now();
            match self.venue.fetch_ticks(&markets).await {
                Ok(ticks) => {
                    self.metrics.record_ingest_latency(venue_name, cycle_start.elapsed());
                    backoff.reset();
                    let mut forwarded = 0usize;
                    for tick in ticks {
                        self.cache.insert(tick.clone());
                        if self.dedup.should_forward(&tick) {
                            self.metrics.record_ingest_tick(venue_name, tick.observed_at());
                            forwarded += 1;
                            if tx.send(tick).await.is_err() {
                                warn!(venue = venue_name, "ingestion receiver dropped, stopping");
                                return;
                            }
                        }
                    }
                    debug!(venue = venue_name, forwarded, "ingestion cycle complete");
                }
                Err(err) if err.is_retriable() => {
                    let delay = backoff.next_delay();
                    warn!(venue = venue_name, attempt = backoff.attempt(), error = %err, delay_ms = delay.as_millis() as u64, "retriable ingestion error, backing off");
                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        () = cancel.cancelled() => return,
                    }
                    continue;
                }
                Err(err) => {
                    error!(venue = venue_name, error = %err, "fatal ingestion error, skipping cycle");
                }
            }

            tokio::select! {
                () = tokio::time::sleep(self.poll_interval) => {}
                () = cancel.cancelled() => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::core::domain::{Market, MarketStatus, OptionId};

    struct CountingVenue {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VenueClient for CountingVenue {
        fn venue_name(&self) -> &'static str {
            "counting"
        }

        async fn list_markets(&self) -> Result<Vec<Market>, VenueError> {
            Ok(vec![Market::new(MarketId::new("m1"), "m", MarketStatus::Open)])
        }

        async fn fetch_ticks(&self, _markets: &[MarketId]) -> Result<Vec<Tick>, VenueError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Tick::new(MarketId::new("m1"), OptionId::new("yes"), Utc::now())
                .with_last(Some(rust_decimal::Decimal::new(n as i64, 0)))])
        }
    }

    #[tokio::test]
    async fn forwards_distinct_ticks_and_stops_on_cancel() {
        let venue: Arc<dyn VenueClient> = Arc::new(CountingVenue { calls: AtomicUsize::new(0) });
        let cache = Arc::new(BookCache::new());
        let pipeline = IngestionPipeline::new(venue, cache, Metrics::new(), Duration::from_millis(5), Duration::from_secs(30));
        let (tx, mut rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();

        let handle = tokio::spawn(pipeline.run(vec![MarketId::new("m1")], tx, cancel_clone));

        let first = rx.recv().await;
        assert!(first.is_some());
        cancel.cancel();
        let _ = handle.await;
    }
}
