//! Alert delivery: formats a fired [`Signal`] into a bounded text payload
//! and hands it to a pluggable transport.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::core::domain::Signal;
use crate::core::metrics::Metrics;

const MAX_PAYLOAD_BYTES: usize = 4096;

#[derive(Error, Debug, Clone)]
pub enum AlertError {
    #[error("alert transport failed: {0}")]
    TransportFailed(String),
}

/// A destination for formatted alert text. Implementations must not
/// block the rule engine; slow transports should buffer or spawn.
#[async_trait]
pub trait AlertTransport: Send + Sync {
    async fn send(&self, payload: &str) -> Result<(), AlertError>;
}

/// Render a signal into an operator-readable payload, truncated to
/// [`MAX_PAYLOAD_BYTES`] so no transport with a hard payload limit ever
/// rejects it outright.
#[must_use]
pub fn format_alert(signal: &Signal) -> String {
    let mut text = format!(
        "[{:?}] {} fired on market {} at {} (edge_score={})\npayload: {:?}",
        signal.level(),
        signal.rule_type().as_str(),
        signal.market_id(),
        signal.emitted_at(),
        signal.edge_score(),
        signal.payload(),
    );
    if text.len() > MAX_PAYLOAD_BYTES {
        text.truncate(MAX_PAYLOAD_BYTES - 3);
        text.push_str("...");
    }
    text
}

/// Dry-run transport: logs the payload through `tracing` instead of
/// calling out to a real channel. The default transport until an
/// operator configures a real one.
pub struct LogAlertTransport;

#[async_trait]
impl AlertTransport for LogAlertTransport {
    async fn send(&self, payload: &str) -> Result<(), AlertError> {
        info!(target: "alerts", "{payload}");
        Ok(())
    }
}

/// Dispatches a signal to a transport, recording delivery failures in
/// metrics so a broken webhook shows up on the dashboard rather than
/// only in logs.
pub struct AlertDispatcher {
    transport: Box<dyn AlertTransport>,
    metrics: Metrics,
}

impl AlertDispatcher {
    #[must_use]
    pub fn new(transport: Box<dyn AlertTransport>, metrics: Metrics) -> Self {
        Self { transport, metrics }
    }

    pub async fn dispatch(&self, signal: &Signal) {
        let payload = format_alert(signal);
        if let Err(err) = self.transport.send(&payload).await {
            tracing::warn!(error = %err, "alert delivery failed");
            self.metrics.record_alert_failure();
        }
    }
}
