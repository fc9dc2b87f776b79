//! Market and Option domain types.

use chrono::{DateTime, Utc};

use super::ids::{MarketId, OptionId};

/// Lifecycle status of a Market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketStatus {
    Open,
    Closing,
    Closed,
}

/// A single purchasable outcome within a Market.
///
/// For real venues `option_id` equals the upstream CLOB token id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketOption {
    option_id: OptionId,
    market_id: MarketId,
    label: String,
}

impl MarketOption {
    #[must_use]
    pub fn new(option_id: OptionId, market_id: MarketId, label: impl Into<String>) -> Self {
        Self {
            option_id,
            market_id,
            label: label.into(),
        }
    }

    #[must_use]
    pub const fn option_id(&self) -> &OptionId {
        &self.option_id
    }

    #[must_use]
    pub const fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A prediction market, identified by an opaque `market_id`.
///
/// Owns zero or more [`MarketOption`]s; every option's `option_id` must
/// belong to the option's `market_id`.
#[derive(Debug, Clone)]
pub struct Market {
    market_id: MarketId,
    title: String,
    status: MarketStatus,
    start_ts: Option<DateTime<Utc>>,
    end_ts: Option<DateTime<Utc>>,
    tags: Vec<String>,
    /// Reserved for `method=embedding` synonym grouping; not populated by
    /// core conformance.
    embedding: Option<Vec<f32>>,
    options: Vec<MarketOption>,
}

impl Market {
    #[must_use]
    pub fn new(market_id: MarketId, title: impl Into<String>, status: MarketStatus) -> Self {
        Self {
            market_id,
            title: title.into(),
            status,
            start_ts: None,
            end_ts: None,
            tags: Vec::new(),
            embedding: None,
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: Vec<MarketOption>) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_end_ts(mut self, end_ts: Option<DateTime<Utc>>) -> Self {
        self.end_ts = end_ts;
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub const fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub const fn status(&self) -> MarketStatus {
        self.status
    }

    #[must_use]
    pub const fn start_ts(&self) -> Option<DateTime<Utc>> {
        self.start_ts
    }

    #[must_use]
    pub const fn end_ts(&self) -> Option<DateTime<Utc>> {
        self.end_ts
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[must_use]
    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }

    #[must_use]
    pub fn options(&self) -> &[MarketOption] {
        &self.options
    }

    /// Hours remaining until `end_ts`, relative to `now`. `None` if the
    /// market has no declared end time.
    #[must_use]
    pub fn hours_to_close(&self, now: DateTime<Utc>) -> Option<f64> {
        self.end_ts
            .map(|end| (end - now).num_seconds() as f64 / 3600.0)
    }

    /// Find an option by label, case-insensitively. Label identity is the
    /// only cross-venue alignment rule core conformance implements.
    #[must_use]
    pub fn option_by_label(&self, label: &str) -> Option<&MarketOption> {
        self.options
            .iter()
            .find(|o| o.label.eq_ignore_ascii_case(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market() -> Market {
        Market::new(MarketId::new("m1"), "Will it rain?", MarketStatus::Open).with_options(vec![
            MarketOption::new(OptionId::new("yes"), MarketId::new("m1"), "Yes"),
            MarketOption::new(OptionId::new("no"), MarketId::new("m1"), "No"),
        ])
    }

    #[test]
    fn accessors_return_constructed_values() {
        let m = market();
        assert_eq!(m.market_id().as_str(), "m1");
        assert_eq!(m.title(), "Will it rain?");
        assert_eq!(m.status(), MarketStatus::Open);
        assert_eq!(m.options().len(), 2);
    }

    #[test]
    fn option_by_label_is_case_insensitive() {
        let m = market();
        assert_eq!(m.option_by_label("YES").unwrap().option_id().as_str(), "yes");
        assert!(m.option_by_label("maybe").is_none());
    }

    #[test]
    fn hours_to_close_is_none_without_end_ts() {
        let m = market();
        assert!(m.hours_to_close(Utc::now()).is_none());
    }

    #[test]
    fn hours_to_close_computes_positive_remaining_hours() {
        let end = Utc::now() + chrono::Duration::hours(5);
        let m = market().with_end_ts(Some(end));
        let remaining = m.hours_to_close(Utc::now()).unwrap();
        assert!((remaining - 5.0).abs() < 0.01);
    }
}
