//! Synonym groups: sets of options across markets believed to resolve on
//! the same underlying event, used by `SYNONYM_MISPRICE`.

use super::ids::{GroupId, MarketId, OptionId};

/// How a [`SynonymGroup`]'s membership was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynonymMethod {
    /// Operator-curated list of (market, option) pairs.
    Explicit,
    /// Title/label keyword overlap above a configured threshold.
    Keyword,
    /// Reserved for embedding-similarity grouping; no core conformance
    /// implementation computes embeddings today.
    Embedding,
}

/// One member of a [`SynonymGroup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymMember {
    pub market_id: MarketId,
    pub option_id: OptionId,
}

/// A set of options across (usually distinct) markets that should track
/// the same implied probability.
#[derive(Debug, Clone)]
pub struct SynonymGroup {
    group_id: GroupId,
    method: SynonymMethod,
    members: Vec<SynonymMember>,
}

impl SynonymGroup {
    #[must_use]
    pub fn new(group_id: GroupId, method: SynonymMethod, members: Vec<SynonymMember>) -> Self {
        Self {
            group_id,
            method,
            members,
        }
    }

    #[must_use]
    pub const fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    #[must_use]
    pub const fn method(&self) -> SynonymMethod {
        self.method
    }

    #[must_use]
    pub fn members(&self) -> &[SynonymMember] {
        &self.members
    }

    #[must_use]
    pub fn contains(&self, market_id: &MarketId, option_id: &OptionId) -> bool {
        self.members
            .iter()
            .any(|m| &m.market_id == market_id && &m.option_id == option_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_finds_exact_member() {
        let group = SynonymGroup::new(
            GroupId::new("g1"),
            SynonymMethod::Explicit,
            vec![SynonymMember {
                market_id: MarketId::new("m1"),
                option_id: OptionId::new("yes"),
            }],
        );
        assert!(group.contains(&MarketId::new("m1"), &OptionId::new("yes")));
        assert!(!group.contains(&MarketId::new("m1"), &OptionId::new("no")));
    }
}
