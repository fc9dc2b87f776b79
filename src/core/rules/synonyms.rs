//! Loads declarative synonym groups (`SynonymMethod::Explicit` and
//! `SynonymMethod::Keyword`) from TOML configuration.

use serde::Deserialize;

use crate::core::domain::{GroupId, Market, MarketId, OptionId, SynonymGroup, SynonymMember, SynonymMethod};
use crate::error::Result;

#[derive(Debug, Deserialize)]
struct SynonymFile {
    #[serde(default)]
    group: Vec<SynonymRow>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
enum SynonymRow {
    Explicit {
        id: String,
        members: Vec<MemberRow>,
    },
    Keyword {
        id: String,
        keywords: Vec<String>,
        #[serde(default = "default_min_overlap")]
        min_overlap: usize,
    },
}

#[derive(Debug, Deserialize)]
struct MemberRow {
    market_id: String,
    option_id: String,
}

const fn default_min_overlap() -> usize {
    2
}

/// Resolve declarative synonym groups against the markets currently known
/// to the engine. Keyword groups are re-derived every call since market
/// membership can change; explicit groups are copied through verbatim.
pub fn resolve(contents: &str, markets: &[Market]) -> Result<Vec<SynonymGroup>> {
    let file: SynonymFile = toml::from_str(contents)?;
    Ok(file
        .group
        .into_iter()
        .map(|row| match row {
            SynonymRow::Explicit { id, members } => SynonymGroup::new(
                GroupId::new(id),
                SynonymMethod::Explicit,
                members
                    .into_iter()
                    .map(|m| SynonymMember {
                        market_id: MarketId::new(m.market_id),
                        option_id: OptionId::new(m.option_id),
                    })
                    .collect(),
            ),
            SynonymRow::Keyword {
                id,
                keywords,
                min_overlap,
            } => {
                let members = keyword_members(markets, &keywords, min_overlap);
                SynonymGroup::new(GroupId::new(id), SynonymMethod::Keyword, members)
            }
        })
        .collect())
}

fn keyword_members(markets: &[Market], keywords: &[String], min_overlap: usize) -> Vec<SynonymMember> {
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_ascii_lowercase()).collect();
    let mut members = Vec::new();
    for market in markets {
        let title = market.title().to_ascii_lowercase();
        let overlap = keywords.iter().filter(|k| title.contains(k.as_str())).count();
        if overlap >= min_overlap {
            for option in market.options() {
                members.push(SynonymMember {
                    market_id: market.market_id().clone(),
                    option_id: option.option_id().clone(),
                });
            }
        }
    }
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{MarketOption, MarketStatus};

    #[test]
    fn explicit_group_copies_members_through() {
        let toml = r#"
            [[group]]
            method = "explicit"
            id = "g1"
            members = [{ market_id = "m1", option_id = "yes" }]
        "#;
        let groups = resolve(toml, &[]).unwrap();
        assert_eq!(groups.len(), 1);
        assert!(groups[0].contains(&MarketId::new("m1"), &OptionId::new("yes")));
    }

    #[test]
    fn keyword_group_matches_markets_above_overlap_threshold() {
        let toml = r#"
            [[group]]
            method = "keyword"
            id = "g1"
            keywords = ["fed", "rate", "hike"]
            min_overlap = 2
        "#;
        let markets = vec![
            Market::new(MarketId::new("m1"), "Will the Fed hike rates?", MarketStatus::Open)
                .with_options(vec![MarketOption::new(OptionId::new("yes"), MarketId::new("m1"), "Yes")]),
            Market::new(MarketId::new("m2"), "Will it rain tomorrow?", MarketStatus::Open),
        ];
        let groups = resolve(toml, &markets).unwrap();
        assert!(groups[0].contains(&MarketId::new("m1"), &OptionId::new("yes")));
        assert!(!groups[0].contains(&MarketId::new("m2"), &OptionId::new("yes")));
    }
}
