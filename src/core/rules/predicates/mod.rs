//! One module per [`crate::core::domain::RuleType`].

pub mod cross_market_misprice;
pub mod dutch_book;
pub mod endgame_sweep;
pub mod spike_detect;
pub mod sum_lt_1;
pub mod synonym_misprice;
pub mod trend_breakout;

pub use cross_market_misprice::CrossMarketMispricePredicate;
pub use dutch_book::DutchBookDetectPredicate;
pub use endgame_sweep::EndgameSweepPredicate;
pub use spike_detect::SpikeDetectPredicate;
pub use sum_lt_1::SumLt1Predicate;
pub use synonym_misprice::SynonymMispricePredicate;
pub use trend_breakout::TrendBreakoutPredicate;
