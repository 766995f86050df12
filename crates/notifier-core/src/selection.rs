//! Content selection policies.
//!
//! Rank decides which content is on the list and in what order; the
//! policy decides how much that order matters when picking for a user.

use derive_more::Display;
use rand::RngCore;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::{ContentId, Error, TrendingList};

/// Picks one content id from a trending list.
pub trait ContentSelector: Send + Sync {
    /// `None` only when the list is empty.
    fn select<'a>(
        &self,
        trending: &'a TrendingList,
        rng: &mut dyn RngCore,
    ) -> Option<&'a ContentId>;
}

/// Every listed item is equally likely.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSelector;

impl ContentSelector for UniformSelector {
    fn select<'a>(
        &self,
        trending: &'a TrendingList,
        rng: &mut dyn RngCore,
    ) -> Option<&'a ContentId> {
        trending.items().choose(rng)
    }
}

/// Weight of the item at position `i` (0-based) is `1 / (i + 1)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankWeightedSelector;

impl ContentSelector for RankWeightedSelector {
    fn select<'a>(
        &self,
        trending: &'a TrendingList,
        rng: &mut dyn RngCore,
    ) -> Option<&'a ContentId> {
        let items = trending.items();
        let weights = (1..=items.len()).map(|pos| 1.0 / pos as f64);
        let dist = WeightedIndex::new(weights).ok()?;
        items.get(dist.sample(rng))
    }
}

/// Configurable selection policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    #[default]
    #[display("uniform")]
    Uniform,
    #[display("rank-weighted")]
    RankWeighted,
}

impl SelectionPolicy {
    pub fn selector(self) -> Box<dyn ContentSelector> {
        match self {
            SelectionPolicy::Uniform => Box::new(UniformSelector),
            SelectionPolicy::RankWeighted => Box::new(RankWeightedSelector),
        }
    }
}

impl std::str::FromStr for SelectionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "uniform" => Ok(SelectionPolicy::Uniform),
            "rank-weighted" => Ok(SelectionPolicy::RankWeighted),
            other => Err(Error::InvalidInput(format!(
                "unknown selection policy: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn list(ids: &[&str]) -> TrendingList {
        ids.iter().map(|id| ContentId::new(*id)).collect()
    }

    fn tally(selector: &dyn ContentSelector, trending: &TrendingList) -> HashMap<String, usize> {
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts = HashMap::new();
        for _ in 0..6000 {
            let picked = selector.select(trending, &mut rng).unwrap();
            *counts.entry(picked.to_string()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_empty_list_selects_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty = TrendingList::default();
        assert!(UniformSelector.select(&empty, &mut rng).is_none());
        assert!(RankWeightedSelector.select(&empty, &mut rng).is_none());
    }

    #[test]
    fn test_uniform_covers_whole_list() {
        let trending = list(&["A", "B", "C"]);
        let counts = tally(&UniformSelector, &trending);
        assert_eq!(counts.len(), 3);
        for id in ["A", "B", "C"] {
            let n = counts[id];
            assert!((1600..2400).contains(&n), "{id} picked {n} times");
        }
    }

    #[test]
    fn test_rank_weighted_favours_top() {
        let trending = list(&["A", "B", "C"]);
        let counts = tally(&RankWeightedSelector, &trending);
        assert!(counts["A"] > counts["B"]);
        assert!(counts["B"] > counts["C"]);
    }

    #[test]
    fn test_same_seed_same_choice() {
        let trending = list(&["A", "B", "C", "D"]);
        let pick = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            UniformSelector.select(&trending, &mut rng).cloned()
        };
        assert_eq!(pick(42), pick(42));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "rank-weighted".parse::<SelectionPolicy>().unwrap(),
            SelectionPolicy::RankWeighted
        );
        assert_eq!(SelectionPolicy::Uniform.to_string(), "uniform");
        assert!("weighted".parse::<SelectionPolicy>().is_err());
    }
}
