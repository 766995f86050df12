//! Trending content rankings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{ContentId, Result, TenantId};

/// One ranked row produced by the upstream ranking job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingEntry {
    pub tenant_id: TenantId,
    pub time_bucket: DateTime<Utc>,
    pub content_id: ContentId,
    /// Lower is more trending.
    pub rank: u32,
}

/// Content trending for one tenant at one time bucket, most trending first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingList {
    items: Vec<ContentId>,
}

impl TrendingList {
    /// Order entries ascending by rank.
    ///
    /// The sort is stable, so ties keep their fetch order. If a content id
    /// appears more than once only its best-ranked occurrence is kept.
    pub fn from_entries(mut entries: Vec<TrendingEntry>) -> Self {
        entries.sort_by_key(|e| e.rank);
        let mut seen = HashSet::new();
        let items = entries
            .into_iter()
            .filter(|e| seen.insert(e.content_id.clone()))
            .map(|e| e.content_id)
            .collect();
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[ContentId] {
        &self.items
    }
}

impl FromIterator<ContentId> for TrendingList {
    /// Build a list that is already in rank order.
    fn from_iter<I: IntoIterator<Item = ContentId>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// Resolves what is trending for a tenant "right now".
#[async_trait]
pub trait TrendingIndex: Send + Sync {
    /// Ranked content for `tenant` at the floored `bucket`.
    /// A tenant with no rows yields an empty list, not an error.
    async fn trending_for(
        &self,
        tenant: &TenantId,
        bucket: DateTime<Utc>,
    ) -> Result<TrendingList>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(content: &str, rank: u32) -> TrendingEntry {
        TrendingEntry {
            tenant_id: TenantId::new("acme"),
            time_bucket: Utc.with_ymd_and_hms(2024, 3, 10, 10, 0, 0).unwrap(),
            content_id: ContentId::new(content),
            rank,
        }
    }

    fn ids(list: &TrendingList) -> Vec<&str> {
        list.items().iter().map(|c| c.as_str()).collect()
    }

    #[test]
    fn test_sorted_by_rank() {
        let list = TrendingList::from_entries(vec![entry("C", 3), entry("A", 1), entry("B", 2)]);
        assert_eq!(ids(&list), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_ties_keep_fetch_order() {
        let list = TrendingList::from_entries(vec![
            entry("x", 2),
            entry("b", 1),
            entry("a", 1),
            entry("y", 2),
        ]);
        assert_eq!(ids(&list), vec!["b", "a", "x", "y"]);
    }

    #[test]
    fn test_duplicate_content_keeps_best_rank() {
        let list = TrendingList::from_entries(vec![entry("A", 4), entry("B", 2), entry("A", 1)]);
        assert_eq!(ids(&list), vec!["A", "B"]);
    }

    #[test]
    fn test_empty() {
        let list = TrendingList::from_entries(Vec::new());
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }
}
