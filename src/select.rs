// src/select.rs
//! Rank allow-lists and the pure filter applied to both feeds.

use crate::types::RankEntry;

/// Ranks 1-10, then every tenth rank up to 100. Applied to the top-100 feed.
pub const TOP_TIER_RANKS: &[u32] = &[
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100,
];

/// Hundreds and thousands thresholds up to 10000. Applied to the border feed.
pub const MID_TIER_RANKS: &[u32] = &[
    200, 300, 400, 500, 1000, 1500, 2000, 2500, 3000, 5000, 10000,
];

/// Keep the entries whose rank is exactly on the allow-list, in input order.
pub fn select(items: &[RankEntry], allowed: &[u32]) -> Vec<RankEntry> {
    items
        .iter()
        .filter(|e| allowed.contains(&e.rank))
        .copied()
        .collect()
}

/// The pair of allow-lists one pipeline run filters with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankSelection {
    pub top: Vec<u32>,
    pub mid: Vec<u32>,
}

impl Default for RankSelection {
    fn default() -> Self {
        Self {
            top: TOP_TIER_RANKS.to_vec(),
            mid: MID_TIER_RANKS.to_vec(),
        }
    }
}

impl RankSelection {
    pub fn select_top(&self, items: &[RankEntry]) -> Vec<RankEntry> {
        select(items, &self.top)
    }

    pub fn select_border(&self, items: &[RankEntry]) -> Vec<RankEntry> {
        select(items, &self.mid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(rank: u32, score: u64) -> RankEntry {
        RankEntry { rank, score }
    }

    #[test]
    fn keeps_exact_matches_in_input_order() {
        let items = vec![e(1, 100), e(2, 90), e(11, 50), e(20, 40), e(21, 39)];
        let out = select(&items, TOP_TIER_RANKS);
        assert_eq!(out, vec![e(1, 100), e(2, 90), e(20, 40)]);
    }

    #[test]
    fn empty_input_or_list_selects_nothing() {
        assert!(select(&[], TOP_TIER_RANKS).is_empty());
        assert!(select(&[e(1, 1)], &[]).is_empty());
    }

    #[test]
    fn default_lists_are_disjoint_and_sized() {
        assert_eq!(TOP_TIER_RANKS.len(), 19);
        assert_eq!(MID_TIER_RANKS.len(), 11);
        assert!(TOP_TIER_RANKS.iter().all(|r| !MID_TIER_RANKS.contains(r)));
    }

    #[test]
    fn selection_applies_each_list_to_its_feed() {
        let sel = RankSelection::default();
        // rank 200 is a mid-tier rank, so the top list must not keep it
        assert!(sel.select_top(&[e(200, 1)]).is_empty());
        assert_eq!(sel.select_border(&[e(200, 1), e(999, 2)]), vec![e(200, 1)]);
    }
}
