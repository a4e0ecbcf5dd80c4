//! Domain invariants for sibling ordering

use super::entities::{ItemId, StoredItem};
use super::rank::RankValue;
use std::collections::HashSet;

/// INVARIANT-1: Unique Ranks
/// No two siblings share a rank.
pub fn invariant_unique_ranks(siblings: &[StoredItem]) -> bool {
    let mut seen = HashSet::with_capacity(siblings.len());
    siblings.iter().all(|item| seen.insert(item.rank.as_str()))
}

/// INVARIANT-2: Strict Order
/// Siblings listed by the store are strictly increasing by rank.
pub fn invariant_strictly_increasing(siblings: &[StoredItem]) -> bool {
    siblings.windows(2).all(|w| w[0].rank < w[1].rank)
}

/// INVARIANT-3: Well-Formed
/// Every stored rank parses.
pub fn invariant_ranks_parse(siblings: &[StoredItem]) -> bool {
    siblings.iter().all(|item| RankValue::parse(&item.rank).is_ok())
}

/// Ids of siblings whose rank repeats an earlier sibling's rank.
pub fn duplicate_rank_items(siblings: &[StoredItem]) -> Vec<ItemId> {
    let mut seen = HashSet::with_capacity(siblings.len());
    siblings
        .iter()
        .filter(|item| !seen.insert(item.rank.as_str()))
        .map(|item| item.id.clone())
        .collect()
}

/// All ordering invariants at once.
pub fn check_all_invariants(siblings: &[StoredItem]) -> bool {
    invariant_unique_ranks(siblings)
        && invariant_strictly_increasing(siblings)
        && invariant_ranks_parse(siblings)
}
