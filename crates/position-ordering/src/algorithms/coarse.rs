//! Integer ordering for the coarse tier
//!
//! Lists under a board are reordered rarely, so they carry a plain integer
//! `order`. Appends take `max + 1`; a move renumbers the whole sibling set.

use crate::domain::entities::{CoarseOrderedItem, ItemId};

/// Order for an item appended after `current_max` (`1` for an empty parent).
///
/// `None` when `current_max` is already `i64::MAX`.
pub fn next_order(current_max: Option<i64>) -> Option<i64> {
    current_max.unwrap_or(0).checked_add(1)
}

/// Sequential orders `1..=N` for `siblings` with `item` moved to `index`.
///
/// `index` is clamped to the sibling count. Returns `None` if `item` is not
/// among the siblings.
pub fn renumber_with_move(
    siblings: &[CoarseOrderedItem],
    item: &ItemId,
    index: usize,
) -> Option<Vec<(ItemId, i64)>> {
    let from = siblings.iter().position(|s| &s.id == item)?;

    let mut ids: Vec<ItemId> = siblings.iter().map(|s| s.id.clone()).collect();
    let moved = ids.remove(from);
    let index = index.min(ids.len());
    ids.insert(index, moved);

    Some(
        ids.into_iter()
            .enumerate()
            .map(|(i, id)| (id, i as i64 + 1))
            .collect(),
    )
}
