//! Outbound Ports (Driven Ports / SPI)
//!
//! Storage the host application provides. Implementations must apply every
//! write atomically and only if the parent's revision still matches the one
//! observed during the read phase.

use crate::domain::entities::{
    BatchPositionWrite, CoarseOrderedItem, ItemId, ParentId, PositionWrite, Revision, StoredItem,
};
use crate::domain::errors::StoreError;
use async_trait::async_trait;

/// Store of rank-ordered items (cards under lists).
///
/// Production: a SQL table with a text `position` column.
/// Testing: `InMemoryPositionStore`.
#[async_trait]
pub trait OrderedItemStore: Send + Sync {
    /// Current revision of a parent (`Revision(0)` for an unknown parent).
    async fn parent_revision(&self, parent: &ParentId) -> Result<Revision, StoreError>;

    /// Fetch one item, including its stored rank.
    async fn get_item(&self, id: &ItemId) -> Result<StoredItem, StoreError>;

    /// All children of `parent`, ordered by rank text.
    async fn list_siblings_ordered(&self, parent: &ParentId) -> Result<Vec<StoredItem>, StoreError>;

    /// Create or move one item.
    ///
    /// Fails with `ConcurrentModification` if the target parent's revision is
    /// no longer `expected_revision`, and with `NotFound` when updating an item
    /// that no longer exists. Bumps the revision of the target parent and, for
    /// cross-parent moves, of the source parent.
    async fn write_item_position(&self, write: PositionWrite) -> Result<StoredItem, StoreError>;

    /// Replace the ranks of several children of one parent at once.
    ///
    /// All-or-nothing; conditional on `expected_revision`.
    async fn write_batch_positions(&self, batch: BatchPositionWrite) -> Result<(), StoreError>;
}

/// Store of integer-ordered items (lists under boards).
#[async_trait]
pub trait CoarseItemStore: Send + Sync {
    /// Current revision of a parent in the coarse tier.
    async fn coarse_revision(&self, parent: &ParentId) -> Result<Revision, StoreError>;

    /// All children of `parent`, ordered by `order` then id.
    async fn list_coarse_ordered(
        &self,
        parent: &ParentId,
    ) -> Result<Vec<CoarseOrderedItem>, StoreError>;

    /// Insert a new item, conditional on `expected_revision`.
    async fn append_coarse(
        &self,
        item: CoarseOrderedItem,
        expected_revision: Revision,
    ) -> Result<CoarseOrderedItem, StoreError>;

    /// Rewrite the orders of a parent's children, conditional on `expected_revision`.
    async fn renumber_coarse(
        &self,
        parent: &ParentId,
        orders: Vec<(ItemId, i64)>,
        expected_revision: Revision,
    ) -> Result<(), StoreError>;
}
