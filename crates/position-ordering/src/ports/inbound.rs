//! Inbound Ports (Driving Ports / API)

use crate::domain::entities::{CoarseOrderedItem, ItemId, OrderedItem, ParentId, Placement};
use crate::domain::errors::{CoarseOrderError, PositionError};
use async_trait::async_trait;

/// Primary Position Ordering API
#[async_trait]
pub trait PositionApi: Send + Sync {
    /// Create an item as the last child of `parent`.
    async fn insert_at_end(&self, parent: &ParentId) -> Result<OrderedItem, PositionError>;

    /// Create an item between the given neighbors.
    ///
    /// Neighbor ranks are read at call time. With neither neighbor the item
    /// is appended (the initial rank in an empty parent).
    async fn insert_between(
        &self,
        parent: &ParentId,
        placement: Placement,
    ) -> Result<OrderedItem, PositionError>;

    /// Move an existing item under `new_parent` between the given neighbors.
    ///
    /// With neither neighbor the item is appended to `new_parent`.
    async fn move_item(
        &self,
        item: &ItemId,
        new_parent: &ParentId,
        placement: Placement,
    ) -> Result<OrderedItem, PositionError>;

    /// Children of `parent` in display order.
    async fn list_ordered(&self, parent: &ParentId) -> Result<Vec<OrderedItem>, PositionError>;
}

/// Integer ordering API for rarely reordered parents.
#[async_trait]
pub trait CoarseOrderingApi: Send + Sync {
    /// Create an item with order `max + 1`.
    async fn append(&self, parent: &ParentId) -> Result<CoarseOrderedItem, CoarseOrderError>;

    /// Move an item to `index` (0-based) and renumber all siblings.
    async fn move_to(
        &self,
        parent: &ParentId,
        item: &ItemId,
        index: usize,
    ) -> Result<Vec<CoarseOrderedItem>, CoarseOrderError>;

    /// Children of `parent` in display order.
    async fn list_ordered(
        &self,
        parent: &ParentId,
    ) -> Result<Vec<CoarseOrderedItem>, CoarseOrderError>;
}
