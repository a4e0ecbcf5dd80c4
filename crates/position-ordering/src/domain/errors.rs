//! Error types for position ordering

use super::entities::{ItemId, ParentId};
use thiserror::Error;

/// Failures of the pure rank allocator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankError {
    /// Stored text is not a rank
    #[error("Invalid rank format '{rank}': {reason}")]
    InvalidFormat { rank: String, reason: String },

    /// No value fits at or below the maximum precision
    #[error("Rank space exhausted at max length {max_length}")]
    Exhausted { max_length: usize },

    /// `between` called with equal bounds (duplicate sibling ranks)
    #[error("Duplicate rank '{rank}' has no gap")]
    DuplicateRank { rank: String },

    /// `between` called with reversed bounds
    #[error("Rank bounds out of order: '{lower}' >= '{upper}'")]
    OutOfOrder { lower: String, upper: String },
}

/// Failures reported by the store collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Row does not exist
    #[error("Item not found: {0}")]
    NotFound(ItemId),

    /// Optimistic check failed: the parent changed since it was read
    #[error("Concurrent modification of parent {parent}")]
    ConcurrentModification { parent: ParentId },

    /// Any other backend failure
    #[error("Store backend failure: {0}")]
    Backend(String),
}

/// All errors surfaced by the position manager and rebalance coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// A stored rank failed to parse even after rebalancing
    #[error("Invalid rank format for item {item}: {source}")]
    InvalidRankFormat {
        item: ItemId,
        #[source]
        source: RankError,
    },

    /// No rank fits even after rebalancing
    #[error("Rank space exhausted in parent {parent}")]
    RankExhausted { parent: ParentId },

    /// Referenced neighbor or target no longer exists
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// Conflicting concurrent write; retry the whole operation
    #[error("Concurrent modification of parent {parent} after {attempts} attempts")]
    ConcurrentModification { parent: ParentId, attempts: u32 },

    /// Neighbor lives under another parent than the requested one
    #[error("Neighbor {item} is not a child of {parent}")]
    NeighborOutsideParent { item: ItemId, parent: ParentId },

    /// Caller-supplied neighbors are reversed relative to their stored ranks
    #[error("Neighbors out of order: {prev} is not before {next}")]
    NeighborsOutOfOrder { prev: ItemId, next: ItemId },

    /// The moved item was named as its own neighbor
    #[error("Item {0} cannot be its own neighbor")]
    SelfReference(ItemId),

    /// Backend failure that is neither a conflict nor a missing row
    #[error("Store failure: {0}")]
    Store(String),
}

impl PositionError {
    /// Race-class errors: the caller may retry the whole request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PositionError::ItemNotFound(_)
                | PositionError::ConcurrentModification { .. }
                | PositionError::NeighborOutsideParent { .. }
                | PositionError::NeighborsOutOfOrder { .. }
        )
    }

    /// Stable machine-readable code for responses.
    pub fn code(&self) -> &'static str {
        match self {
            PositionError::InvalidRankFormat { .. } => "invalid_rank_format",
            PositionError::RankExhausted { .. } => "rank_exhausted",
            PositionError::ItemNotFound(_) => "item_not_found",
            PositionError::ConcurrentModification { .. } => "concurrent_modification",
            PositionError::NeighborOutsideParent { .. } => "neighbor_outside_parent",
            PositionError::NeighborsOutOfOrder { .. } => "neighbors_out_of_order",
            PositionError::SelfReference(_) => "self_reference",
            PositionError::Store(_) => "store_failure",
        }
    }
}

/// Coarse tier failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoarseOrderError {
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Concurrent modification of parent {parent} after {attempts} attempts")]
    ConcurrentModification { parent: ParentId, attempts: u32 },

    /// Largest order already taken; the parent needs renumbering first
    #[error("No order left after the maximum in parent {parent}")]
    OrderOverflow { parent: ParentId },

    #[error("Store failure: {0}")]
    Store(String),
}

impl From<StoreError> for CoarseOrderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => CoarseOrderError::ItemNotFound(id),
            StoreError::ConcurrentModification { parent } => {
                CoarseOrderError::ConcurrentModification {
                    parent,
                    attempts: 1,
                }
            }
            StoreError::Backend(msg) => CoarseOrderError::Store(msg),
        }
    }
}
