//! Rebalance Coordinator
//!
//! Renumbers every child of a parent with evenly spaced ranks when the gaps
//! between neighbors are used up or the stored ranks are corrupt.

use crate::algorithms::allocator::RankAllocator;
use crate::domain::entities::{BatchPositionWrite, ParentId, RebalanceReport};
use crate::domain::errors::{PositionError, RankError, StoreError};
use crate::domain::invariants::duplicate_rank_items;
use crate::ports::outbound::OrderedItemStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Full-parent renumbering.
///
/// The batch write is conditional on the revision read before listing the
/// siblings, so a rebalance never interleaves with a move in the same parent.
pub struct RebalanceCoordinator<S> {
    store: Arc<S>,
    allocator: RankAllocator,
}

impl<S> Clone for RebalanceCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            allocator: self.allocator,
        }
    }
}

impl<S: OrderedItemStore> RebalanceCoordinator<S> {
    pub fn new(store: Arc<S>, allocator: RankAllocator) -> Self {
        Self { store, allocator }
    }

    /// Assign `spread(N)` ranks to the N children of `parent`, keeping their
    /// current order.
    pub async fn rebalance(&self, parent: &ParentId) -> Result<RebalanceReport, PositionError> {
        let revision = self
            .store
            .parent_revision(parent)
            .await
            .map_err(|e| map_store_error(parent, e))?;
        let siblings = self
            .store
            .list_siblings_ordered(parent)
            .await
            .map_err(|e| map_store_error(parent, e))?;

        let duplicates = duplicate_rank_items(&siblings);
        if !duplicates.is_empty() {
            warn!(parent = %parent, items = ?duplicates, "Repairing duplicate sibling ranks");
        }

        let ranks = self.allocator.spread(siblings.len()).map_err(|e| match e {
            RankError::Exhausted { .. } => PositionError::RankExhausted {
                parent: parent.clone(),
            },
            other => PositionError::Store(other.to_string()),
        })?;
        let new_rank_length = ranks.iter().map(|r| r.len()).max().unwrap_or(0);

        let entries: Vec<_> = siblings
            .into_iter()
            .map(|item| item.id)
            .zip(ranks)
            .collect();
        let item_count = entries.len();

        self.store
            .write_batch_positions(BatchPositionWrite {
                parent_id: parent.clone(),
                expected_revision: revision,
                entries,
            })
            .await
            .map_err(|e| {
                warn!(parent = %parent, error = %e, "Rebalance batch rejected");
                map_store_error(parent, e)
            })?;

        info!(
            parent = %parent,
            item_count,
            previous_revision = %revision,
            new_rank_length,
            duplicates = duplicates.len(),
            "Rebalanced parent"
        );

        Ok(RebalanceReport {
            parent_id: parent.clone(),
            item_count,
            previous_revision: revision,
            new_rank_length,
            duplicates_repaired: duplicates,
        })
    }
}

fn map_store_error(parent: &ParentId, err: StoreError) -> PositionError {
    match err {
        StoreError::NotFound(id) => PositionError::ItemNotFound(id),
        StoreError::ConcurrentModification { .. } => PositionError::ConcurrentModification {
            parent: parent.clone(),
            attempts: 1,
        },
        StoreError::Backend(msg) => PositionError::Store(msg),
    }
}
