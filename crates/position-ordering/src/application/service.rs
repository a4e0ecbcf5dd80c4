//! Position Manager
//!
//! Main service implementing `PositionApi`.

use crate::algorithms::allocator::RankAllocator;
use crate::application::rebalance::RebalanceCoordinator;
use crate::config::{ConfigError, PositionConfig};
use crate::domain::entities::{
    ItemId, OrderedItem, ParentId, Placement, PositionWrite, StoredItem, WriteMode,
};
use crate::domain::errors::{PositionError, RankError, StoreError};
use crate::domain::invariants::check_all_invariants;
use crate::domain::rank::RankValue;
use crate::ports::inbound::PositionApi;
use crate::ports::outbound::OrderedItemStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a single read-compute-write cycle did not complete.
#[derive(Debug)]
enum AttemptError {
    /// Store rejected the write; rerun the whole cycle.
    Conflict,
    /// Ranks are exhausted or corrupt; rebalance, then rerun once.
    NeedsRebalance(PositionError),
    /// Surface as is.
    Failed(PositionError),
}

impl From<StoreError> for AttemptError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AttemptError::Failed(PositionError::ItemNotFound(id)),
            StoreError::ConcurrentModification { .. } => AttemptError::Conflict,
            StoreError::Backend(msg) => AttemptError::Failed(PositionError::Store(msg)),
        }
    }
}

/// Where the item should land.
#[derive(Debug)]
enum Anchor<'a> {
    End,
    Between(&'a Placement),
}

/// Position Manager
///
/// Orchestrates one insert or move:
/// 1. Read the parent revision
/// 2. Read the stated neighbors and the sibling list
/// 3. Compute the rank
/// 4. Write it conditionally on the revision
///
/// Conflicts restart at step 1. Exhausted or corrupt ranks trigger one
/// rebalance of the target parent before a final rerun.
pub struct PositionManager<S> {
    store: Arc<S>,
    allocator: RankAllocator,
    rebalancer: RebalanceCoordinator<S>,
    config: PositionConfig,
}

impl<S: OrderedItemStore> PositionManager<S> {
    /// Create a manager with default config
    pub fn new(store: Arc<S>) -> Self {
        Self::build(store, PositionConfig::default())
    }

    /// Create a manager with custom config
    ///
    /// Values that would leave a rebalanced parent without headroom are
    /// rejected.
    pub fn with_config(store: Arc<S>, config: PositionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(store, config))
    }

    fn build(store: Arc<S>, config: PositionConfig) -> Self {
        let allocator = RankAllocator::new(config.max_rank_length);
        Self {
            rebalancer: RebalanceCoordinator::new(Arc::clone(&store), allocator),
            store,
            allocator,
            config,
        }
    }

    pub fn config(&self) -> &PositionConfig {
        &self.config
    }

    pub fn allocator(&self) -> RankAllocator {
        self.allocator
    }

    pub fn rebalancer(&self) -> &RebalanceCoordinator<S> {
        &self.rebalancer
    }

    /// Run attempts until one succeeds, the conflict budget is spent, or a
    /// rebalance has already been tried.
    async fn place(
        &self,
        item: &ItemId,
        mode: WriteMode,
        parent: &ParentId,
        anchor: Anchor<'_>,
    ) -> Result<OrderedItem, PositionError> {
        let mut conflicts = 0u32;
        let mut rebalanced = false;

        loop {
            match self.attempt(item, mode, parent, &anchor).await {
                Ok(placed) => {
                    debug!(
                        item = %placed.id,
                        parent = %placed.parent_id,
                        rank = %placed.rank,
                        conflicts,
                        rebalanced,
                        "Placed item"
                    );
                    return Ok(placed);
                }
                Err(AttemptError::Conflict) => {
                    conflicts += 1;
                    if conflicts >= self.config.max_write_attempts {
                        warn!(parent = %parent, attempts = conflicts, "Giving up after repeated conflicts");
                        return Err(PositionError::ConcurrentModification {
                            parent: parent.clone(),
                            attempts: conflicts,
                        });
                    }
                    debug!(parent = %parent, attempt = conflicts, "Write conflict, retrying with fresh neighbors");
                }
                Err(AttemptError::NeedsRebalance(cause)) => {
                    if rebalanced {
                        warn!(parent = %parent, error = %cause, "Rank computation failed after rebalance");
                        return Err(cause);
                    }
                    info!(parent = %parent, cause = %cause, "Rebalancing before retry");
                    match self.rebalancer.rebalance(parent).await {
                        Ok(_) => rebalanced = true,
                        Err(PositionError::ConcurrentModification { .. }) => {
                            conflicts += 1;
                            if conflicts >= self.config.max_write_attempts {
                                return Err(PositionError::ConcurrentModification {
                                    parent: parent.clone(),
                                    attempts: conflicts,
                                });
                            }
                        }
                        Err(e) => return Err(e),
                    }
                }
                Err(AttemptError::Failed(e)) => return Err(e),
            }
        }
    }

    /// One read-compute-write cycle.
    async fn attempt(
        &self,
        item: &ItemId,
        mode: WriteMode,
        parent: &ParentId,
        anchor: &Anchor<'_>,
    ) -> Result<OrderedItem, AttemptError> {
        // Revision first: anything read afterwards is covered by the write check.
        let revision = self.store.parent_revision(parent).await?;

        if mode == WriteMode::Update {
            self.store.get_item(item).await?;
        }

        let siblings: Vec<StoredItem> = self
            .store
            .list_siblings_ordered(parent)
            .await?
            .into_iter()
            .filter(|s| &s.id != item)
            .collect();

        let (lower, upper) = match anchor {
            Anchor::End => (siblings.last().cloned(), None),
            Anchor::Between(placement) => self.resolve_gap(parent, &siblings, placement).await?,
        };

        let rank = self.compute_rank(parent, lower.as_ref(), upper.as_ref())?;

        let stored = self
            .store
            .write_item_position(PositionWrite {
                item_id: item.clone(),
                parent_id: parent.clone(),
                rank: rank.clone(),
                expected_revision: revision,
                mode,
            })
            .await?;

        Ok(OrderedItem {
            id: stored.id,
            parent_id: stored.parent_id,
            rank,
        })
    }

    /// Bounds of the gap the caller asked for, as the store sees it now.
    ///
    /// The item goes directly after `prev` when given, otherwise directly
    /// before `next`, otherwise after the last sibling. The opposite bound is the stored sibling on the other
    /// side of the anchor, so a sibling added since the caller looked is
    /// never overwritten or leapfrogged.
    async fn resolve_gap(
        &self,
        parent: &ParentId,
        siblings: &[StoredItem],
        placement: &Placement,
    ) -> Result<(Option<StoredItem>, Option<StoredItem>), AttemptError> {
        let prev = match &placement.prev {
            Some(id) => Some(self.neighbor(parent, id).await?),
            None => None,
        };
        let next = match &placement.next {
            Some(id) => Some(self.neighbor(parent, id).await?),
            None => None,
        };

        match (prev, next) {
            (Some(prev), next) => {
                if let Some(next) = &next {
                    if next.id == prev.id || next.rank < prev.rank {
                        return Err(AttemptError::Failed(PositionError::NeighborsOutOfOrder {
                            prev: prev.id,
                            next: next.id.clone(),
                        }));
                    }
                }
                let index = sibling_index(siblings, &prev.id)?;
                Ok((Some(prev), siblings.get(index + 1).cloned()))
            }
            (None, Some(next)) => {
                let index = sibling_index(siblings, &next.id)?;
                let lower = index.checked_sub(1).map(|i| siblings[i].clone());
                Ok((lower, Some(next)))
            }
            // No neighbor named: append.
            (None, None) => Ok((siblings.last().cloned(), None)),
        }
    }

    /// Read a stated neighbor and check it belongs to `parent`.
    async fn neighbor(&self, parent: &ParentId, id: &ItemId) -> Result<StoredItem, AttemptError> {
        let item = self.store.get_item(id).await?;
        if &item.parent_id != parent {
            return Err(AttemptError::Failed(PositionError::NeighborOutsideParent {
                item: item.id,
                parent: parent.clone(),
            }));
        }
        Ok(item)
    }

    fn compute_rank(
        &self,
        parent: &ParentId,
        lower: Option<&StoredItem>,
        upper: Option<&StoredItem>,
    ) -> Result<RankValue, AttemptError> {
        let lower_rank = lower.map(parse_neighbor_rank).transpose()?;
        let upper_rank = upper.map(parse_neighbor_rank).transpose()?;

        let result = match (&lower_rank, &upper_rank) {
            (None, None) => Ok(self.allocator.initial()),
            (Some(lo), None) => self.allocator.after(lo),
            (None, Some(hi)) => self.allocator.before(hi),
            (Some(lo), Some(hi)) => self.allocator.between(lo, hi),
        };

        result.map_err(|e| match e {
            RankError::Exhausted { .. } | RankError::DuplicateRank { .. } => {
                debug!(parent = %parent, error = %e, "No rank available in gap");
                AttemptError::NeedsRebalance(PositionError::RankExhausted {
                    parent: parent.clone(),
                })
            }
            RankError::OutOfOrder { .. } => {
                // Sibling lists come back sorted, so this means the store's
                // order disagrees with rank order.
                AttemptError::NeedsRebalance(PositionError::RankExhausted {
                    parent: parent.clone(),
                })
            }
            RankError::InvalidFormat { .. } => {
                AttemptError::Failed(PositionError::Store(e.to_string()))
            }
        })
    }

    /// Rebalance `parent` if its stored ranks break an ordering invariant.
    async fn repair_if_corrupt(
        &self,
        parent: &ParentId,
        siblings: &[StoredItem],
    ) -> Result<bool, PositionError> {
        if check_all_invariants(siblings) {
            return Ok(false);
        }
        warn!(parent = %parent, "Stored ranks violate ordering invariants, rebalancing");
        self.rebalancer.rebalance(parent).await?;
        Ok(true)
    }

    async fn read_siblings(&self, parent: &ParentId) -> Result<Vec<StoredItem>, PositionError> {
        self.store
            .list_siblings_ordered(parent)
            .await
            .map_err(|e| match AttemptError::from(e) {
                AttemptError::Failed(err) | AttemptError::NeedsRebalance(err) => err,
                AttemptError::Conflict => PositionError::ConcurrentModification {
                    parent: parent.clone(),
                    attempts: 1,
                },
            })
    }
}

fn sibling_index(siblings: &[StoredItem], id: &ItemId) -> Result<usize, AttemptError> {
    // Neighbor was read but is missing from the listing: it moved in between.
    siblings
        .iter()
        .position(|s| &s.id == id)
        .ok_or(AttemptError::Conflict)
}

fn parse_neighbor_rank(item: &StoredItem) -> Result<RankValue, AttemptError> {
    item.parse_rank().map_err(|source| {
        AttemptError::NeedsRebalance(PositionError::InvalidRankFormat {
            item: item.id.clone(),
            source,
        })
    })
}

#[async_trait]
impl<S: OrderedItemStore> PositionApi for PositionManager<S> {
    async fn insert_at_end(&self, parent: &ParentId) -> Result<OrderedItem, PositionError> {
        let id = ItemId::generate();
        let item = self.place(&id, WriteMode::Create, parent, Anchor::End).await?;
        info!(item = %item.id, parent = %parent, rank = %item.rank, "Inserted item at end");
        Ok(item)
    }

    async fn insert_between(
        &self,
        parent: &ParentId,
        placement: Placement,
    ) -> Result<OrderedItem, PositionError> {
        let id = ItemId::generate();
        let item = self
            .place(&id, WriteMode::Create, parent, Anchor::Between(&placement))
            .await?;
        info!(
            item = %item.id,
            parent = %parent,
            rank = %item.rank,
            prev = ?placement.prev,
            next = ?placement.next,
            "Inserted item"
        );
        Ok(item)
    }

    async fn move_item(
        &self,
        item: &ItemId,
        new_parent: &ParentId,
        placement: Placement,
    ) -> Result<OrderedItem, PositionError> {
        if placement.prev.as_ref() == Some(item) || placement.next.as_ref() == Some(item) {
            return Err(PositionError::SelfReference(item.clone()));
        }

        let moved = self
            .place(item, WriteMode::Update, new_parent, Anchor::Between(&placement))
            .await?;
        info!(
            item = %moved.id,
            parent = %new_parent,
            rank = %moved.rank,
            "Moved item"
        );
        Ok(moved)
    }

    async fn list_ordered(&self, parent: &ParentId) -> Result<Vec<OrderedItem>, PositionError> {
        let mut siblings = self.read_siblings(parent).await?;
        if self.repair_if_corrupt(parent, &siblings).await? {
            siblings = self.read_siblings(parent).await?;
        }

        siblings
            .into_iter()
            .map(|stored| {
                let id = stored.id.clone();
                stored
                    .into_ordered()
                    .map_err(|source| PositionError::InvalidRankFormat { item: id, source })
            })
            .collect()
    }
}
