//! In-Memory Store Adapter
//!
//! Implements `OrderedItemStore` and `CoarseItemStore` over hash maps behind a
//! single lock. Every write checks and bumps per-parent revisions while holding
//! the write lock, which gives the same conditional-write semantics a SQL
//! backend gets from `UPDATE ... WHERE revision = ?`.

use crate::domain::entities::{
    BatchPositionWrite, CoarseOrderedItem, ItemId, ParentId, PositionWrite, Revision, StoredItem,
    WriteMode,
};
use crate::domain::errors::StoreError;
use crate::ports::outbound::{CoarseItemStore, OrderedItemStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

#[derive(Default)]
struct StoreState {
    items: HashMap<ItemId, StoredItem>,
    revisions: HashMap<ParentId, Revision>,
    coarse_items: HashMap<ItemId, CoarseOrderedItem>,
    coarse_revisions: HashMap<ParentId, Revision>,
}

impl StoreState {
    fn revision(&self, parent: &ParentId) -> Revision {
        self.revisions.get(parent).copied().unwrap_or_default()
    }

    fn bump(&mut self, parent: &ParentId) -> Revision {
        let next = self.revision(parent).next();
        self.revisions.insert(parent.clone(), next);
        next
    }

    fn coarse_revision(&self, parent: &ParentId) -> Revision {
        self.coarse_revisions.get(parent).copied().unwrap_or_default()
    }

    fn bump_coarse(&mut self, parent: &ParentId) {
        let next = self.coarse_revision(parent).next();
        self.coarse_revisions.insert(parent.clone(), next);
    }

    fn siblings(&self, parent: &ParentId) -> Vec<StoredItem> {
        let mut siblings: Vec<_> = self
            .items
            .values()
            .filter(|item| &item.parent_id == parent)
            .cloned()
            .collect();
        siblings.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.id.cmp(&b.id)));
        siblings
    }
}

/// In-memory store for tests and single-process hosts.
#[derive(Default)]
pub struct InMemoryPositionStore {
    state: RwLock<StoreState>,
    item_writes: AtomicUsize,
    batch_writes: AtomicUsize,
}

impl InMemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows directly, bypassing revision checks.
    ///
    /// Ranks are stored verbatim, so corrupt or duplicate data can be staged.
    pub fn seed(&self, items: impl IntoIterator<Item = StoredItem>) {
        let mut state = self.state.write();
        for item in items {
            state.bump(&item.parent_id);
            state.items.insert(item.id.clone(), item);
        }
    }

    /// Insert coarse rows directly.
    pub fn seed_coarse(&self, items: impl IntoIterator<Item = CoarseOrderedItem>) {
        let mut state = self.state.write();
        for item in items {
            state.bump_coarse(&item.parent_id);
            state.coarse_items.insert(item.id.clone(), item);
        }
    }

    /// Delete an item, as a concurrent request would.
    pub fn remove_item(&self, id: &ItemId) -> Option<StoredItem> {
        let mut state = self.state.write();
        let removed = state.items.remove(id)?;
        state.bump(&removed.parent_id);
        Some(removed)
    }

    /// Successful single-row writes so far.
    pub fn item_write_count(&self) -> usize {
        self.item_writes.load(Ordering::SeqCst)
    }

    /// Successful batch writes (rebalances) so far.
    pub fn batch_write_count(&self) -> usize {
        self.batch_writes.load(Ordering::SeqCst)
    }

    /// Total number of rank-ordered items.
    pub fn len(&self) -> usize {
        self.state.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderedItemStore for InMemoryPositionStore {
    async fn parent_revision(&self, parent: &ParentId) -> Result<Revision, StoreError> {
        Ok(self.state.read().revision(parent))
    }

    async fn get_item(&self, id: &ItemId) -> Result<StoredItem, StoreError> {
        self.state
            .read()
            .items
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn list_siblings_ordered(&self, parent: &ParentId) -> Result<Vec<StoredItem>, StoreError> {
        Ok(self.state.read().siblings(parent))
    }

    async fn write_item_position(&self, write: PositionWrite) -> Result<StoredItem, StoreError> {
        let mut state = self.state.write();

        let source_parent = match write.mode {
            WriteMode::Create => {
                if state.items.contains_key(&write.item_id) {
                    return Err(StoreError::Backend(format!(
                        "duplicate item id {}",
                        write.item_id
                    )));
                }
                None
            }
            WriteMode::Update => match state.items.get(&write.item_id) {
                Some(existing) => Some(existing.parent_id.clone()),
                None => return Err(StoreError::NotFound(write.item_id)),
            },
        };

        let current = state.revision(&write.parent_id);
        if current != write.expected_revision {
            debug!(
                parent = %write.parent_id,
                expected = %write.expected_revision,
                current = %current,
                "Rejecting stale position write"
            );
            return Err(StoreError::ConcurrentModification {
                parent: write.parent_id,
            });
        }

        let item = StoredItem {
            id: write.item_id,
            parent_id: write.parent_id,
            rank: write.rank.into(),
        };
        if let Some(source) = source_parent.filter(|source| source != &item.parent_id) {
            state.bump(&source);
        }
        state.bump(&item.parent_id);
        state.items.insert(item.id.clone(), item.clone());

        self.item_writes.fetch_add(1, Ordering::SeqCst);
        Ok(item)
    }

    async fn write_batch_positions(&self, batch: BatchPositionWrite) -> Result<(), StoreError> {
        let mut state = self.state.write();

        let current = state.revision(&batch.parent_id);
        if current != batch.expected_revision {
            return Err(StoreError::ConcurrentModification {
                parent: batch.parent_id,
            });
        }

        // Validate everything before touching anything.
        for (id, _) in &batch.entries {
            match state.items.get(id) {
                Some(item) if item.parent_id == batch.parent_id => {}
                Some(_) => {
                    return Err(StoreError::Backend(format!(
                        "item {} is not a child of {}",
                        id, batch.parent_id
                    )))
                }
                None => return Err(StoreError::NotFound(id.clone())),
            }
        }

        for (id, rank) in batch.entries {
            if let Some(item) = state.items.get_mut(&id) {
                item.rank = rank.into();
            }
        }
        state.bump(&batch.parent_id);

        self.batch_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl CoarseItemStore for InMemoryPositionStore {
    async fn coarse_revision(&self, parent: &ParentId) -> Result<Revision, StoreError> {
        Ok(self.state.read().coarse_revision(parent))
    }

    async fn list_coarse_ordered(
        &self,
        parent: &ParentId,
    ) -> Result<Vec<CoarseOrderedItem>, StoreError> {
        let state = self.state.read();
        let mut items: Vec<_> = state
            .coarse_items
            .values()
            .filter(|item| &item.parent_id == parent)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn append_coarse(
        &self,
        item: CoarseOrderedItem,
        expected_revision: Revision,
    ) -> Result<CoarseOrderedItem, StoreError> {
        let mut state = self.state.write();
        if state.coarse_revision(&item.parent_id) != expected_revision {
            return Err(StoreError::ConcurrentModification {
                parent: item.parent_id,
            });
        }
        if state.coarse_items.contains_key(&item.id) {
            return Err(StoreError::Backend(format!("duplicate item id {}", item.id)));
        }
        state.bump_coarse(&item.parent_id);
        state.coarse_items.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    async fn renumber_coarse(
        &self,
        parent: &ParentId,
        orders: Vec<(ItemId, i64)>,
        expected_revision: Revision,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write();
        if state.coarse_revision(parent) != expected_revision {
            return Err(StoreError::ConcurrentModification {
                parent: parent.clone(),
            });
        }
        if let Some((missing, _)) = orders
            .iter()
            .find(|(id, _)| !state.coarse_items.contains_key(id))
        {
            return Err(StoreError::NotFound(missing.clone()));
        }
        for (id, order) in orders {
            if let Some(item) = state.coarse_items.get_mut(&id) {
                item.order = order;
            }
        }
        state.bump_coarse(parent);
        Ok(())
    }
}
