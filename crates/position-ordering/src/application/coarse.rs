//! Coarse Ordering Service
//!
//! Integer `order` for rarely reordered parents (lists on a board).

use crate::algorithms::coarse::{next_order, renumber_with_move};
use crate::config::{ConfigError, PositionConfig};
use crate::domain::entities::{CoarseOrderedItem, ItemId, ParentId};
use crate::domain::errors::{CoarseOrderError, StoreError};
use crate::ports::inbound::CoarseOrderingApi;
use crate::ports::outbound::CoarseItemStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

pub struct CoarseOrderingService<S> {
    store: Arc<S>,
    max_write_attempts: u32,
}

impl<S: CoarseItemStore> CoarseOrderingService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            max_write_attempts: PositionConfig::default().max_write_attempts,
        }
    }

    pub fn with_config(store: Arc<S>, config: &PositionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store,
            max_write_attempts: config.max_write_attempts,
        })
    }

    fn conflict_budget_spent(&self, parent: &ParentId, attempts: u32) -> Option<CoarseOrderError> {
        (attempts >= self.max_write_attempts).then(|| CoarseOrderError::ConcurrentModification {
            parent: parent.clone(),
            attempts,
        })
    }
}

#[async_trait]
impl<S: CoarseItemStore> CoarseOrderingApi for CoarseOrderingService<S> {
    async fn append(&self, parent: &ParentId) -> Result<CoarseOrderedItem, CoarseOrderError> {
        let id = ItemId::generate();
        let mut attempts = 0;

        loop {
            attempts += 1;
            let revision = self.store.coarse_revision(parent).await?;
            let siblings = self.store.list_coarse_ordered(parent).await?;
            let order = next_order(siblings.iter().map(|s| s.order).max()).ok_or_else(|| {
                CoarseOrderError::OrderOverflow {
                    parent: parent.clone(),
                }
            })?;

            let item = CoarseOrderedItem {
                id: id.clone(),
                parent_id: parent.clone(),
                order,
            };
            match self.store.append_coarse(item, revision).await {
                Ok(item) => {
                    info!(item = %item.id, parent = %parent, order, "Appended coarse item");
                    return Ok(item);
                }
                Err(StoreError::ConcurrentModification { .. }) => {
                    if let Some(err) = self.conflict_budget_spent(parent, attempts) {
                        return Err(err);
                    }
                    debug!(parent = %parent, attempts, "Coarse append conflict, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn move_to(
        &self,
        parent: &ParentId,
        item: &ItemId,
        index: usize,
    ) -> Result<Vec<CoarseOrderedItem>, CoarseOrderError> {
        let mut attempts = 0;

        loop {
            attempts += 1;
            let revision = self.store.coarse_revision(parent).await?;
            let siblings = self.store.list_coarse_ordered(parent).await?;
            let orders = renumber_with_move(&siblings, item, index)
                .ok_or_else(|| CoarseOrderError::ItemNotFound(item.clone()))?;

            match self
                .store
                .renumber_coarse(parent, orders.clone(), revision)
                .await
            {
                Ok(()) => {
                    info!(item = %item, parent = %parent, index, "Moved coarse item");
                    return Ok(orders
                        .into_iter()
                        .map(|(id, order)| CoarseOrderedItem {
                            id,
                            parent_id: parent.clone(),
                            order,
                        })
                        .collect());
                }
                Err(StoreError::ConcurrentModification { .. }) => {
                    if let Some(err) = self.conflict_budget_spent(parent, attempts) {
                        return Err(err);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn list_ordered(
        &self,
        parent: &ParentId,
    ) -> Result<Vec<CoarseOrderedItem>, CoarseOrderError> {
        Ok(self.store.list_coarse_ordered(parent).await?)
    }
}
