//! # Order Stability
//!
//! Seeded random inserts and moves across a few parents, checked after every
//! step against a plain `Vec` model of each parent's children. A short rank
//! limit keeps rebalances in the mix.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use position_ordering::{
        CoarseOrderingApi, CoarseOrderingService, InMemoryPositionStore, ItemId, ParentId,
        Placement, PositionApi, PositionConfig, PositionManager,
    };

    use crate::support::init_tracing;

    // =========================================================================
    // MODEL
    // =========================================================================

    struct Model {
        parents: Vec<ParentId>,
        children: HashMap<ParentId, Vec<ItemId>>,
    }

    impl Model {
        fn new(count: usize) -> Self {
            let parents: Vec<_> = (0..count)
                .map(|i| ParentId::new(format!("list-{i}")))
                .collect();
            let children = parents.iter().map(|p| (p.clone(), Vec::new())).collect();
            Self { parents, children }
        }

        fn parent_of(&self, item: &ItemId) -> Option<ParentId> {
            self.children
                .iter()
                .find(|(_, ids)| ids.contains(item))
                .map(|(parent, _)| parent.clone())
        }

        fn all_items(&self) -> Vec<ItemId> {
            self.parents
                .iter()
                .flat_map(|p| self.children[p].iter().cloned())
                .collect()
        }
    }

    /// Neighbors for landing at `index` in `siblings`.
    fn placement_at(siblings: &[ItemId], index: usize) -> Placement {
        let prev = index.checked_sub(1).map(|i| siblings[i].clone());
        let next = siblings.get(index).cloned();
        Placement::new(prev, next)
    }

    async fn assert_matches_model(
        manager: &PositionManager<InMemoryPositionStore>,
        model: &Model,
        step: usize,
    ) {
        for parent in &model.parents {
            let listed = manager.list_ordered(parent).await.unwrap();
            let ids: Vec<_> = listed.iter().map(|item| item.id.clone()).collect();
            assert_eq!(&ids, &model.children[parent], "parent {parent} after step {step}");
            assert!(
                listed.windows(2).all(|pair| pair[0].rank < pair[1].rank),
                "ranks not strictly increasing in {parent} after step {step}"
            );
        }
    }

    // =========================================================================
    // RANDOMIZED OPERATIONS
    // =========================================================================

    async fn run_random_operations(seed: u64, steps: usize) {
        init_tracing();
        let store = Arc::new(InMemoryPositionStore::new());
        let config = PositionConfig {
            max_rank_length: 6,
            ..PositionConfig::default()
        };
        let manager = PositionManager::with_config(store.clone(), config).unwrap();
        let mut model = Model::new(3);
        let mut rng = StdRng::seed_from_u64(seed);

        for step in 0..steps {
            let items = model.all_items();
            let parent = model.parents[rng.gen_range(0..model.parents.len())].clone();

            if items.is_empty() || rng.gen_bool(0.5) {
                let siblings = model.children[&parent].clone();
                let index = rng.gen_range(0..=siblings.len());
                let inserted = if siblings.is_empty() {
                    manager.insert_at_end(&parent).await.unwrap()
                } else {
                    manager
                        .insert_between(&parent, placement_at(&siblings, index))
                        .await
                        .unwrap()
                };
                model
                    .children
                    .get_mut(&parent)
                    .unwrap()
                    .insert(index, inserted.id);
            } else {
                let item = items[rng.gen_range(0..items.len())].clone();
                let from = model.parent_of(&item).unwrap();
                model.children.get_mut(&from).unwrap().retain(|id| id != &item);

                let siblings = model.children[&parent].clone();
                let index = rng.gen_range(0..=siblings.len());
                manager
                    .move_item(&item, &parent, placement_at(&siblings, index))
                    .await
                    .unwrap();
                model.children.get_mut(&parent).unwrap().insert(index, item);
            }

            assert_matches_model(&manager, &model, step).await;
        }
    }

    #[tokio::test]
    async fn test_random_operations_keep_model_order() {
        run_random_operations(7, 400).await;
    }

    #[tokio::test]
    async fn test_random_operations_other_seed() {
        run_random_operations(0xB0A2D, 400).await;
    }

    #[tokio::test]
    async fn test_repeated_front_inserts_survive_rebalances() {
        init_tracing();
        let store = Arc::new(InMemoryPositionStore::new());
        let list = ParentId::from("list-1");
        let config = PositionConfig {
            max_rank_length: 4,
            ..PositionConfig::default()
        };
        let manager = PositionManager::with_config(store.clone(), config).unwrap();

        let anchor = manager.insert_at_end(&list).await.unwrap();
        let tail = manager.insert_at_end(&list).await.unwrap();
        let mut expected = vec![anchor.id.clone(), tail.id.clone()];

        // Always insert directly after the anchor: the same gap keeps halving.
        for _ in 0..120 {
            let inserted = manager
                .insert_between(&list, Placement::after(anchor.id.clone()))
                .await
                .unwrap();
            expected.insert(1, inserted.id);
        }

        let ids: Vec<_> = manager
            .list_ordered(&list)
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(ids, expected);
        assert!(store.batch_write_count() > 0);
    }

    // =========================================================================
    // COARSE TIER
    // =========================================================================

    #[tokio::test]
    async fn test_coarse_moves_keep_model_order() {
        init_tracing();
        let store = Arc::new(InMemoryPositionStore::new());
        let board = ParentId::from("board-1");
        let service = CoarseOrderingService::new(store.clone());
        let mut rng = StdRng::seed_from_u64(42);

        let mut model = Vec::new();
        for _ in 0..12 {
            model.push(service.append(&board).await.unwrap().id);
        }

        for _ in 0..100 {
            let item = model[rng.gen_range(0..model.len())].clone();
            let index = rng.gen_range(0..model.len());
            service.move_to(&board, &item, index).await.unwrap();

            model.retain(|id| id != &item);
            model.insert(index, item);

            let listed = service.list_ordered(&board).await.unwrap();
            let ids: Vec<_> = listed.iter().map(|item| item.id.clone()).collect();
            assert_eq!(ids, model);
            let orders: Vec<_> = listed.iter().map(|item| item.order).collect();
            assert_eq!(orders, (1..=12).collect::<Vec<i64>>());
        }
    }
}
