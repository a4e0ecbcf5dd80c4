//! # Ordering Scenarios
//!
//! Card insertion, movement and rebalancing as a board UI drives them.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use position_ordering::{
        InMemoryPositionStore, ItemId, OrderedItemStore, ParentId, Placement, PositionApi,
        PositionConfig, PositionManager, PositionRequestHandler, RankValue, StoredItem,
    };
    use position_ordering::{InsertRequest, MoveRequest};

    use crate::support::{fixed_rank, init_tracing, stored_order};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn rank(text: &str) -> RankValue {
        RankValue::parse(text).unwrap()
    }

    /// Consecutive three-symbol ranks from "b11", skipping values that would
    /// end in '0' and so not be canonical.
    fn crowded_ranks(count: usize) -> Vec<String> {
        let start = 11 * 36 * 36 + 36 + 1;
        (start..)
            .filter(|value| value % 36 != 0)
            .take(count)
            .map(fixed_rank)
            .collect()
    }

    fn ids(prefix: &str, count: usize) -> Vec<ItemId> {
        (0..count)
            .map(|i| ItemId::new(format!("{prefix}-{i:02}")))
            .collect()
    }

    // =========================================================================
    // INSERT AND MOVE
    // =========================================================================

    #[tokio::test]
    async fn test_insert_between_then_move_after_inserted() {
        init_tracing();
        let store = Arc::new(InMemoryPositionStore::new());
        let list = ParentId::from("list-1");
        store.seed([
            StoredItem::new("first", "list-1", "m"),
            StoredItem::new("second", "list-1", "n"),
        ]);
        let manager = PositionManager::new(store.clone());

        let third = manager
            .insert_between(&list, Placement::between("first", "second"))
            .await
            .unwrap();
        assert!(rank("m") < third.rank && third.rank < rank("n"));

        let moved = manager
            .move_item(
                &ItemId::from("first"),
                &list,
                Placement::between(third.id.clone(), "second"),
            )
            .await
            .unwrap();
        assert!(moved.rank > third.rank);
        assert!(moved.rank < rank("n"));

        assert_eq!(
            stored_order(store.as_ref(), &list).await,
            vec![third.id, ItemId::from("first"), ItemId::from("second")]
        );
        assert_eq!(store.batch_write_count(), 0);
    }

    #[tokio::test]
    async fn test_card_moves_between_lists() {
        init_tracing();
        let store = Arc::new(InMemoryPositionStore::new());
        let todo = ParentId::from("todo");
        let done = ParentId::from("done");
        let manager = PositionManager::new(store.clone());

        let a = manager.insert_at_end(&todo).await.unwrap();
        let b = manager.insert_at_end(&todo).await.unwrap();
        let c = manager.insert_at_end(&done).await.unwrap();

        manager
            .move_item(&b.id, &done, Placement::before(c.id.clone()))
            .await
            .unwrap();
        manager
            .move_item(&a.id, &done, Placement::after(c.id.clone()))
            .await
            .unwrap();

        assert!(manager.list_ordered(&todo).await.unwrap().is_empty());
        let done_ids: Vec<_> = manager
            .list_ordered(&done)
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(done_ids, vec![b.id, c.id, a.id]);
    }

    #[tokio::test]
    async fn test_handler_round_trip() {
        init_tracing();
        let store = Arc::new(InMemoryPositionStore::new());
        let handler = PositionRequestHandler::new(Arc::new(PositionManager::new(store.clone())));

        let first = handler
            .handle_insert(InsertRequest {
                parent_id: ParentId::from("list-1"),
                after_id: None,
                before_id: None,
            })
            .await;
        assert!(first.success);
        let first_item = first.item.unwrap();

        let second = handler
            .handle_insert(InsertRequest {
                parent_id: ParentId::from("list-1"),
                after_id: None,
                before_id: Some(first_item.id.clone()),
            })
            .await;
        let second_item = second.item.unwrap();
        assert!(second_item.rank < first_item.rank);

        let bad_move = handler
            .handle_move(MoveRequest {
                item_id: ItemId::from("ghost"),
                new_parent_id: ParentId::from("list-1"),
                after_id: None,
                before_id: None,
            })
            .await;
        assert!(!bad_move.success);
        assert_eq!(bad_move.error.unwrap().code, "item_not_found");
        assert_eq!(store.len(), 2);
    }

    // =========================================================================
    // REBALANCE
    // =========================================================================

    #[tokio::test]
    async fn test_exhausted_gap_rebalances_once_and_keeps_order() {
        init_tracing();
        let store = Arc::new(InMemoryPositionStore::new());
        let list = ParentId::from("list-1");
        let items = ids("card", 50);
        let ranks = crowded_ranks(50);
        assert_eq!(ranks[10], "b1b");
        assert_eq!(ranks[11], "b1c");
        store.seed(
            items
                .iter()
                .zip(&ranks)
                .map(|(id, rank)| StoredItem::new(id.clone(), list.clone(), rank.clone())),
        );

        let config = PositionConfig {
            max_rank_length: 3,
            ..PositionConfig::default()
        };
        let manager = PositionManager::with_config(store.clone(), config).unwrap();
        let allocator = manager.allocator();

        // The gap really is full before the insert.
        assert!(allocator.between(&rank("b1b"), &rank("b1c")).is_err());

        let inserted = manager
            .insert_between(&list, Placement::between(items[10].clone(), items[11].clone()))
            .await
            .unwrap();
        assert_eq!(store.batch_write_count(), 1);

        let mut expected = items.clone();
        expected.insert(11, inserted.id.clone());
        let listed = manager.list_ordered(&list).await.unwrap();
        let listed_ids: Vec<_> = listed.iter().map(|item| item.id.clone()).collect();
        assert_eq!(listed_ids, expected);

        // Every gap has room again.
        for pair in listed.windows(2) {
            let fresh = allocator.between(&pair[0].rank, &pair[1].rank).unwrap();
            assert!(pair[0].rank < fresh && fresh < pair[1].rank);
        }
    }

    #[tokio::test]
    async fn test_gap_with_room_does_not_rebalance() {
        init_tracing();
        let store = Arc::new(InMemoryPositionStore::new());
        let list = ParentId::from("list-1");
        store.seed([
            StoredItem::new("a", "list-1", "b1"),
            StoredItem::new("b", "list-1", "b3"),
        ]);
        let config = PositionConfig {
            max_rank_length: 3,
            ..PositionConfig::default()
        };
        let manager = PositionManager::with_config(store.clone(), config).unwrap();

        let inserted = manager
            .insert_between(&list, Placement::between("a", "b"))
            .await
            .unwrap();
        assert_eq!(inserted.rank.as_str(), "b2");
        assert_eq!(store.batch_write_count(), 0);
        assert_eq!(store.item_write_count(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_list_is_readable_after_listing() {
        init_tracing();
        let store = Arc::new(InMemoryPositionStore::new());
        let list = ParentId::from("list-1");
        store.seed([
            StoredItem::new("a", "list-1", "0|hzzzzz:"),
            StoredItem::new("b", "list-1", "k"),
            StoredItem::new("c", "list-1", "k"),
        ]);
        let manager = PositionManager::new(store.clone());

        let listed = manager.list_ordered(&list).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed.windows(2).all(|pair| pair[0].rank < pair[1].rank));
        assert_eq!(store.batch_write_count(), 1);

        let siblings = store.list_siblings_ordered(&list).await.unwrap();
        assert!(siblings.iter().all(|item| item.parse_rank().is_ok()));
    }
}
