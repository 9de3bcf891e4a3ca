//! View-Model Flow Tests
//!
//! Exercises the add/toggle/delete flows and the subscription state machine
//! against the in-memory store.

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use async_trait::async_trait;
    use futures::FutureExt;

    use crate::{
        compute_visible_items, empty_state_reached, normalized_key, AddOutcome, Item,
        ListEvent, ListStore, ListViewModel, MemoryStore, Phase, StoreError, StoreResult,
        Subscription, SubscriptionHandle, ViewMode,
    };

    const LIST: &str = "family";

    async fn setup() -> (Rc<MemoryStore>, ListViewModel, Subscription) {
        let store = Rc::new(MemoryStore::new());
        let vm = ListViewModel::new(store.clone(), LIST);
        let subscription = vm.attach().await.expect("subscribe failed");
        (store, vm, subscription)
    }

    /// Apply everything currently queued on the subscription.
    fn drain(vm: &ListViewModel, subscription: &mut Subscription) {
        while let Some(event) = subscription.try_next_event() {
            vm.apply_event(event);
        }
    }

    fn item(id: &str, name: &str, needed: bool) -> Item {
        let mut item = Item::new(id, name);
        item.needed = needed;
        item
    }

    #[tokio::test]
    async fn test_whitespace_only_add_is_ignored() {
        let (store, vm, mut subscription) = setup().await;
        drain(&vm, &mut subscription);

        let outcome = vm.submit_add("   \t ").await.expect("submit failed");
        assert_eq!(outcome, AddOutcome::Ignored);
        assert!(store.items(LIST).is_empty());
        assert!(!vm.add_in_flight());
        // No store interaction means no snapshot either.
        assert!(subscription.try_next_event().is_none());
    }

    #[tokio::test]
    async fn test_add_creates_needed_item() {
        let (store, vm, mut subscription) = setup().await;
        drain(&vm, &mut subscription);

        let outcome = vm.submit_add("Milk").await.expect("submit failed");
        assert_eq!(outcome, AddOutcome::Created);
        drain(&vm, &mut subscription);

        let items = store.items(LIST);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Milk");
        assert_eq!(items[0].normalized_key, "milk");
        assert!(items[0].needed);
        assert_eq!(vm.visible_items().len(), 1);
        assert!(!vm.add_in_flight());
    }

    #[tokio::test]
    async fn test_re_add_reactivates_existing_item() {
        let (store, vm, mut subscription) = setup().await;
        store.add_item(LIST, "Milk", "milk").await.unwrap();
        let id = store.items(LIST)[0].id.clone();
        store.set_needed(LIST, &id, false);
        drain(&vm, &mut subscription);
        assert!(vm.visible_items().is_empty());

        // Different case, same key: no new item, the old one comes back.
        let outcome = vm.submit_add("milk").await.expect("submit failed");
        assert_eq!(outcome, AddOutcome::Reactivated);
        drain(&vm, &mut subscription);

        let items = store.items(LIST);
        assert_eq!(items.len(), 1);
        assert!(items[0].needed);
        assert_eq!(items[0].normalized_key, normalized_key(&items[0].name));
        assert_eq!(vm.highlight().as_deref(), Some("milk"));

        vm.clear_highlight();
        assert_eq!(vm.highlight(), None);
    }

    #[tokio::test]
    async fn test_sequential_duplicate_adds_keep_one_item() {
        let (store, vm, mut subscription) = setup().await;
        drain(&vm, &mut subscription);

        assert_eq!(vm.submit_add("Milk").await.unwrap(), AddOutcome::Created);
        drain(&vm, &mut subscription);
        assert_eq!(
            vm.submit_add("  MILK ").await.unwrap(),
            AddOutcome::Reactivated
        );
        drain(&vm, &mut subscription);

        let items = store.items(LIST);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Milk");
        assert_eq!(items[0].normalized_key, "milk");
    }

    #[test]
    fn test_needed_only_is_the_needed_subset() {
        let snapshot = vec![
            item("c", "Cheese", true),
            item("a", "Apples", true),
            item("b", "Bread", false),
        ];

        let all = compute_visible_items(&snapshot, ViewMode::ShowAll);
        let needed = compute_visible_items(&snapshot, ViewMode::NeededOnly);

        let keys: Vec<&str> = all.iter().map(|i| i.normalized_key.as_str()).collect();
        assert_eq!(keys, vec!["apples", "bread", "cheese"]);

        let needed_keys: Vec<&str> = needed.iter().map(|i| i.normalized_key.as_str()).collect();
        assert_eq!(needed_keys, vec!["apples", "cheese"]);

        let expected: Vec<Item> = all.iter().filter(|i| i.needed).cloned().collect();
        assert_eq!(needed, expected);
    }

    #[test]
    fn test_compute_visible_items_is_deterministic() {
        let snapshot = vec![item("b", "Bread", true), item("a", "Apples", false)];
        let first = compute_visible_items(&snapshot, ViewMode::ShowAll);
        let second = compute_visible_items(&snapshot, ViewMode::ShowAll);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_state_requires_first_snapshot() {
        let (_store, vm, mut subscription) = setup().await;

        // Still loading: an empty visible list is not the empty state yet.
        assert!(vm.is_loading());
        assert!(vm.visible_items().is_empty());
        assert!(!vm.empty_state_reached());
        assert!(!empty_state_reached(&[], true));

        drain(&vm, &mut subscription);
        assert_eq!(vm.phase(), Phase::Ready);
        assert!(vm.empty_state_reached());
        assert!(empty_state_reached(&[], false));
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let (store, vm, mut subscription) = setup().await;
        vm.submit_add("Milk").await.unwrap();
        drain(&vm, &mut subscription);
        let id = store.items(LIST)[0].id.clone();

        vm.toggle_needed(&id, false);
        drain(&vm, &mut subscription);
        assert!(compute_visible_items(&vm.items(), ViewMode::NeededOnly).is_empty());
        assert_eq!(compute_visible_items(&vm.items(), ViewMode::ShowAll).len(), 1);

        vm.toggle_needed(&id, true);
        drain(&vm, &mut subscription);
        assert_eq!(vm.visible_items().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_item_in_store() {
        let (store, vm, mut subscription) = setup().await;
        vm.submit_add("Milk").await.unwrap();
        drain(&vm, &mut subscription);
        let id = store.items(LIST)[0].id.clone();

        vm.delete_item(&id);
        drain(&vm, &mut subscription);
        assert!(store.items(LIST).is_empty());
        assert!(vm.visible_items().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_best_effort() {
        let (store, vm, mut subscription) = setup().await;
        vm.submit_add("Milk").await.unwrap();
        drain(&vm, &mut subscription);

        // No local existence check; the call is issued and fails silently.
        vm.delete_item("ghost");
        drain(&vm, &mut subscription);
        assert_eq!(store.items(LIST).len(), 1);
        assert!(store.write_errors().is_empty());
    }

    #[tokio::test]
    async fn test_missing_document_update_recorded_out_of_band() {
        let (store, vm, mut subscription) = setup().await;
        drain(&vm, &mut subscription);

        vm.toggle_needed("ghost", true);
        assert_eq!(store.write_errors().len(), 1);
        // Nothing surfaced through the subscription.
        assert!(subscription.try_next_event().is_none());
    }

    #[tokio::test]
    async fn test_subscription_error_is_terminal() {
        let (store, vm, mut subscription) = setup().await;
        drain(&vm, &mut subscription);
        assert_eq!(vm.phase(), Phase::Ready);

        store.break_subscriptions(LIST, "permission denied");
        drain(&vm, &mut subscription);
        assert_eq!(
            vm.phase(),
            Phase::Errored(StoreError::Subscription("permission denied".into()))
        );

        // A late snapshot never re-enters Ready.
        vm.apply_event(ListEvent::Snapshot(vec![item("a", "Apples", true)]));
        assert!(matches!(vm.phase(), Phase::Errored(_)));
        assert!(vm.items().is_empty());
    }

    #[tokio::test]
    async fn test_released_subscription_ignores_stale_events() {
        let (store, vm, mut subscription) = setup().await;
        drain(&vm, &mut subscription);
        vm.detach();

        // The store prunes the released subscriber on its next broadcast.
        store.add_item(LIST, "Milk", "milk").await.unwrap();
        assert!(subscription.try_next_event().is_none());

        // A stale snapshot applied by hand is ignored too.
        vm.apply_event(ListEvent::Snapshot(vec![item("a", "Apples", true)]));
        assert!(vm.items().is_empty());
    }

    #[tokio::test]
    async fn test_add_failure_clears_in_flight_flag() {
        let (store, vm, mut subscription) = setup().await;
        drain(&vm, &mut subscription);

        store.fail_writes(true);
        let result = vm.submit_add("Milk").await;
        assert!(matches!(result, Err(StoreError::Write(_))));
        assert!(!vm.add_in_flight());
        assert!(store.items(LIST).is_empty());
    }

    /// Store whose dedup query never resolves; used to observe the
    /// in-flight flag while an add is suspended.
    struct StalledStore;

    #[async_trait(?Send)]
    impl ListStore for StalledStore {
        async fn subscribe(&self, _list_id: &str) -> StoreResult<Subscription> {
            let (_sender, subscription) = Subscription::channel(SubscriptionHandle::new());
            Ok(subscription)
        }

        async fn add_item(
            &self,
            _list_id: &str,
            _name: &str,
            _normalized_key: &str,
        ) -> StoreResult<()> {
            Ok(())
        }

        fn set_needed(&self, _list_id: &str, _item_id: &str, _needed: bool) {}

        fn delete_item(&self, _list_id: &str, _item_id: &str) {}

        async fn find_by_normalized_key(
            &self,
            _list_id: &str,
            _key: &str,
        ) -> StoreResult<Vec<Item>> {
            futures::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_second_submit_gated_while_first_in_flight() {
        let vm = ListViewModel::new(Rc::new(StalledStore), LIST);

        let mut first = Box::pin(vm.submit_add("Milk"));
        // Parked on the dedup query.
        assert!(first.as_mut().now_or_never().is_none());
        assert!(vm.add_in_flight());

        let second = vm
            .submit_add("Bread")
            .now_or_never()
            .expect("gated submit resolves synchronously");
        assert_eq!(second, Ok(AddOutcome::Ignored));
        assert!(vm.add_in_flight());
    }
}
