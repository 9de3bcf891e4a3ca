//! In-Memory Store
//!
//! `ListStore` implementation backing the tests and any native embedding.
//! Broadcasts a full ordered snapshot to live subscribers after every change.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use async_trait::async_trait;
use futures::channel::mpsc::UnboundedSender;
use log::{debug, warn};

use crate::item::Item;
use crate::store::{
    ListEvent, ListStore, StoreError, StoreResult, Subscription, SubscriptionHandle,
};

struct Subscriber {
    list_id: String,
    sender: UnboundedSender<ListEvent>,
    handle: SubscriptionHandle,
}

/// In-process document store, one item collection per list id.
#[derive(Default)]
pub struct MemoryStore {
    lists: RefCell<HashMap<String, Vec<Item>>>,
    subscribers: RefCell<Vec<Subscriber>>,
    next_id: Cell<u64>,
    write_errors: RefCell<Vec<StoreError>>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items currently stored under `list_id`, in insertion order.
    pub fn items(&self, list_id: &str) -> Vec<Item> {
        self.lists
            .borrow()
            .get(list_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Out-of-band record of failed fire-and-forget writes.
    pub fn write_errors(&self) -> Vec<StoreError> {
        self.write_errors.borrow().clone()
    }

    /// Make every subsequent write fail (error-path testing).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Terminate every live subscription of `list_id` with an error.
    pub fn break_subscriptions(&self, list_id: &str, message: &str) {
        let error = StoreError::Subscription(message.to_string());
        let mut subscribers = self.subscribers.borrow_mut();
        for subscriber in subscribers.iter() {
            if subscriber.list_id == list_id && !subscriber.handle.is_released() {
                let _ = subscriber
                    .sender
                    .unbounded_send(ListEvent::Error(error.clone()));
            }
        }
        subscribers.retain(|subscriber| subscriber.list_id != list_id);
    }

    /// Snapshot of one list, ordered ascending by normalized key.
    fn snapshot(&self, list_id: &str) -> Vec<Item> {
        let mut items = self.items(list_id);
        items.sort_by(|a, b| a.normalized_key.cmp(&b.normalized_key));
        items
    }

    /// Push the current snapshot to every live subscriber of `list_id`.
    fn broadcast(&self, list_id: &str) {
        let snapshot = self.snapshot(list_id);
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|subscriber| {
            if subscriber.handle.is_released() {
                return false;
            }
            if subscriber.list_id != list_id {
                return true;
            }
            subscriber
                .sender
                .unbounded_send(ListEvent::Snapshot(snapshot.clone()))
                .is_ok()
        });
    }

    fn record_write_error(&self, error: StoreError) {
        warn!("fire-and-forget write failed: {}", error);
        self.write_errors.borrow_mut().push(error);
    }
}

#[async_trait(?Send)]
impl ListStore for MemoryStore {
    async fn subscribe(&self, list_id: &str) -> StoreResult<Subscription> {
        let handle = SubscriptionHandle::new();
        let (sender, subscription) = Subscription::channel(handle.clone());
        // Queue the initial snapshot; it is delivered once the caller pumps.
        let _ = sender.unbounded_send(ListEvent::Snapshot(self.snapshot(list_id)));
        self.subscribers.borrow_mut().push(Subscriber {
            list_id: list_id.to_string(),
            sender,
            handle,
        });
        Ok(subscription)
    }

    async fn add_item(&self, list_id: &str, name: &str, normalized_key: &str) -> StoreResult<()> {
        if self.fail_writes.get() {
            return Err(StoreError::Write(format!("add rejected for '{}'", name)));
        }
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let item = Item {
            id: format!("item-{}", id),
            name: name.to_string(),
            normalized_key: normalized_key.to_string(),
            needed: true,
        };
        debug!("add {} -> {}/{}", item.id, list_id, item.normalized_key);
        self.lists
            .borrow_mut()
            .entry(list_id.to_string())
            .or_default()
            .push(item);
        self.broadcast(list_id);
        Ok(())
    }

    fn set_needed(&self, list_id: &str, item_id: &str, needed: bool) {
        if self.fail_writes.get() {
            self.record_write_error(StoreError::Write(format!(
                "update rejected for {}",
                item_id
            )));
            return;
        }
        let mut changed = false;
        if let Some(items) = self.lists.borrow_mut().get_mut(list_id) {
            if let Some(item) = items.iter_mut().find(|item| item.id == item_id) {
                item.needed = needed;
                changed = true;
            }
        }
        if changed {
            self.broadcast(list_id);
        } else {
            // Updating an absent document fails in the external store too.
            self.record_write_error(StoreError::Write(format!(
                "no document {} in {}",
                item_id, list_id
            )));
        }
    }

    fn delete_item(&self, list_id: &str, item_id: &str) {
        if self.fail_writes.get() {
            self.record_write_error(StoreError::Write(format!(
                "delete rejected for {}",
                item_id
            )));
            return;
        }
        let mut changed = false;
        if let Some(items) = self.lists.borrow_mut().get_mut(list_id) {
            let before = items.len();
            items.retain(|item| item.id != item_id);
            changed = items.len() != before;
        }
        // Deleting an absent document succeeds silently, like the real store.
        if changed {
            self.broadcast(list_id);
        }
    }

    async fn find_by_normalized_key(&self, list_id: &str, key: &str) -> StoreResult<Vec<Item>> {
        Ok(self
            .items(list_id)
            .into_iter()
            .filter(|item| item.normalized_key == key)
            .collect())
    }
}
