//! List View Model
//!
//! All user-facing decisions for a single list: what is visible, and how
//! add/toggle/delete intents translate into store mutations.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::debug;

use crate::item::{normalized_key, Item, ViewMode};
use crate::store::{
    ListEvent, ListStore, StoreError, StoreResult, Subscription, SubscriptionHandle,
};

/// Subscription phase for one list
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Subscribed, first snapshot not yet delivered
    Loading,
    /// Live; re-renders on every snapshot
    Ready,
    /// The stream failed; terminal
    Errored(StoreError),
}

/// Result of one `submit_add` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Empty input, or a submit while another was in flight; nothing happened
    Ignored,
    /// A new item was created
    Created,
    /// An existing item with the same key was set back to needed
    Reactivated,
}

/// Sorted, filtered display list for a snapshot and mode.
///
/// Pure: the same snapshot and mode always yield the same membership and
/// order (ascending by normalized key).
pub fn compute_visible_items(items: &[Item], mode: ViewMode) -> Vec<Item> {
    let mut visible: Vec<Item> = items
        .iter()
        .filter(|item| match mode {
            ViewMode::ShowAll => true,
            ViewMode::NeededOnly => item.needed,
        })
        .cloned()
        .collect();
    visible.sort_by(|a, b| a.normalized_key.cmp(&b.normalized_key));
    visible
}

/// "Nothing to do" is distinct from "still loading".
pub fn empty_state_reached(visible_items: &[Item], is_loading: bool) -> bool {
    !is_loading && visible_items.is_empty()
}

/// View model for one list's live subscription.
///
/// Single-threaded by design: interior mutability instead of locks, and no
/// borrow is held across a suspension point. The store adapter is injected;
/// there is no process-wide store handle.
pub struct ListViewModel {
    store: Rc<dyn ListStore>,
    list_id: String,
    phase: RefCell<Phase>,
    items: RefCell<Vec<Item>>,
    mode: Cell<ViewMode>,
    add_in_flight: Cell<bool>,
    highlight: RefCell<Option<String>>,
    subscription: RefCell<Option<SubscriptionHandle>>,
}

impl ListViewModel {
    pub fn new(store: Rc<dyn ListStore>, list_id: impl Into<String>) -> Self {
        Self {
            store,
            list_id: list_id.into(),
            phase: RefCell::new(Phase::Loading),
            items: RefCell::new(Vec::new()),
            mode: Cell::new(ViewMode::default()),
            add_in_flight: Cell::new(false),
            highlight: RefCell::new(None),
            subscription: RefCell::new(None),
        }
    }

    pub fn list_id(&self) -> &str {
        &self.list_id
    }

    /// Open the live subscription. The caller owns the returned stream and
    /// feeds each event back through [`ListViewModel::apply_event`].
    pub async fn attach(&self) -> StoreResult<Subscription> {
        match self.store.subscribe(&self.list_id).await {
            Ok(subscription) => {
                *self.subscription.borrow_mut() = Some(subscription.handle());
                Ok(subscription)
            }
            Err(error) => {
                *self.phase.borrow_mut() = Phase::Errored(error.clone());
                Err(error)
            }
        }
    }

    /// Release the subscription; events arriving afterwards are ignored.
    pub fn detach(&self) {
        if let Some(handle) = self.subscription.borrow().as_ref() {
            handle.release();
        }
    }

    fn is_released(&self) -> bool {
        self.subscription
            .borrow()
            .as_ref()
            .map(|handle| handle.is_released())
            .unwrap_or(false)
    }

    /// Fold one subscription event into the state machine.
    pub fn apply_event(&self, event: ListEvent) {
        if self.is_released() {
            return;
        }
        // Errored is terminal; Ready is never re-entered.
        if matches!(*self.phase.borrow(), Phase::Errored(_)) {
            return;
        }
        match event {
            ListEvent::Snapshot(items) => {
                debug!("{}: snapshot of {} items", self.list_id, items.len());
                *self.items.borrow_mut() = items;
                *self.phase.borrow_mut() = Phase::Ready;
            }
            ListEvent::Error(error) => {
                *self.phase.borrow_mut() = Phase::Errored(error);
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.phase.borrow(), Phase::Loading)
    }

    pub fn mode(&self) -> ViewMode {
        self.mode.get()
    }

    pub fn set_mode(&self, mode: ViewMode) {
        self.mode.set(mode);
    }

    pub fn add_in_flight(&self) -> bool {
        self.add_in_flight.get()
    }

    /// Normalized key of the row most recently reactivated by a re-add.
    pub fn highlight(&self) -> Option<String> {
        self.highlight.borrow().clone()
    }

    /// Clear the reactivation highlight (callers pick the duration).
    pub fn clear_highlight(&self) {
        *self.highlight.borrow_mut() = None;
    }

    /// Current raw snapshot.
    pub fn items(&self) -> Vec<Item> {
        self.items.borrow().clone()
    }

    /// Filtered, ordered display list for the current snapshot and mode.
    pub fn visible_items(&self) -> Vec<Item> {
        compute_visible_items(&self.items.borrow(), self.mode.get())
    }

    /// True once the list is known to be empty, as opposed to still loading.
    pub fn empty_state_reached(&self) -> bool {
        empty_state_reached(&self.visible_items(), self.is_loading())
    }

    /// Add intake: trim, normalize, dedup by key, reactivate on re-add.
    ///
    /// Whitespace-only input and submits while another add is in flight are
    /// ignored without touching the store. Write failures are returned to the
    /// caller with the in-flight flag cleared.
    pub async fn submit_add(&self, raw_input: &str) -> StoreResult<AddOutcome> {
        let name = raw_input.trim();
        if name.is_empty() {
            return Ok(AddOutcome::Ignored);
        }
        if self.add_in_flight.replace(true) {
            return Ok(AddOutcome::Ignored);
        }
        let key = normalized_key(name);

        // Check-then-act: a concurrent submit from another client can still
        // slip a duplicate in between the query and the write.
        let outcome = match self.store.find_by_normalized_key(&self.list_id, &key).await {
            Ok(existing) => match existing.first() {
                None => self
                    .store
                    .add_item(&self.list_id, name, &key)
                    .await
                    .map(|_| AddOutcome::Created),
                Some(item) => {
                    self.store.set_needed(&self.list_id, &item.id, true);
                    *self.highlight.borrow_mut() = Some(key);
                    Ok(AddOutcome::Reactivated)
                }
            },
            Err(error) => Err(error),
        };
        self.add_in_flight.set(false);
        outcome
    }

    /// Delegate a checkbox toggle to the store. Fire-and-forget.
    pub fn toggle_needed(&self, item_id: &str, needed: bool) {
        self.store.set_needed(&self.list_id, item_id, needed);
    }

    /// Delegate a delete to the store. Fire-and-forget, no existence check;
    /// edit-mode gating is the presentation layer's concern.
    pub fn delete_item(&self, item_id: &str) {
        self.store.delete_item(&self.list_id, item_id);
    }
}
