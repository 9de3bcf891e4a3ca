//! Store Adapter Layer
//!
//! The abstract interface to the external realtime document store, and the
//! live-subscription plumbing shared by every implementation.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;

use crate::item::Item;

/// Common result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The live snapshot stream failed; terminal for that subscription
    Subscription(String),
    /// A create/update/delete against the store failed
    Write(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Subscription(msg) => write!(f, "Subscription failed: {}", msg),
            StoreError::Write(msg) => write!(f, "Write failed: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// One delivery on a live subscription
#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent {
    /// Full ordered state of the list's items
    Snapshot(Vec<Item>),
    /// The stream failed; nothing further will be delivered
    Error(StoreError),
}

#[derive(Default)]
struct HandleInner {
    released: Cell<bool>,
    on_release: RefCell<Option<Box<dyn FnOnce()>>>,
}

/// Cloneable control handle for a live subscription.
///
/// Releasing stops further delivery. An adapter can install a teardown hook
/// to drop its external listener state at that point.
#[derive(Clone, Default)]
pub struct SubscriptionHandle {
    inner: Rc<HandleInner>,
}

impl SubscriptionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the subscription has been released
    pub fn is_released(&self) -> bool {
        self.inner.released.get()
    }

    /// Stop further snapshot delivery and run the teardown hook, once.
    pub fn release(&self) {
        if !self.inner.released.replace(true) {
            if let Some(teardown) = self.inner.on_release.borrow_mut().take() {
                teardown();
            }
        }
    }

    /// Install a teardown hook invoked on first release.
    pub fn set_on_release(&self, teardown: impl FnOnce() + 'static) {
        *self.inner.on_release.borrow_mut() = Some(Box::new(teardown));
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("released", &self.is_released())
            .finish()
    }
}

/// Live event stream for one list
pub struct Subscription {
    events: UnboundedReceiver<ListEvent>,
    handle: SubscriptionHandle,
}

impl Subscription {
    pub fn new(events: UnboundedReceiver<ListEvent>, handle: SubscriptionHandle) -> Self {
        Self { events, handle }
    }

    /// Sender/stream pair for adapters feeding a subscription.
    pub fn channel(handle: SubscriptionHandle) -> (UnboundedSender<ListEvent>, Subscription) {
        let (sender, events) = unbounded();
        (sender, Subscription::new(events, handle))
    }

    pub fn handle(&self) -> SubscriptionHandle {
        self.handle.clone()
    }

    /// Await the next event; `None` once the stream is closed.
    pub async fn next_event(&mut self) -> Option<ListEvent> {
        self.events.next().await
    }

    /// Non-blocking variant; `None` when nothing is queued or the stream closed.
    pub fn try_next_event(&mut self) -> Option<ListEvent> {
        self.events.try_next().ok().flatten()
    }

    /// Stop delivery.
    pub fn release(&self) {
        self.handle.release();
    }
}

/// Abstract interface to the per-list item collection of the realtime store.
///
/// No business logic lives here; implementations only translate calls into
/// store operations. Fire-and-forget operations never report errors to the
/// caller; their failures surface out-of-band.
#[async_trait(?Send)]
pub trait ListStore {
    /// Open a live subscription to all items under `list_id`, ordered
    /// ascending by normalized key. Restartable; every call yields a fresh
    /// stream. Loading is the gap before the first snapshot is delivered.
    async fn subscribe(&self, list_id: &str) -> StoreResult<Subscription>;

    /// Insert a new item document with `needed = true`.
    async fn add_item(&self, list_id: &str, name: &str, normalized_key: &str) -> StoreResult<()>;

    /// Update the `needed` flag on one document. Fire-and-forget.
    fn set_needed(&self, list_id: &str, item_id: &str, needed: bool);

    /// Remove one document. Fire-and-forget; issued even for unknown ids.
    fn delete_item(&self, list_id: &str, item_id: &str);

    /// Items whose normalized key equals `key` (0 or 1 expected).
    async fn find_by_normalized_key(&self, list_id: &str, key: &str) -> StoreResult<Vec<Item>>;
}
