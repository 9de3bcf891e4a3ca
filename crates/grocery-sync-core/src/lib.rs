//! Grocery Sync Core
//!
//! Framework-independent core of the shared grocery checklist: the item
//! model, the store adapter interface, and the list view model. A rendering
//! layer binds to [`ListViewModel`]; the external realtime store is reached
//! through the [`ListStore`] trait.

mod item;
mod memory;
mod store;
mod view_model;

#[cfg(test)]
mod tests;

pub use item::{normalized_key, Item, ViewMode};
pub use memory::MemoryStore;
pub use store::{
    ListEvent, ListStore, StoreError, StoreResult, Subscription, SubscriptionHandle,
};
pub use view_model::{
    compute_visible_items, empty_state_reached, AddOutcome, ListViewModel, Phase,
};
