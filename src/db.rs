//! Realtime Store Bindings
//!
//! `ListStore` implementation over the realtime document-database client
//! exposed on `window.__GROCERIES_DB__`.

use async_trait::async_trait;
use js_sys::Function;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use grocery_sync_core::{
    Item, ListEvent, ListStore, StoreError, StoreResult, Subscription, SubscriptionHandle,
};

#[wasm_bindgen]
extern "C" {
    /// Opens a snapshot listener ordered by `order`; returns the unsubscribe
    /// function.
    #[wasm_bindgen(js_namespace = ["window", "__GROCERIES_DB__"], js_name = subscribeItems)]
    fn subscribe_items(list_id: &str, on_snapshot: &Function, on_error: &Function) -> Function;

    #[wasm_bindgen(catch, js_namespace = ["window", "__GROCERIES_DB__"], js_name = addItem)]
    async fn add_item_js(list_id: &str, name: &str, order: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["window", "__GROCERIES_DB__"], js_name = setNeeded)]
    async fn set_needed_js(list_id: &str, item_id: &str, needed: bool) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["window", "__GROCERIES_DB__"], js_name = deleteItem)]
    async fn delete_item_js(list_id: &str, item_id: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["window", "__GROCERIES_DB__"], js_name = queryByOrder)]
    async fn query_by_order(list_id: &str, order: &str) -> Result<JsValue, JsValue>;
}

fn js_error(value: JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(&value, &JsValue::from_str("message"))
                .ok()
                .and_then(|message| message.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Store adapter over the external realtime client.
///
/// One instance per app, injected into every view model; there is no global
/// store handle on the Rust side.
#[derive(Default)]
pub struct SyncDbStore;

impl SyncDbStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl ListStore for SyncDbStore {
    async fn subscribe(&self, list_id: &str) -> StoreResult<Subscription> {
        let handle = SubscriptionHandle::new();
        let (sender, subscription) = Subscription::channel(handle.clone());

        let snapshot_sender = sender.clone();
        let snapshot_handle = handle.clone();
        let on_snapshot = Closure::<dyn FnMut(JsValue)>::new(move |docs: JsValue| {
            if snapshot_handle.is_released() {
                return;
            }
            match serde_wasm_bindgen::from_value::<Vec<Item>>(docs) {
                Ok(items) => {
                    let _ = snapshot_sender.unbounded_send(ListEvent::Snapshot(items));
                }
                Err(error) => {
                    let _ = snapshot_sender.unbounded_send(ListEvent::Error(
                        StoreError::Subscription(format!("bad snapshot: {}", error)),
                    ));
                }
            }
        });

        let error_handle = handle.clone();
        let on_error = Closure::<dyn FnMut(JsValue)>::new(move |error: JsValue| {
            if error_handle.is_released() {
                return;
            }
            let _ = sender.unbounded_send(ListEvent::Error(StoreError::Subscription(js_error(
                error,
            ))));
        });

        let unsubscribe = subscribe_items(
            list_id,
            on_snapshot.as_ref().unchecked_ref(),
            on_error.as_ref().unchecked_ref(),
        );

        // The closures stay alive until release, then the JS listener goes.
        handle.set_on_release(move || {
            let _ = unsubscribe.call0(&JsValue::NULL);
            drop(on_snapshot);
            drop(on_error);
        });

        Ok(subscription)
    }

    async fn add_item(&self, list_id: &str, name: &str, normalized_key: &str) -> StoreResult<()> {
        add_item_js(list_id, name, normalized_key)
            .await
            .map(|_| ())
            .map_err(|error| StoreError::Write(js_error(error)))
    }

    fn set_needed(&self, list_id: &str, item_id: &str, needed: bool) {
        let list_id = list_id.to_string();
        let item_id = item_id.to_string();
        spawn_local(async move {
            if let Err(error) = set_needed_js(&list_id, &item_id, needed).await {
                web_sys::console::warn_1(
                    &format!("[STORE] setNeeded {} failed: {}", item_id, js_error(error)).into(),
                );
            }
        });
    }

    fn delete_item(&self, list_id: &str, item_id: &str) {
        let list_id = list_id.to_string();
        let item_id = item_id.to_string();
        spawn_local(async move {
            if let Err(error) = delete_item_js(&list_id, &item_id).await {
                web_sys::console::warn_1(
                    &format!("[STORE] deleteItem {} failed: {}", item_id, js_error(error)).into(),
                );
            }
        });
    }

    async fn find_by_normalized_key(&self, list_id: &str, key: &str) -> StoreResult<Vec<Item>> {
        let result = query_by_order(list_id, key)
            .await
            .map_err(|error| StoreError::Write(js_error(error)))?;
        serde_wasm_bindgen::from_value(result).map_err(|error| StoreError::Write(error.to_string()))
    }
}
