//! Groceries App Shell
//!
//! Auth gate, list-id resolution and the signed-in chrome.

use leptos::prelude::*;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use grocery_sync_core::ListStore;

use crate::auth::{self, AuthState};
use crate::components::{GroceryList, Login, TitleBar};
use crate::context::AppContext;
use crate::db::SyncDbStore;

const LIST_ID_STORAGE_KEY: &str = "listId";

/// List id from the URL path, empty when at the root.
fn path_list_id() -> String {
    web_sys::window()
        .and_then(|window| window.location().pathname().ok())
        .map(|path| path.replace('/', "").trim().to_string())
        .unwrap_or_default()
}

fn stored_list_id() -> Option<String> {
    let storage = web_sys::window()?.local_storage().ok()??;
    storage.get_item(LIST_ID_STORAGE_KEY).ok()?
}

fn persist_list_id(list_id: &str) {
    if let Some(storage) = web_sys::window().and_then(|window| window.local_storage().ok().flatten())
    {
        let _ = storage.set_item(LIST_ID_STORAGE_KEY, list_id);
    }
}

/// Random short id for a fresh list.
fn generate_list_id() -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    (0..9)
        .map(|_| {
            let index = (js_sys::Math::random() * ALPHABET.len() as f64) as usize;
            ALPHABET[index.min(ALPHABET.len() - 1)] as char
        })
        .collect()
}

fn push_path(list_id: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ =
                history.push_state_with_url(&JsValue::NULL, "", Some(&format!("/{}", list_id)));
        }
    }
}

/// Startup list id: URL path, then the stored one, then a fresh id.
fn resolve_list_id() -> String {
    let from_path = path_list_id();
    if !from_path.is_empty() {
        return from_path;
    }
    let list_id = stored_list_id()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(generate_list_id);
    push_path(&list_id);
    list_id
}

#[component]
pub fn App() -> impl IntoView {
    // Single store adapter instance, injected into every view model.
    provide_context(StoredValue::new_local(
        Rc::new(SyncDbStore::new()) as Rc<dyn ListStore>,
    ));

    let auth_state = auth::use_auth_state();
    let (list_id, set_list_id) = signal(resolve_list_id());
    let (edit_mode, set_edit_mode) = signal(false);

    provide_context(AppContext::new((edit_mode, set_edit_mode), list_id));

    // Keep localStorage pointing at the active list.
    Effect::new(move |_| {
        persist_list_id(&list_id.get());
    });

    // Back/forward navigation re-resolves the id from the path.
    let on_popstate = Closure::<dyn FnMut(web_sys::PopStateEvent)>::new(move |_| {
        let from_path = path_list_id();
        if !from_path.is_empty() {
            set_list_id.set(from_path);
        }
    });
    if let Some(window) = web_sys::window() {
        let _ = window
            .add_event_listener_with_callback("popstate", on_popstate.as_ref().unchecked_ref());
    }
    on_popstate.forget();

    view! {
        <div class="app">
            {move || match auth_state.get() {
                AuthState::Loading => ().into_any(),
                AuthState::SignedOut => view! { <Login /> }.into_any(),
                AuthState::SignedIn => {
                    view! { <AuthenticatedApp set_list_id=set_list_id /> }.into_any()
                }
            }}
        </div>
    }
}

#[component]
fn AuthenticatedApp(set_list_id: WriteSignal<String>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let (list_id_input, set_list_id_input) = signal(String::new());

    // Keep the edit-mode form prefilled with the active id.
    Effect::new(move |_| {
        set_list_id_input.set(ctx.list_id.get());
    });

    let navigate = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let target = list_id_input.get().trim().to_string();
        if target.is_empty() || target == ctx.list_id.get_untracked() {
            return;
        }
        push_path(&target);
        set_list_id.set(target);
    };

    let reload = move |_| {
        if let Some(window) = web_sys::window() {
            let _ = window.location().reload();
        }
    };

    view! {
        <TitleBar />
        <main class="list-page">
            <Show when=move || ctx.edit_mode.get()>
                <form class="list-id-form" on:submit=navigate>
                    <span class="list-id-prefix">"https://.../"</span>
                    <input
                        type="text"
                        prop:value=move || list_id_input.get()
                        on:input=move |ev| {
                            let target = ev.target().unwrap();
                            let input = target.dyn_ref::<web_sys::HtmlInputElement>().unwrap();
                            set_list_id_input.set(input.value());
                        }
                    />
                </form>
            </Show>

            <GroceryList list_id=ctx.list_id />

            <Show when=move || ctx.edit_mode.get()>
                <div class="edit-actions">
                    <button class="logout-btn" on:click=move |_| auth::sign_out()>
                        "Logout"
                    </button>
                    <button class="reload-btn" on:click=reload>
                        "Reload"
                    </button>
                </div>
            </Show>
        </main>
    }
}
