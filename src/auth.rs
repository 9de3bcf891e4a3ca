//! Auth Presence
//!
//! Bindings to the identity collaborator: a current-user presence signal and
//! sign-in/sign-out actions. Credentials never cross into Rust.

use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen]
extern "C" {
    /// Registers an auth observer; the callback receives the user or null.
    #[wasm_bindgen(js_namespace = ["window", "__GROCERIES_DB__"], js_name = onAuthStateChanged)]
    fn on_auth_state_changed(callback: &js_sys::Function);

    #[wasm_bindgen(catch, js_namespace = ["window", "__GROCERIES_DB__"], js_name = signInWithGoogle)]
    async fn sign_in_js() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["window", "__GROCERIES_DB__"], js_name = signOut)]
    async fn sign_out_js() -> Result<JsValue, JsValue>;
}

/// Current-user presence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    /// Observer registered, first callback not yet delivered
    #[default]
    Loading,
    SignedOut,
    SignedIn,
}

/// Signal fed by the client's auth observer. Register once per app.
pub fn use_auth_state() -> ReadSignal<AuthState> {
    let (state, set_state) = signal(AuthState::Loading);
    let callback = Closure::<dyn FnMut(JsValue)>::new(move |user: JsValue| {
        let next = if user.is_null() || user.is_undefined() {
            AuthState::SignedOut
        } else {
            AuthState::SignedIn
        };
        set_state.set(next);
    });
    on_auth_state_changed(callback.as_ref().unchecked_ref());
    callback.forget();
    state
}

/// Start the provider sign-in flow.
pub fn sign_in() {
    spawn_local(async {
        if let Err(error) = sign_in_js().await {
            web_sys::console::warn_1(&format!("[AUTH] sign-in failed: {:?}", error).into());
        }
    });
}

/// Drop the current session.
pub fn sign_out() {
    spawn_local(async {
        if let Err(error) = sign_out_js().await {
            web_sys::console::warn_1(&format!("[AUTH] sign-out failed: {:?}", error).into());
        }
    });
}
