//! Add Item Form Component
//!
//! Input for new groceries; submits are disabled while one is in flight.

use leptos::prelude::*;
use wasm_bindgen::JsCast;

#[component]
pub fn AddItemForm(
    #[prop(into)] on_submit: Callback<String>,
    disabled: ReadSignal<bool>,
) -> impl IntoView {
    let (draft, set_draft) = signal(String::new());

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let raw = draft.get();
        if raw.trim().is_empty() {
            return;
        }
        on_submit.run(raw);
        // Cleared whether the add creates or reactivates.
        set_draft.set(String::new());
    };

    view! {
        <form class="add-item-form" on:submit=submit novalidate=true>
            <input
                type="text"
                placeholder="Add a grocery..."
                prop:value=move || draft.get()
                prop:disabled=move || disabled.get()
                on:input=move |ev| {
                    let target = ev.target().unwrap();
                    let input = target.dyn_ref::<web_sys::HtmlInputElement>().unwrap();
                    set_draft.set(input.value());
                }
            />
            <button type="submit" prop:disabled=move || disabled.get()>
                "Save"
            </button>
        </form>
    }
}
