//! Title Bar Component
//!
//! App heading with the edit-mode toggle.

use leptos::prelude::*;

use crate::context::AppContext;

#[component]
pub fn TitleBar() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    view! {
        <header class="title-bar">
            <h1>"Groceries"</h1>
            <button class="edit-toggle" on:click=move |_| ctx.toggle_edit_mode()>
                {move || if ctx.edit_mode.get() { "Done" } else { "View All" }}
            </button>
        </header>
    }
}
