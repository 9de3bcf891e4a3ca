//! Grocery List Component
//!
//! Owns the view model for the active list: pumps the live subscription,
//! renders rows, and wires toggle/delete/add intents.

use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;

use grocery_sync_core::{AddOutcome, Item, ListStore, ListViewModel, Phase, ViewMode};

use crate::components::AddItemForm;
use crate::context::AppContext;

/// How long a reactivated row stays highlighted.
const HIGHLIGHT_MS: u32 = 300;

#[component]
pub fn GroceryList(list_id: ReadSignal<String>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_context::<StoredValue<Rc<dyn ListStore>, LocalStorage>>()
        .expect("store adapter should be provided")
        .get_value();

    // The live view model, mirrored into plain signals for rendering.
    let vm = StoredValue::new_local(None::<Rc<ListViewModel>>);
    let (rows, set_rows) = signal(Vec::<Item>::new());
    let (phase, set_phase) = signal(Phase::Loading);
    let (highlight, set_highlight) = signal(None::<String>);
    let (adding, set_adding) = signal(false);

    let sync_view = move |model: &ListViewModel| {
        set_rows.set(model.visible_items());
        set_phase.set(model.phase());
        set_highlight.set(model.highlight());
        set_adding.set(model.add_in_flight());
    };

    // (Re)subscribe whenever the active list changes.
    Effect::new(move |_| {
        let id = list_id.get();
        if let Some(previous) = vm.get_value() {
            previous.detach();
        }
        let model = Rc::new(ListViewModel::new(store.clone(), id.clone()));
        model.set_mode(if ctx.edit_mode.get_untracked() {
            ViewMode::ShowAll
        } else {
            ViewMode::NeededOnly
        });
        vm.set_value(Some(model.clone()));
        sync_view(&model);

        spawn_local(async move {
            match model.attach().await {
                Ok(mut subscription) => {
                    while let Some(event) = subscription.next_event().await {
                        if subscription.handle().is_released() {
                            break;
                        }
                        model.apply_event(event);
                        sync_view(&model);
                    }
                }
                Err(error) => {
                    web_sys::console::warn_1(
                        &format!("[LIST] subscribe {} failed: {}", id, error).into(),
                    );
                    sync_view(&model);
                }
            }
        });
    });

    // Edit mode shows everything; normal mode only what is still needed.
    Effect::new(move |_| {
        let mode = if ctx.edit_mode.get() {
            ViewMode::ShowAll
        } else {
            ViewMode::NeededOnly
        };
        if let Some(model) = vm.get_value() {
            model.set_mode(mode);
            set_rows.set(model.visible_items());
        }
    });

    let on_submit = move |raw: String| {
        let Some(model) = vm.get_value() else {
            return;
        };
        set_adding.set(true);
        spawn_local(async move {
            let outcome = model.submit_add(&raw).await;
            sync_view(&model);
            match outcome {
                Ok(AddOutcome::Reactivated) => {
                    // Let the duplicate row flash briefly.
                    TimeoutFuture::new(HIGHLIGHT_MS).await;
                    model.clear_highlight();
                    sync_view(&model);
                }
                Ok(_) => {}
                Err(error) => {
                    web_sys::console::warn_1(&format!("[LIST] add failed: {}", error).into());
                }
            }
        });
    };

    let phase_view = Memo::new(move |_| phase.get());

    view! {
        <div class="grocery-list">
            {move || match phase_view.get() {
                Phase::Loading => ().into_any(),
                Phase::Errored(error) => {
                    view! {
                        <p class="list-error">"Something went wrong: " {error.to_string()}</p>
                    }
                        .into_any()
                }
                Phase::Ready => {
                    view! {
                        <ul class="items">
                            <For
                                each=move || rows.get()
                                // Mutable fields are part of the key so changes re-render.
                                key=|item| (item.id.clone(), item.needed, item.name.clone())
                                children=move |item: Item| {
                                    let row_key = item.normalized_key.clone();
                                    let toggle_id = item.id.clone();
                                    let delete_id = item.id.clone();
                                    let needed = item.needed;
                                    let row_class = move || {
                                        if highlight.get().as_deref() == Some(row_key.as_str()) {
                                            "item-row highlight"
                                        } else {
                                            "item-row"
                                        }
                                    };
                                    view! {
                                        <li class=row_class>
                                            <label>
                                                <input
                                                    type="checkbox"
                                                    prop:checked=needed
                                                    on:change=move |ev| {
                                                        let target = ev.target().unwrap();
                                                        let input = target
                                                            .dyn_ref::<web_sys::HtmlInputElement>()
                                                            .unwrap();
                                                        if let Some(model) = vm.get_value() {
                                                            model.toggle_needed(&toggle_id, input.checked());
                                                        }
                                                    }
                                                />
                                                <span class=move || {
                                                    if needed { "item-name" } else { "item-name done" }
                                                }>{item.name.clone()}</span>
                                            </label>
                                            <Show when=move || ctx.edit_mode.get()>
                                                <button
                                                    class="delete-btn"
                                                    on:click={
                                                        let delete_id = delete_id.clone();
                                                        move |_| {
                                                            if let Some(model) = vm.get_value() {
                                                                model.delete_item(&delete_id);
                                                            }
                                                        }
                                                    }
                                                >
                                                    "Delete"
                                                </button>
                                            </Show>
                                        </li>
                                    }
                                }
                            />
                        </ul>

                        <Show when=move || rows.with(|items| items.is_empty())>
                            <p class="empty-state">"Nothing to pick up."</p>
                        </Show>

                        <AddItemForm on_submit=on_submit disabled=adding />
                    }
                        .into_any()
                }
            }}
        </div>
    }
}
